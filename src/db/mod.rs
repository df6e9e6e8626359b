// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Handlers talk to a [`Store`] handle injected through `AppState`, backed
//! by MongoDB in production and by [`MemoryDb`] in tests.

pub mod memory;
pub mod mongo;

pub use memory::MemoryDb;
pub use mongo::MongoDb;

use crate::config::Config;
use crate::models::{Holding, User};
use async_trait::async_trait;
use std::sync::Arc;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const HOLDINGS: &str = "holdings";
}

/// Storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("duplicate value for unique field {0}")]
    Duplicate(&'static str),

    #[error("{0}")]
    Backend(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Document storage for users and holdings.
///
/// Ids are 24-character hex ObjectIds. Callers validate ids with
/// [`is_object_id`] before calling; a malformed id is reported as absent.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Insert a new user and return its id. Fails with
    /// `Duplicate("email")` if the email is taken.
    async fn insert_user(&self, user: &User) -> StoreResult<String>;
    /// Replace a user document. Returns false if no user has this id.
    async fn replace_user(&self, id: &str, user: &User) -> StoreResult<bool>;
    /// Delete a user. Returns false if no user has this id.
    async fn delete_user(&self, id: &str) -> StoreResult<bool>;

    // ─── Holdings ────────────────────────────────────────────────
    async fn list_holdings(&self) -> StoreResult<Vec<Holding>>;
    async fn find_holding_by_id(&self, id: &str) -> StoreResult<Option<Holding>>;
    /// Holdings whose ticker equals `ticker` exactly.
    async fn find_holdings_by_ticker(&self, ticker: &str) -> StoreResult<Vec<Holding>>;
    /// Holdings whose account matches `pattern` anywhere, ignoring case.
    /// The pattern is a regular expression; an invalid one is a `Backend` error.
    async fn find_holdings_by_account(&self, pattern: &str) -> StoreResult<Vec<Holding>>;
    /// Insert a new holding and return its id.
    async fn insert_holding(&self, holding: &Holding) -> StoreResult<String>;
    /// Replace a holding document. Returns false if no holding has this id.
    async fn replace_holding(&self, id: &str, holding: &Holding) -> StoreResult<bool>;
    /// Delete a holding. Returns false if no holding has this id.
    async fn delete_holding(&self, id: &str) -> StoreResult<bool>;
}

/// Whether `id` is a well-formed ObjectId hex string.
pub fn is_object_id(id: &str) -> bool {
    bson::oid::ObjectId::parse_str(id).is_ok()
}

/// Open the store selected by configuration.
pub async fn connect(config: &Config) -> StoreResult<Arc<dyn Store>> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-process store; data is not persisted");
        return Ok(Arc::new(MemoryDb::new()));
    }

    let db = MongoDb::connect(&config.mongo_uri, &config.mongo_db).await?;
    db.init_indexes().await?;
    Ok(Arc::new(db))
}
