// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MongoDB-backed [`Store`].
//!
//! Every call runs under a timeout (30s for reads, 10s for writes) and is
//! attempted once. Multi-record reads decode documents one at a time and
//! skip any that fail to decode, so one corrupt record does not hide the
//! rest of a listing.

use crate::db::{collections, Store, StoreError, StoreResult};
use crate::models::{Holding, User};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::IntoFuture;
use std::time::Duration;

const READ_TIMEOUT: Duration = Duration::from_secs(30);
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);
const PING_TIMEOUT: Duration = Duration::from_secs(10);
/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

/// `users` document layout.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    #[serde(default)]
    timezone: String,
    #[serde(default)]
    profile_image_url: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    date: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id.map(|oid| oid.to_hex()),
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            password_hash: r.password,
            timezone: r.timezone,
            profile_image_url: r.profile_image_url,
            date: r.date,
        }
    }
}

impl From<&User> for UserRecord {
    fn from(u: &User) -> Self {
        Self {
            id: None,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            password: u.password_hash.clone(),
            timezone: u.timezone.clone(),
            profile_image_url: u.profile_image_url.clone(),
            date: u.date,
        }
    }
}

/// `holdings` document layout.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoldingRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    ticker: String,
    quantity: f64,
    total_cost: f64,
    account: String,
}

impl From<HoldingRecord> for Holding {
    fn from(r: HoldingRecord) -> Self {
        Self {
            id: r.id.map(|oid| oid.to_hex()),
            ticker: r.ticker,
            quantity: r.quantity,
            total_cost: r.total_cost,
            account: r.account,
        }
    }
}

impl From<&Holding> for HoldingRecord {
    fn from(h: &Holding) -> Self {
        Self {
            id: None,
            ticker: h.ticker.clone(),
            quantity: h.quantity,
            total_cost: h.total_cost,
            account: h.account.clone(),
        }
    }
}

/// MongoDB database handle. Cheap to clone; the driver pools connections.
#[derive(Clone)]
pub struct MongoDb {
    db: Database,
}

impl MongoDb {
    /// Connect and verify the server answers a ping.
    pub async fn connect(uri: &str, db_name: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to MongoDB: {}", e)))?;
        let db = client.database(db_name);

        timed("ping", PING_TIMEOUT, db.run_command(doc! { "ping": 1 })).await?;
        tracing::info!(database = db_name, "Connected to MongoDB");

        Ok(Self { db })
    }

    /// Create the unique index on `users.email`.
    ///
    /// Email uniqueness is enforced here; the pre-insert lookup in
    /// registration only produces a friendlier error.
    pub async fn init_indexes(&self) -> StoreResult<()> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        timed(
            "create users.email index",
            WRITE_TIMEOUT,
            self.users().create_index(email_index),
        )
        .await?;

        tracing::info!("Database indexes created");
        Ok(())
    }

    fn users(&self) -> Collection<UserRecord> {
        self.db.collection(collections::USERS)
    }

    fn holdings(&self) -> Collection<HoldingRecord> {
        self.db.collection(collections::HOLDINGS)
    }

    fn raw(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }

    /// Find documents matching `filter`, skipping those that fail to decode.
    async fn find_many<R, T>(
        &self,
        op: &'static str,
        collection: &'static str,
        filter: Document,
    ) -> StoreResult<Vec<T>>
    where
        R: DeserializeOwned,
        T: From<R>,
    {
        let raw = self.raw(collection);
        let read = async move { raw.find(filter).await?.try_collect::<Vec<_>>().await };

        let documents = timed(op, READ_TIMEOUT, read).await?;
        Ok(decode_documents::<R, T>(collection, documents))
    }

    async fn find_one<R, T>(
        &self,
        op: &'static str,
        collection: &'static str,
        filter: Document,
    ) -> StoreResult<Option<T>>
    where
        R: DeserializeOwned,
        T: From<R>,
    {
        let document = timed(op, READ_TIMEOUT, self.raw(collection).find_one(filter)).await?;
        document
            .map(|d| {
                bson::from_document::<R>(d)
                    .map(T::from)
                    .map_err(|e| StoreError::Backend(format!("Failed to decode record: {}", e)))
            })
            .transpose()
    }

    async fn delete_by_id(&self, collection: &'static str, id: &str) -> StoreResult<bool> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let result = timed(
            "delete",
            WRITE_TIMEOUT,
            self.raw(collection).delete_one(doc! { "_id": oid }),
        )
        .await?;
        Ok(result.deleted_count > 0)
    }
}

/// Run a driver call under `limit`, mapping failures to [`StoreError`].
async fn timed<T, F>(op: &'static str, limit: Duration, call: F) -> StoreResult<T>
where
    F: IntoFuture<Output = mongodb::error::Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(map_mongo_error),
        Err(_) => Err(StoreError::Timeout(op)),
    }
}

fn map_mongo_error(err: mongodb::error::Error) -> StoreError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
        if write_error.code == DUPLICATE_KEY {
            // users.email carries the only unique index
            return StoreError::Duplicate("email");
        }
    }
    StoreError::Backend(err.to_string())
}

fn inserted_hex(id: &bson::Bson) -> StoreResult<String> {
    id.as_object_id()
        .map(|oid| oid.to_hex())
        .ok_or_else(|| StoreError::Backend(format!("Unexpected inserted id: {}", id)))
}

#[async_trait]
impl Store for MongoDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.find_many::<UserRecord, User>("list users", collections::USERS, doc! {})
            .await
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        self.find_one::<UserRecord, User>("find user", collections::USERS, doc! { "_id": oid })
            .await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.find_one::<UserRecord, User>(
            "find user by email",
            collections::USERS,
            doc! { "email": email },
        )
        .await
    }

    async fn insert_user(&self, user: &User) -> StoreResult<String> {
        let record = UserRecord::from(user);
        let result = timed("insert user", WRITE_TIMEOUT, self.users().insert_one(record)).await?;
        inserted_hex(&result.inserted_id)
    }

    async fn replace_user(&self, id: &str, user: &User) -> StoreResult<bool> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let record = UserRecord::from(user);
        let result = timed(
            "replace user",
            WRITE_TIMEOUT,
            self.users().replace_one(doc! { "_id": oid }, record),
        )
        .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        self.delete_by_id(collections::USERS, id).await
    }

    // ─── Holding Operations ──────────────────────────────────────

    async fn list_holdings(&self) -> StoreResult<Vec<Holding>> {
        self.find_many::<HoldingRecord, Holding>("list holdings", collections::HOLDINGS, doc! {})
            .await
    }

    async fn find_holding_by_id(&self, id: &str) -> StoreResult<Option<Holding>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        self.find_one::<HoldingRecord, Holding>(
            "find holding",
            collections::HOLDINGS,
            doc! { "_id": oid },
        )
        .await
    }

    async fn find_holdings_by_ticker(&self, ticker: &str) -> StoreResult<Vec<Holding>> {
        self.find_many::<HoldingRecord, Holding>(
            "find holdings by ticker",
            collections::HOLDINGS,
            doc! { "ticker": ticker },
        )
        .await
    }

    async fn find_holdings_by_account(&self, pattern: &str) -> StoreResult<Vec<Holding>> {
        let regex = format!(".*{}.*", pattern);
        self.find_many::<HoldingRecord, Holding>(
            "find holdings by account",
            collections::HOLDINGS,
            doc! { "account": { "$regex": regex, "$options": "i" } },
        )
        .await
    }

    async fn insert_holding(&self, holding: &Holding) -> StoreResult<String> {
        let record = HoldingRecord::from(holding);
        let result = timed(
            "insert holding",
            WRITE_TIMEOUT,
            self.holdings().insert_one(record),
        )
        .await?;
        inserted_hex(&result.inserted_id)
    }

    async fn replace_holding(&self, id: &str, holding: &Holding) -> StoreResult<bool> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let record = HoldingRecord::from(holding);
        let result = timed(
            "replace holding",
            WRITE_TIMEOUT,
            self.holdings().replace_one(doc! { "_id": oid }, record),
        )
        .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_holding(&self, id: &str) -> StoreResult<bool> {
        self.delete_by_id(collections::HOLDINGS, id).await
    }
}

/// Decode fetched documents, skipping (and logging) any that do not match
/// the record shape.
fn decode_documents<R, T>(collection: &'static str, documents: Vec<Document>) -> Vec<T>
where
    R: DeserializeOwned,
    T: From<R>,
{
    documents
        .into_iter()
        .filter_map(|document| match bson::from_document::<R>(document) {
            Ok(record) => Some(T::from(record)),
            Err(e) => {
                tracing::warn!(error = %e, collection, "Skipping undecodable record");
                None
            }
        })
        .collect()
}
