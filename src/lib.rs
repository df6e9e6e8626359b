// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Stock-Service: track stock holdings behind a token-authenticated API
//!
//! This crate provides the backend API for managing user accounts and the
//! holdings records they own, stored in MongoDB.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::TokenIssuer;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Store>,
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Build state from configuration and an open store.
    pub fn new(config: Config, db: Arc<dyn Store>) -> Self {
        let tokens = TokenIssuer::from_config(&config);
        Self { config, db, tokens }
    }
}
