// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Values come from the process environment, optionally seeded from
//! `.env` and `config/config.env` for local development.

use std::env;

/// Default listen port when `PORT` is unset or unparsable.
pub const DEFAULT_PORT: u16 = 3000;

/// Default base directory for static assets.
pub const DEFAULT_PUBLIC_FILES_PATH: &str = "./public";

/// Connection URI that selects the in-process store instead of MongoDB.
pub const MEMORY_STORE_URI: &str = "memory://";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// MongoDB connection URI
    pub mongo_uri: String,
    /// MongoDB database name
    pub mongo_db: String,
    /// Base directory for `/css`, `/js` and `/images`
    pub public_files_path: String,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// HMAC secret for access tokens (may be empty; checked at use)
    pub access_token_secret: Vec<u8>,
    /// HMAC secret for refresh tokens (may be empty; checked at use)
    pub refresh_token_secret: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Token secrets are not required at startup. An absent secret is
    /// reported when a token is issued or verified.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::from_filename("config/config.env").ok();
        dotenvy::dotenv().ok();

        let config = Self {
            mongo_uri: required("MONGO_URI")?,
            mongo_db: required("MONGO_DB")?,
            public_files_path: env::var("PUBLIC_FILES_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PUBLIC_FILES_PATH.to_string()),
            port: parse_port(env::var("PORT").ok().as_deref()),
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")
                .unwrap_or_default()
                .into_bytes(),
            refresh_token_secret: env::var("REFRESH_TOKEN_SECRET")
                .unwrap_or_default()
                .into_bytes(),
        };

        if config.access_token_secret.is_empty() {
            tracing::warn!("ACCESS_TOKEN_SECRET not set; protected routes will fail");
        }
        if config.refresh_token_secret.is_empty() {
            tracing::warn!("REFRESH_TOKEN_SECRET not set; token issuance will fail");
        }

        Ok(config)
    }

    /// Fixed configuration for tests, backed by the in-process store.
    pub fn test_default() -> Self {
        Self {
            mongo_uri: MEMORY_STORE_URI.to_string(),
            mongo_db: "stock_service_test".to_string(),
            public_files_path: DEFAULT_PUBLIC_FILES_PATH.to_string(),
            port: DEFAULT_PORT,
            access_token_secret: b"test_access_secret_32_bytes_min!".to_vec(),
            refresh_token_secret: b"test_refresh_secret_32_bytes_min".to_vec(),
        }
    }

    /// Whether the in-process store was requested instead of MongoDB.
    pub fn uses_memory_store(&self) -> bool {
        self.mongo_uri == MEMORY_STORE_URI
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|p| p.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
