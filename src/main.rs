// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stock-Service API Server
//!
//! Serves user accounts and stock holdings from MongoDB behind JWT bearer
//! authentication.

use std::sync::Arc;
use stock_service::{config::Config, db, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Stock-Service API");

    // Connect to the document store
    let store = db::connect(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to connect to database");
        e
    })?;
    tracing::info!(
        database = %config.mongo_db,
        in_memory = config.uses_memory_store(),
        "Database connected"
    );

    // Build shared state
    let port = config.port;
    let state = Arc::new(AppState::new(config, store));

    // Build router
    let app = stock_service::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stock_service=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
