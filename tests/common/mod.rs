// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use stock_service::config::Config;
use stock_service::db::{MemoryDb, MongoDb, Store};
use stock_service::routes::create_router;
use stock_service::services::TokenIssuer;
use stock_service::AppState;
use tower::ServiceExt;

/// Check if a MongoDB test server is configured.
#[allow(dead_code)]
pub fn mongo_available() -> bool {
    std::env::var("MONGO_TEST_URI").is_ok()
}

/// Skip test with message if no MongoDB server is configured.
#[macro_export]
macro_rules! require_mongo {
    () => {
        if !crate::common::mongo_available() {
            eprintln!("⚠️  Skipping: MONGO_TEST_URI not set");
            return;
        }
    };
}

/// Connect to the MongoDB test server in a fresh database.
#[allow(dead_code)]
pub async fn test_mongo() -> MongoDb {
    test_mongo_named().await.0
}

/// Like [`test_mongo`], also returning a raw driver handle to the same
/// database for seeding documents the store would never write.
#[allow(dead_code)]
pub async fn test_mongo_named() -> (MongoDb, mongodb::Database) {
    let uri = std::env::var("MONGO_TEST_URI").expect("MONGO_TEST_URI not set");
    let name = format!("stock_service_test_{}", bson::oid::ObjectId::new().to_hex());
    let db = MongoDb::connect(&uri, &name)
        .await
        .expect("Failed to connect to MongoDB");
    db.init_indexes().await.expect("Failed to create indexes");

    let raw = mongodb::Client::with_uri_str(&uri)
        .await
        .expect("Failed to connect to MongoDB")
        .database(&name);
    (db, raw)
}

/// Create a test app over the in-process store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default())
}

/// Create a test app with a custom configuration.
#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>) {
    let db: Arc<dyn Store> = Arc::new(MemoryDb::new());
    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

/// Create a valid access token for the given user.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, email: &str, secret: &[u8]) -> String {
    TokenIssuer::new(secret.to_vec(), b"refresh".to_vec())
        .issue(user_id, email)
        .expect("Failed to create JWT")
        .access_token
}

/// Token for a made-up user, signed with the app's access secret.
#[allow(dead_code)]
pub fn test_token(state: &AppState) -> String {
    create_test_jwt(
        "65f0c0ffee0000000000beef",
        "tester@example.com",
        &state.config.access_token_secret,
    )
}

/// Build a request with an optional bearer token and JSON body.
#[allow(dead_code)]
pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON response body.
#[allow(dead_code)]
pub async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    json_response(response).await
}

#[allow(dead_code)]
pub async fn json_response(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
