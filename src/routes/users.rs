// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User account and session routes.

use crate::db::is_object_id;
use crate::error::{AppError, Result};
use crate::models::{LoginRequest, RegistrationRequest, UserProfile, UserUpdate};
use crate::routes::json_body;
use crate::services::tokens::AccessClaims;
use crate::services::users;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Routes reachable without a token.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/login", post(login))
        .route("/users/register", post(register))
        .route("/users/id/{_id}", put(update_user))
}

/// Routes behind the auth gate.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/", get(list_users))
        .route("/users/id/{_id}", get(get_user).delete(delete_user))
}

/// `{"response": ...}` wrapper used by the session endpoints.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub response: T,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ─── Login ───────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TokenDetails {
    pub access_token: String,
    pub refresh_token: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Access token expiry (Unix timestamp)
    pub exp: i64,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: UserProfile,
    pub auth: TokenDetails,
}

async fn login(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Envelope<LoginResponse>>> {
    let req = json_body(payload, "Invalid request")?;
    let session = users::login(state.db.as_ref(), &state.tokens, req).await?;

    Ok(Json(Envelope {
        response: LoginResponse {
            success: true,
            user: UserProfile::from(&session.user),
            auth: TokenDetails {
                access_token: session.tokens.access_token,
                refresh_token: session.tokens.refresh_token,
                iat: session.tokens.access_claims.iat,
                exp: session.tokens.access_claims.exp,
            },
        },
    }))
}

// ─── Registration ────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationAuth {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_properties: AccessClaims,
}

#[derive(Serialize)]
pub struct RegistrationResponse {
    pub user: UserProfile,
    pub auth: RegistrationAuth,
}

async fn register(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<Json<Envelope<RegistrationResponse>>> {
    let req = json_body(payload, "Invalid input data")?;
    let created = users::register(state.db.as_ref(), &state.tokens, req).await?;

    Ok(Json(Envelope {
        response: RegistrationResponse {
            user: UserProfile::from(&created.user),
            auth: RegistrationAuth {
                access_token: created.tokens.access_token,
                refresh_token: created.tokens.refresh_token,
                access_token_properties: created.tokens.access_claims,
            },
        },
    }))
}

// ─── Accounts ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UsersResponse {
    pub count: usize,
    pub users: Vec<UserProfile>,
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<UsersResponse>> {
    let users = state
        .db
        .list_users()
        .await
        .map_err(|e| AppError::database("Failed to retrieve users", e))?;

    let users: Vec<UserProfile> = users.iter().map(UserProfile::from).collect();
    Ok(Json(UsersResponse {
        count: users.len(),
        users,
    }))
}

fn user_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("User ID: {} not found", id))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>> {
    if !is_object_id(&id) {
        return Err(user_not_found(&id));
    }

    let user = state
        .db
        .find_user_by_id(&id)
        .await
        .map_err(|e| AppError::database("Failed to retrieve user", e))?
        .ok_or_else(|| user_not_found(&id))?;

    Ok(Json(UserProfile::from(&user)))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !is_object_id(&id) {
        return Err(user_not_found(&id));
    }

    let user = state
        .db
        .find_user_by_id(&id)
        .await
        .map_err(|e| AppError::database("Failed to delete user", e))?
        .ok_or_else(|| user_not_found(&id))?;

    let deleted = state
        .db
        .delete_user(&id)
        .await
        .map_err(|e| AppError::database("Failed to delete user", e))?;
    if !deleted {
        return Err(user_not_found(&id));
    }

    tracing::info!(user_id = %id, "User deleted");

    Ok(Json(MessageResponse {
        message: format!("User {} deleted successfully!", user.email),
    }))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let update = json_body(payload, "Invalid input data")?;
    users::replace_user(state.db.as_ref(), &id, update).await?;

    Ok(Json(MessageResponse {
        message: format!("User {} updated successfully!", id),
    }))
}
