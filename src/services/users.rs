// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and account replacement.
//!
//! Passwords are stored as bcrypt hashes at the library's default cost.
//! Hashing runs on the blocking pool so it does not stall request tasks.

use crate::db::{is_object_id, Store, StoreError};
use crate::error::{AppError, Result};
use crate::models::{LoginRequest, RegistrationRequest, User, UserUpdate};
use crate::services::tokens::{TokenIssuer, TokenPair};

/// Message returned for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// A user together with freshly issued tokens.
#[derive(Debug)]
pub struct Authenticated {
    pub user: User,
    pub tokens: TokenPair,
}

/// Hash a password with bcrypt.
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AppError::Internal(anyhow::anyhow!("Failed to encrypt password"))
        })
}

/// Check a password against a stored hash. A malformed hash never matches.
pub async fn verify_password(password: String, hash: String) -> Result<bool> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(outcome.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored password hash could not be checked");
        false
    }))
}

/// Create an account and issue its first tokens.
///
/// Checks run in order and all pass before anything is written: required
/// fields, password confirmation, then email availability. The email
/// lookup only produces a friendly error; the store's unique constraint
/// decides races between concurrent registrations.
pub async fn register(
    db: &dyn Store,
    issuer: &TokenIssuer,
    req: RegistrationRequest,
) -> Result<Authenticated> {
    let required = [
        &req.first_name,
        &req.last_name,
        &req.email,
        &req.password,
        &req.password2,
    ];
    if required.iter().any(|field| field.is_empty()) {
        return Err(AppError::BadRequest("Please fill in all fields".to_string()));
    }
    if req.password != req.password2 {
        return Err(AppError::BadRequest("Passwords do not match".to_string()));
    }

    let existing = db
        .find_user_by_email(&req.email)
        .await
        .map_err(|e| AppError::database("Failed to register user", e))?;
    if existing.is_some() {
        return Err(email_taken(&req.email));
    }

    // Tokens are issued after the insert; refuse before writing if that would fail.
    issuer.ensure_configured()?;

    let password_hash = hash_password(req.password).await?;

    let mut user = User {
        id: None,
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        password_hash,
        timezone: req.timezone,
        profile_image_url: req.profile_image_url,
        date: chrono::Utc::now(),
    };

    let id = db.insert_user(&user).await.map_err(|e| match e {
        StoreError::Duplicate(_) => email_taken(&user.email),
        e => AppError::database("Failed to register user", e),
    })?;
    user.id = Some(id.clone());

    let tokens = issuer.issue(&id, &user.email)?;

    tracing::info!(user_id = %id, "User registered");

    Ok(Authenticated { user, tokens })
}

/// Check credentials and issue tokens.
///
/// Unknown email and wrong password fail identically.
pub async fn login(db: &dyn Store, issuer: &TokenIssuer, req: LoginRequest) -> Result<Authenticated> {
    let user = db
        .find_user_by_email(&req.email)
        .await
        .map_err(|e| AppError::database("Failed to log in", e))?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(req.password, user.password_hash.clone()).await? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let id = user.id.clone().unwrap_or_default();
    let tokens = issuer.issue(&id, &user.email)?;

    tracing::info!(user_id = %id, "User logged in");

    Ok(Authenticated { user, tokens })
}

/// Replace an existing user's profile and password.
///
/// The creation date is carried over from the stored record.
pub async fn replace_user(db: &dyn Store, id: &str, update: UserUpdate) -> Result<()> {
    let not_found = || AppError::NotFound(format!("User ID: {} not found", id));

    if !is_object_id(id) {
        return Err(not_found());
    }

    let required = [
        &update.first_name,
        &update.last_name,
        &update.email,
        &update.password,
    ];
    if required.iter().any(|field| field.is_empty()) {
        return Err(AppError::BadRequest("Please fill in all fields".to_string()));
    }

    let existing = db
        .find_user_by_id(id)
        .await
        .map_err(|e| AppError::database("Failed to update user", e))?
        .ok_or_else(not_found)?;

    let password_hash = hash_password(update.password).await?;

    let user = User {
        id: Some(id.to_string()),
        first_name: update.first_name,
        last_name: update.last_name,
        email: update.email,
        password_hash,
        timezone: update.timezone,
        profile_image_url: update.profile_image_url,
        date: existing.date,
    };

    let matched = db.replace_user(id, &user).await.map_err(|e| match e {
        StoreError::Duplicate(_) => email_taken(&user.email),
        e => AppError::database("Failed to update user", e),
    })?;
    if !matched {
        return Err(not_found());
    }

    tracing::info!(user_id = %id, "User replaced");
    Ok(())
}

fn email_taken(email: &str) -> AppError {
    AppError::Conflict(format!("User {} already exists", email))
}
