// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Holdings routes (require authentication via JWT).

use crate::db::is_object_id;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Holding, HoldingInput, HoldingsSummary};
use crate::routes::json_body;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Holdings routes. The auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/holdings", get(list_holdings).post(create_holding))
        .route("/holdings/", get(list_holdings).post(create_holding))
        .route(
            "/holdings/id/{_id}",
            get(get_holding).put(update_holding).delete(delete_holding),
        )
        .route("/holdings/ticker/{ticker}", get(holdings_by_ticker))
        .route("/holdings/account/{account}", get(holdings_by_account))
}

/// Holdings listing with its summary.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HoldingsResponse {
    pub summary: HoldingsSummary,
    pub holdings: Vec<Holding>,
}

impl From<Vec<Holding>> for HoldingsResponse {
    fn from(holdings: Vec<Holding>) -> Self {
        Self {
            summary: HoldingsSummary::from_holdings(&holdings),
            holdings,
        }
    }
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub message: String,
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn holding_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Holding ID: {} not found", id))
}

/// Load a holding or answer 404.
async fn load_holding(state: &AppState, id: &str) -> Result<Holding> {
    if !is_object_id(id) {
        return Err(holding_not_found(id));
    }
    state
        .db
        .find_holding_by_id(id)
        .await
        .map_err(|e| AppError::database("Failed to retrieve holding", e))?
        .ok_or_else(|| holding_not_found(id))
}

// ─── Collection ──────────────────────────────────────────────

async fn list_holdings(State(state): State<Arc<AppState>>) -> Result<Json<HoldingsResponse>> {
    let holdings = state
        .db
        .list_holdings()
        .await
        .map_err(|e| AppError::database("Failed to retrieve holdings", e))?;

    Ok(Json(HoldingsResponse::from(holdings)))
}

async fn create_holding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let body = json_body(payload, "Invalid input data")?;
    let input = HoldingInput::for_create(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let holding = input.into_holding(None);

    let id = state
        .db
        .insert_holding(&holding)
        .await
        .map_err(|e| AppError::database("Failed to add holding", e))?;

    tracing::info!(
        user_id = %user.id,
        holding_id = %id,
        ticker = %holding.ticker,
        "Holding added"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: format!(
                "Successfully added holdings for ticker {} with ID {}",
                holding.ticker, id
            ),
            id,
        }),
    ))
}

// ─── Single Holding ──────────────────────────────────────────

async fn get_holding(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Holding>> {
    Ok(Json(load_holding(&state, &id).await?))
}

async fn update_holding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let existing = load_holding(&state, &id).await?;

    let body = json_body(payload, "Invalid input data")?;
    let input =
        HoldingInput::for_replace(body, &id).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let holding = input.into_holding(Some(id.clone()));

    let matched = state
        .db
        .replace_holding(&id, &holding)
        .await
        .map_err(|e| AppError::database("Failed to update holding", e))?;
    if !matched {
        return Err(holding_not_found(&id));
    }

    tracing::info!(user_id = %user.id, holding_id = %id, "Holding replaced");

    Ok(Json(MessageResponse {
        message: format!("Holdings for {} updated successfully!", existing.ticker),
    }))
}

async fn delete_holding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let existing = load_holding(&state, &id).await?;

    let deleted = state
        .db
        .delete_holding(&id)
        .await
        .map_err(|e| AppError::database("Failed to delete holding", e))?;
    if !deleted {
        return Err(holding_not_found(&id));
    }

    tracing::info!(user_id = %user.id, holding_id = %id, "Holding deleted");

    Ok(Json(MessageResponse {
        message: format!("Holdings for {} deleted successfully!", existing.ticker),
    }))
}

// ─── Filters ─────────────────────────────────────────────────

async fn holdings_by_ticker(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<Vec<Holding>>> {
    let holdings = state
        .db
        .find_holdings_by_ticker(&ticker)
        .await
        .map_err(|e| AppError::database("Failed to retrieve holdings", e))?;

    if holdings.is_empty() {
        return Err(AppError::NotFound(
            "No holdings found for the given ticker".to_string(),
        ));
    }

    Ok(Json(holdings))
}

async fn holdings_by_account(
    State(state): State<Arc<AppState>>,
    Path(account): Path<String>,
) -> Result<Json<HoldingsResponse>> {
    tracing::debug!(pattern = %account, "Filtering holdings by account");

    let holdings = state
        .db
        .find_holdings_by_account(&account)
        .await
        .map_err(|e| AppError::database("Failed to retrieve holdings", e))?;

    if holdings.is_empty() {
        return Err(AppError::NotFound(
            "No holdings found for the given account pattern".to_string(),
        ));
    }

    Ok(Json(HoldingsResponse::from(holdings)))
}
