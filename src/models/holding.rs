// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Holding model, request decoding and summary aggregation.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Field names a client may send for a holding.
pub const HOLDING_FIELDS: [&str; 4] = ["ticker", "quantity", "totalCost", "account"];

/// A financial position stored in the `holdings` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Holding {
    /// Server-assigned ObjectId (hex)
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub ticker: String,
    /// Number of shares (may be fractional)
    pub quantity: f64,
    /// Total cost in currency units
    pub total_cost: f64,
    /// Free-text account label
    pub account: String,
}

/// Why a holding payload was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HoldingInputError {
    #[error("Invalid input data")]
    NotAnObject,

    #[error("ID should not be provided for a new holding")]
    IdProvided,

    #[error("ID in body does not match ID in path")]
    IdMismatch,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

/// Validated holding fields supplied by a client.
///
/// Decoded in two phases: the raw JSON object's key set is checked against
/// [`HOLDING_FIELDS`] first, then each field is decoded into its strict type.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct HoldingInput {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub ticker: String,
    pub quantity: f64,
    pub total_cost: f64,
    pub account: String,
}

impl HoldingInput {
    /// Decode a payload for a new holding. Any identity field is rejected.
    pub fn for_create(value: Value) -> Result<Self, HoldingInputError> {
        let mut map = into_object(value)?;
        if map.contains_key("_id") || map.contains_key("id") {
            return Err(HoldingInputError::IdProvided);
        }
        Self::decode(&mut map)
    }

    /// Decode a full-replacement payload. An `_id` is tolerated only when it
    /// names the holding being replaced.
    pub fn for_replace(value: Value, id: &str) -> Result<Self, HoldingInputError> {
        let mut map = into_object(value)?;
        for key in ["_id", "id"] {
            if let Some(body_id) = map.remove(key) {
                if body_id.as_str() != Some(id) {
                    return Err(HoldingInputError::IdMismatch);
                }
            }
        }
        Self::decode(&mut map)
    }

    fn decode(map: &mut Map<String, Value>) -> Result<Self, HoldingInputError> {
        if let Some(unknown) = map.keys().find(|k| !HOLDING_FIELDS.contains(&k.as_str())) {
            return Err(HoldingInputError::UnknownField(unknown.clone()));
        }

        let input = Self {
            ticker: take_string(map, "ticker")?,
            quantity: take_number(map, "quantity")?,
            total_cost: take_number(map, "totalCost")?,
            account: take_string(map, "account")?,
        };

        input.validate().map_err(|errors| {
            let (field, reason) = errors
                .field_errors()
                .into_iter()
                .next()
                .map(|(field, errs)| {
                    let reason = errs
                        .first()
                        .and_then(|e| e.message.as_ref())
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "failed validation".to_string());
                    (field.to_string(), reason)
                })
                .unwrap_or_else(|| ("holding".to_string(), "failed validation".to_string()));
            HoldingInputError::InvalidField { field, reason }
        })?;

        Ok(input)
    }

    /// Build the storable record.
    pub fn into_holding(self, id: Option<String>) -> Holding {
        Holding {
            id,
            ticker: self.ticker,
            quantity: self.quantity,
            total_cost: self.total_cost,
            account: self.account,
        }
    }
}

fn into_object(value: Value) -> Result<Map<String, Value>, HoldingInputError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(HoldingInputError::NotAnObject),
    }
}

fn take_string(map: &mut Map<String, Value>, field: &str) -> Result<String, HoldingInputError> {
    match map.remove(field) {
        None | Some(Value::Null) => Err(HoldingInputError::MissingField(field.to_string())),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(HoldingInputError::InvalidField {
            field: field.to_string(),
            reason: "expected a string".to_string(),
        }),
    }
}

fn take_number(map: &mut Map<String, Value>, field: &str) -> Result<f64, HoldingInputError> {
    match map.remove(field) {
        None | Some(Value::Null) => Err(HoldingInputError::MissingField(field.to_string())),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| HoldingInputError::InvalidField {
            field: field.to_string(),
            reason: "expected a number".to_string(),
        }),
        Some(_) => Err(HoldingInputError::InvalidField {
            field: field.to_string(),
            reason: "expected a number".to_string(),
        }),
    }
}

// ─── Aggregation ─────────────────────────────────────────────

/// Summary over a set of holdings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HoldingsSummary {
    /// Number of holdings
    pub found: usize,
    /// Sum of `totalCost`, rounded to cents
    pub total_cost: f64,
}

impl HoldingsSummary {
    /// Count the holdings and total their cost.
    ///
    /// Each cost is taken at its shortest decimal form, summed exactly and
    /// rounded once, half away from zero at the hundredths place:
    /// `[10.005, 10.005]` sums to `20.01` and `[1.005]` to `1.01`.
    pub fn from_holdings(holdings: &[Holding]) -> Self {
        let exact = holdings
            .iter()
            .try_fold(Decimal::ZERO, |sum, h| sum.checked_add(to_decimal(h.total_cost)?));

        let total_cost = match exact {
            Some(sum) => decimal_cents(sum),
            // Not representable as a decimal (e.g. astronomically large).
            None => round_cents(holdings.iter().map(|h| h.total_cost).sum()),
        };

        Self {
            found: holdings.len(),
            total_cost,
        }
    }
}

/// Round to two decimal places, ties away from zero.
///
/// Ties are judged on the value as written, not its binary approximation,
/// so `1.005`, `1.015` and `0.285` all round up.
pub fn round_cents(value: f64) -> f64 {
    to_decimal(value).map_or_else(|| float_cents(value), decimal_cents)
}

/// Shortest round-trip decimal form of `value`, if it fits a [`Decimal`].
fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    value.to_string().parse().ok()
}

fn decimal_cents(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

fn float_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
