//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User account stored in the `users` collection.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// ObjectId (hex); `None` until inserted
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    /// Login key, unique across users
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    pub timezone: String,
    pub profile_image_url: String,
    /// When the account was created
    pub date: DateTime<Utc>,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub timezone: String,
    pub profile_image_url: String,
    #[serde(serialize_with = "crate::time_utils::rfc3339::serialize")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone().unwrap_or_default(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            timezone: user.timezone.clone(),
            profile_image_url: user.profile_image_url.clone(),
            date: user.date,
        }
    }
}

/// Registration payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// Password confirmation
    pub password2: String,
    pub timezone: String,
    pub profile_image_url: String,
}

/// Login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Full-replacement payload for an existing user.
///
/// Keys outside these fields are ignored, so a profile fetched with GET can
/// be edited and sent back. Its `_id` and `date` never override the stored
/// record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Plaintext; re-hashed before storage
    pub password: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub profile_image_url: String,
}
