// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access and refresh token issuance.
//!
//! Both tokens are HS256 JWTs carrying the user id and email. They are
//! signed with separate secrets and never persisted.

use crate::config::Config;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Access token lifetime.
pub const ACCESS_TOKEN_TTL_DAYS: i64 = 30;
/// Refresh token lifetime.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Claims of an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id (ObjectId hex)
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Claims of a refresh token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_claims: AccessClaims,
    pub refresh_claims: RefreshClaims,
}

/// Token issuance errors
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("{0} not set")]
    MissingSecret(&'static str),

    #[error("Token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Signs tokens with the configured secrets.
#[derive(Clone)]
pub struct TokenIssuer {
    access_secret: Vec<u8>,
    refresh_secret: Vec<u8>,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(access_secret: impl Into<Vec<u8>>, refresh_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.access_token_secret.clone(),
            config.refresh_token_secret.clone(),
        )
    }

    /// Secret used to sign and verify access tokens.
    pub fn access_secret(&self) -> Result<&[u8], TokenError> {
        non_empty(&self.access_secret, "ACCESS_TOKEN_SECRET")
    }

    /// Secret used to sign refresh tokens.
    pub fn refresh_secret(&self) -> Result<&[u8], TokenError> {
        non_empty(&self.refresh_secret, "REFRESH_TOKEN_SECRET")
    }

    /// Fail early if either secret is missing.
    pub fn ensure_configured(&self) -> Result<(), TokenError> {
        self.access_secret()?;
        self.refresh_secret()?;
        Ok(())
    }

    /// Issue a token pair for a user, timed from now.
    pub fn issue(&self, id: &str, email: &str) -> Result<TokenPair, TokenError> {
        self.issue_at(id, email, Utc::now())
    }

    /// Issue a token pair as of `now`.
    ///
    /// Both secrets are checked before anything is signed.
    pub fn issue_at(
        &self,
        id: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let access_key = EncodingKey::from_secret(self.access_secret()?);
        let refresh_key = EncodingKey::from_secret(self.refresh_secret()?);
        let header = Header::new(Algorithm::HS256);
        let iat = now.timestamp();

        let access_claims = AccessClaims {
            id: id.to_string(),
            email: email.to_string(),
            iat,
            exp: (now + Duration::days(ACCESS_TOKEN_TTL_DAYS)).timestamp(),
        };
        let refresh_claims = RefreshClaims {
            id: id.to_string(),
            email: email.to_string(),
            iat,
            exp: (now + Duration::days(REFRESH_TOKEN_TTL_DAYS)).timestamp(),
        };

        let access_token = encode(&header, &access_claims, &access_key)?;
        let refresh_token = encode(&header, &refresh_claims, &refresh_key).map_err(|e| {
            tracing::error!(error = %e, "Refresh token signing failed");
            e
        })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_claims,
            refresh_claims,
        })
    }
}

fn non_empty<'a>(secret: &'a [u8], name: &'static str) -> Result<&'a [u8], TokenError> {
    if secret.is_empty() {
        Err(TokenError::MissingSecret(name))
    } else {
        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    const ID: &str = "65f0c0ffee0000000000beef";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"access-secret".to_vec(), b"refresh-secret".to_vec())
    }

    #[test]
    fn test_expirations_are_exact() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let pair = issuer().issue_at(ID, "a@example.com", now).unwrap();

        assert_eq!(pair.access_claims.iat, now.timestamp());
        assert_eq!(pair.access_claims.exp - pair.access_claims.iat, 30 * 86400);
        assert_eq!(pair.refresh_claims.exp - pair.refresh_claims.iat, 7 * 86400);
    }

    #[test]
    fn test_tokens_verify_with_their_own_secret() {
        let pair = issuer().issue(ID, "a@example.com").unwrap();
        let validation = Validation::new(Algorithm::HS256);

        let access = decode::<AccessClaims>(
            &pair.access_token,
            &DecodingKey::from_secret(b"access-secret"),
            &validation,
        )
        .unwrap();
        assert_eq!(access.claims, pair.access_claims);

        let refresh = decode::<RefreshClaims>(
            &pair.refresh_token,
            &DecodingKey::from_secret(b"refresh-secret"),
            &validation,
        )
        .unwrap();
        assert_eq!(refresh.claims.id, ID);

        // Secrets are not interchangeable
        assert!(decode::<AccessClaims>(
            &pair.refresh_token,
            &DecodingKey::from_secret(b"access-secret"),
            &validation,
        )
        .is_err());
    }

    #[test]
    fn test_missing_secret_fails() {
        let err = TokenIssuer::new(Vec::new(), b"refresh".to_vec())
            .issue(ID, "a@example.com")
            .unwrap_err();
        assert!(matches!(err, TokenError::MissingSecret("ACCESS_TOKEN_SECRET")));

        let err = TokenIssuer::new(b"access".to_vec(), Vec::new())
            .issue(ID, "a@example.com")
            .unwrap_err();
        assert!(matches!(err, TokenError::MissingSecret("REFRESH_TOKEN_SECRET")));
        assert_eq!(err.to_string(), "REFRESH_TOKEN_SECRET not set");
    }

    #[test]
    fn test_claims_use_underscore_id() {
        let pair = issuer().issue(ID, "a@example.com").unwrap();
        let value = serde_json::to_value(&pair.access_claims).unwrap();
        assert_eq!(value["_id"], ID);
        assert_eq!(value["email"], "a@example.com");
    }
}
