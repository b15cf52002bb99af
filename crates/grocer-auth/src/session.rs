//! Session tokens issued by the identity provider.

use crate::user::AuthUser;
use crate::AuthError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Refresh this long before the access token actually expires.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Token response of the password and refresh grants.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// An authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl AuthSession {
    /// Default lifetime when the provider omits one.
    pub const DEFAULT_DURATION_SECS: i64 = 60 * 60;

    pub(crate) fn from_token_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let expires_at = response
            .expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(|| {
                now + Duration::seconds(response.expires_in.unwrap_or(Self::DEFAULT_DURATION_SECS))
            });
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type,
            expires_at,
            user: response.user,
        }
    }

    /// Check if session is expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the access token should be refreshed before use.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) >= self.expires_at
    }

    /// Validate the session, returning error if invalid.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        if self.is_expired(now) {
            Err(AuthError::InvalidToken)
        } else {
            Ok(())
        }
    }

    /// Get time until expiration in seconds.
    pub fn time_to_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    /// `Authorization` header value.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}
