//! Authentication errors.

use serde::Deserialize;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account already uses this email.
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    /// The account exists but its email was never confirmed.
    #[error("email not confirmed")]
    EmailNotConfirmed,

    /// Password rejected by the local policy or the provider.
    #[error("password too weak: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Recovery or confirmation link invalid or expired.
    #[error("token invalid or expired")]
    InvalidToken,

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotSignedIn,

    #[error("too many requests")]
    RateLimited,

    /// Any other provider rejection.
    #[error("identity provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The provider could not be reached.
    #[error("transport error: {0}")]
    Transport(#[from] grocer_data::FetchError),

    /// Session storage failed.
    #[error("cache error: {0}")]
    Cache(#[from] grocer_cache::CacheError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Error body returned by the identity provider. Field names vary across
/// endpoints and versions.
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AuthError {
    /// Map a non-2xx provider response.
    pub fn from_provider(status: u16, body: &[u8]) -> Self {
        let parsed: ProviderErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let message = parsed
            .error_description
            .clone()
            .or(parsed.msg.clone())
            .or(parsed.message.clone())
            .or(parsed.error.clone())
            .unwrap_or_else(|| format!("HTTP {}", status));
        let code = parsed.error_code.as_deref().unwrap_or("");
        let lower = message.to_lowercase();

        if status == 429 || code == "over_request_rate_limit" || code == "over_email_send_rate_limit" {
            AuthError::RateLimited
        } else if code == "invalid_credentials" || lower.contains("invalid login credentials") {
            AuthError::InvalidCredentials
        } else if code == "email_not_confirmed" || lower.contains("email not confirmed") {
            AuthError::EmailNotConfirmed
        } else if code == "user_already_exists" || lower.contains("already registered") {
            AuthError::UserAlreadyExists(message)
        } else if code == "weak_password" || lower.contains("password should be") {
            AuthError::WeakPassword(message)
        } else if code == "otp_expired" || lower.contains("expired") || lower.contains("invalid token") {
            AuthError::InvalidToken
        } else {
            AuthError::Provider { status, message }
        }
    }

    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::NotSignedIn
        )
    }

    /// Text suitable for a notice shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Incorrect email or password".to_string(),
            AuthError::UserAlreadyExists(_) => "An account with this email already exists".to_string(),
            AuthError::EmailNotConfirmed => {
                "Please confirm your email address before signing in".to_string()
            }
            AuthError::WeakPassword(reason) => reason.clone(),
            AuthError::PasswordMismatch => "Passwords do not match".to_string(),
            AuthError::InvalidEmail(_) => "Please enter a valid email address".to_string(),
            AuthError::InvalidToken => "This link is invalid or has expired".to_string(),
            AuthError::NotSignedIn => "Please sign in first".to_string(),
            AuthError::RateLimited => "Too many attempts, please try again later".to_string(),
            AuthError::Provider { message, .. } => message.clone(),
            AuthError::Transport(_) => "Unable to reach the server, check your connection".to_string(),
            AuthError::Cache(_) | AuthError::Serialization(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_provider_bodies() {
        let err = AuthError::from_provider(
            400,
            br#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = AuthError::from_provider(400, br#"{"code":400,"error_code":"email_not_confirmed","msg":"Email not confirmed"}"#);
        assert!(matches!(err, AuthError::EmailNotConfirmed));

        let err = AuthError::from_provider(422, br#"{"msg":"User already registered"}"#);
        assert!(matches!(err, AuthError::UserAlreadyExists(_)));

        let err = AuthError::from_provider(403, br#"{"error_code":"otp_expired","msg":"Email link is invalid or has expired"}"#);
        assert!(matches!(err, AuthError::InvalidToken));

        let err = AuthError::from_provider(429, b"");
        assert!(matches!(err, AuthError::RateLimited));
    }

    #[test]
    fn test_unknown_body_keeps_status() {
        match AuthError::from_provider(500, b"gateway down") {
            AuthError::Provider { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "HTTP 500");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(AuthError::InvalidCredentials.user_message(), "Incorrect email or password");
        assert!(AuthError::NotSignedIn.is_auth_failure());
        assert!(!AuthError::RateLimited.is_auth_failure());
    }
}
