//! One-time tokens sent by email.
//!
//! Confirmation and password-recovery emails link back to the storefront
//! with a `token_hash` and a `type` query parameter.

use crate::AuthError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What an emailed token proves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpType {
    /// Sign-up confirmation.
    Signup,
    /// Password reset.
    Recovery,
    /// Passwordless login.
    Magiclink,
    EmailChange,
    Invite,
}

impl OtpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpType::Signup => "signup",
            OtpType::Recovery => "recovery",
            OtpType::Magiclink => "magiclink",
            OtpType::EmailChange => "email_change",
            OtpType::Invite => "invite",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "signup" => Some(OtpType::Signup),
            "recovery" => Some(OtpType::Recovery),
            "magiclink" => Some(OtpType::Magiclink),
            "email_change" => Some(OtpType::EmailChange),
            "invite" => Some(OtpType::Invite),
            _ => None,
        }
    }
}

impl fmt::Display for OtpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token taken from an email link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailLink {
    pub token_hash: String,
    pub otp_type: OtpType,
}

impl EmailLink {
    pub fn recovery(token_hash: impl Into<String>) -> Self {
        Self {
            token_hash: token_hash.into(),
            otp_type: OtpType::Recovery,
        }
    }

    /// Read `token_hash` and `type` from a link.
    ///
    /// Both the query string and the URL fragment are searched.
    pub fn parse(link: &str) -> Result<Self, AuthError> {
        let url = url::Url::parse(link).map_err(|_| AuthError::InvalidToken)?;
        let fragment_pairs = url
            .fragment()
            .map(|f| url::form_urlencoded::parse(f.as_bytes()).into_owned().collect::<Vec<_>>())
            .unwrap_or_default();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .into_owned()
            .chain(fragment_pairs)
            .collect();

        let find = |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .filter(|v| !v.is_empty())
        };
        let token_hash = find("token_hash").ok_or(AuthError::InvalidToken)?;
        let otp_type = find("type")
            .and_then(|t| OtpType::parse(&t))
            .ok_or(AuthError::InvalidToken)?;

        Ok(Self { token_hash, otp_type })
    }
}
