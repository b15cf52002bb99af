//! HTTP client error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when making HTTP requests.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Failed to send the request.
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-2xx response.
    #[error("{0}")]
    Api(ApiError),

    /// Failed to parse response body.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request timeout.
    #[error("Request timed out")]
    Timeout,

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl FetchError {
    /// Domain code of an API rejection.
    pub fn code(&self) -> Option<ApiErrorCode> {
        match self {
            FetchError::Api(e) => Some(e.code),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Api(e) => Some(e.status),
            _ => None,
        }
    }

    /// Whether the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(ApiErrorCode::NotFound)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::JsonError(e.to_string())
    }
}

impl From<url::ParseError> for FetchError {
    fn from(e: url::ParseError) -> Self {
        FetchError::InvalidUrl(e.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::RequestError(e.to_string())
        }
    }
}

/// Domain rejection reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    /// The order's status no longer allows item changes.
    OrderNotEditable,
    /// Not enough stock for the requested quantity.
    InsufficientStock,
    /// Removing the item would leave the order empty.
    LastItem,
    /// Slug already used by another row.
    SlugTaken,
    NotFound,
    Unauthorized,
    /// Request body failed validation.
    Validation,
    Conflict,
    /// Anything the client has no specific handling for.
    Unknown,
}

impl ApiErrorCode {
    const KNOWN: [ApiErrorCode; 8] = [
        ApiErrorCode::OrderNotEditable,
        ApiErrorCode::InsufficientStock,
        ApiErrorCode::LastItem,
        ApiErrorCode::SlugTaken,
        ApiErrorCode::NotFound,
        ApiErrorCode::Unauthorized,
        ApiErrorCode::Validation,
        ApiErrorCode::Conflict,
    ];

    /// Parse a wire code; unrecognised codes map to `Unknown`.
    pub fn parse(code: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|c| c.as_str() == code)
            .unwrap_or(ApiErrorCode::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiErrorCode::OrderNotEditable => "order_not_editable",
            ApiErrorCode::InsufficientStock => "insufficient_stock",
            ApiErrorCode::LastItem => "last_item",
            ApiErrorCode::SlugTaken => "slug_taken",
            ApiErrorCode::NotFound => "not_found",
            ApiErrorCode::Unauthorized => "unauthorized",
            ApiErrorCode::Validation => "validation",
            ApiErrorCode::Conflict => "conflict",
            ApiErrorCode::Unknown => "unknown",
        }
    }

    /// Classify a response that carries no `code` field.
    ///
    /// Known backend phrases are matched first, then the status code decides.
    pub fn classify(status: u16, message: &str) -> Self {
        let message = message.to_lowercase();
        if message.contains("insufficient stock") {
            ApiErrorCode::InsufficientStock
        } else if message.contains("cannot be modified") {
            ApiErrorCode::OrderNotEditable
        } else if message.contains("at least one item") || message.contains("last item") {
            ApiErrorCode::LastItem
        } else if message.contains("slug") && message.contains("exist") {
            ApiErrorCode::SlugTaken
        } else {
            Self::from_status(status)
        }
    }

    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ApiErrorCode::Unauthorized,
            404 => ApiErrorCode::NotFound,
            409 => ApiErrorCode::Conflict,
            400 | 422 => ApiErrorCode::Validation,
            _ => ApiErrorCode::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for ApiErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        Ok(Self::parse(&code))
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-2xx response, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub code: ApiErrorCode,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} ({}): {}", self.status, self.code, self.message)
    }
}

/// Error body shapes the backend sends.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<ApiErrorCode>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiError {
    /// Decode an error response body.
    ///
    /// A JSON body's `code` wins; without one the message is classified.
    /// Non-JSON bodies are used verbatim as the message.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body).trim().to_string();
        let parsed = serde_json::from_slice::<ErrorBody>(body).ok();

        let message = parsed
            .as_ref()
            .and_then(|b| b.message.clone().or_else(|| b.error.clone()))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if text.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    text.clone()
                }
            });

        let code = parsed
            .and_then(|b| b.code)
            .unwrap_or_else(|| ApiErrorCode::classify(status, &message));

        Self {
            status,
            code,
            message,
        }
    }
}
