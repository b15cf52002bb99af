//! Storefront error types.

use grocer_auth::AuthError;
use grocer_cache::CacheError;
use grocer_commerce::CommerceError;
use grocer_data::{ApiErrorCode, FetchError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by storefront services.
#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A cart line refers to a product that could not be loaded.
    #[error("Product {0} is unavailable")]
    ProductUnavailable(String),

    /// Config file could not be read or written.
    #[error("Config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config contents are invalid.
    #[error("Invalid config: {0}")]
    Config(String),
}

impl StorefrontError {
    /// Text suitable for a toast or a CLI error line.
    pub fn user_message(&self) -> String {
        match self {
            StorefrontError::Commerce(e) => commerce_message(e),
            StorefrontError::Fetch(e) => fetch_message(e),
            StorefrontError::Auth(e) => e.user_message(),
            StorefrontError::Cache(_) => "Could not save your cart on this device".to_string(),
            StorefrontError::ProductUnavailable(_) => {
                "This product is no longer available".to_string()
            }
            StorefrontError::ConfigIo { .. } | StorefrontError::Config(_) => self.to_string(),
        }
    }

    /// Backend rejection code, when the error came from the API.
    pub fn api_code(&self) -> Option<ApiErrorCode> {
        match self {
            StorefrontError::Fetch(e) => e.code(),
            _ => None,
        }
    }
}

fn commerce_message(error: &CommerceError) -> String {
    match error {
        CommerceError::EmptySelection => "Select at least one item to order".to_string(),
        CommerceError::OrderNotEditable { .. } => {
            "This order can no longer be modified".to_string()
        }
        CommerceError::LastOrderItem(_) => "An order must keep at least one item".to_string(),
        CommerceError::OrderItemNotFound { .. } => {
            "This item is no longer part of the order".to_string()
        }
        CommerceError::Validation(errors) => errors
            .first()
            .map(|e| format!("{}: {}", e.field, e.message))
            .unwrap_or_else(|| "Please check the form".to_string()),
        other => other.to_string(),
    }
}

fn fetch_message(error: &FetchError) -> String {
    match error {
        FetchError::Api(api) => match api.code {
            ApiErrorCode::OrderNotEditable => "This order can no longer be modified".to_string(),
            ApiErrorCode::InsufficientStock => "Not enough stock for this quantity".to_string(),
            ApiErrorCode::LastItem => "An order must keep at least one item".to_string(),
            ApiErrorCode::SlugTaken => "This slug is already in use".to_string(),
            ApiErrorCode::NotFound => "Not found".to_string(),
            ApiErrorCode::Unauthorized => "Please sign in first".to_string(),
            ApiErrorCode::Validation => api.message.clone(),
            ApiErrorCode::Conflict | ApiErrorCode::Unknown => {
                "Something went wrong, please try again".to_string()
            }
        },
        FetchError::Timeout => "The server took too long to answer".to_string(),
        FetchError::RequestError(_) | FetchError::InvalidUrl(_) => {
            "Unable to reach the server, check your connection".to_string()
        }
        FetchError::ParseError(_) | FetchError::JsonError(_) => {
            "Unexpected answer from the server".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocer_data::ApiError;

    #[test]
    fn test_messages_follow_api_code() {
        let err = StorefrontError::from(FetchError::Api(ApiError::from_body(
            409,
            br#"{"code":"insufficient_stock","message":"Only 2 left"}"#,
        )));
        assert_eq!(err.user_message(), "Not enough stock for this quantity");
        assert_eq!(err.api_code(), Some(ApiErrorCode::InsufficientStock));
    }

    #[test]
    fn test_empty_selection_message() {
        let err = StorefrontError::from(CommerceError::EmptySelection);
        assert_eq!(err.user_message(), "Select at least one item to order");
    }
}
