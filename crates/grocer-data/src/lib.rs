//! REST client for the grocer marketplace backend.
//!
//! [`FetchClient`] builds requests and hands them to a [`Transport`]; the
//! default transport is `reqwest`. [`ApiClient`] layers typed, per-resource
//! wrappers on top.
//!
//! # Example
//!
//! ```rust,ignore
//! use grocer_data::{ApiClient, FetchClient};
//! use grocer_commerce::search::ListQuery;
//! use std::time::Duration;
//!
//! let api = ApiClient::new(FetchClient::http("https://api.example.com", Duration::from_secs(10))?);
//! let page = api.products().list(&ListQuery::new().with_search("riz")).await?;
//! for product in page.items {
//!     println!("{} {}", product.name, product.price);
//! }
//! ```

mod client;
mod error;
mod request;
mod response;

pub mod api;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use api::{ApiClient, UploadedFile};
pub use client::{ClientRequestBuilder, FetchClient, ReqwestTransport, Transport};
pub use error::{ApiError, ApiErrorCode, FetchError};
pub use request::{Body, FilePart, Method, Request, RequestBuilder};
pub use response::Response;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::api::ApiClient;
    pub use crate::client::{FetchClient, Transport};
    pub use crate::error::{ApiErrorCode, FetchError};
    pub use crate::request::Method;
}
