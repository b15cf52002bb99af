//! HTTP client and the transport seam beneath it.

use crate::request::{Body, FilePart, Method, Request, RequestBuilder};
use crate::{FetchError, Response};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Sends a fully built request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, FetchError>;
}

/// [`Transport`] over a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("grocer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder = match request.body {
            Body::Empty => builder,
            Body::Json(bytes) => builder.body(bytes),
            Body::Multipart(part) => {
                let file = reqwest::multipart::Part::bytes(part.bytes)
                    .file_name(part.file_name)
                    .mime_str(&part.content_type)?;
                builder.multipart(reqwest::multipart::Form::new().part(part.field, file))
            }
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(Response::new(status, headers, body))
    }
}

/// HTTP client for the marketplace API.
///
/// Relative paths are resolved against the base URL. A bearer token, once
/// set, is attached to every request.
#[derive(Clone)]
pub struct FetchClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    default_headers: BTreeMap<String, String>,
    bearer: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_headers: BTreeMap::new(),
            bearer: Arc::new(RwLock::new(None)),
        }
    }

    /// Client over `reqwest` with the given timeout.
    pub fn http(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(ReqwestTransport::new(timeout)?), base_url))
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set or clear the session token sent as `Authorization: Bearer`.
    pub fn set_bearer_token(&self, token: Option<String>) {
        *self.bearer.write() = token;
    }

    pub fn has_bearer_token(&self) -> bool {
        self.bearer.read().is_some()
    }

    pub fn get(&self, path: impl AsRef<str>) -> ClientRequestBuilder {
        self.request(Method::Get, path)
    }

    pub fn post(&self, path: impl AsRef<str>) -> ClientRequestBuilder {
        self.request(Method::Post, path)
    }

    pub fn put(&self, path: impl AsRef<str>) -> ClientRequestBuilder {
        self.request(Method::Put, path)
    }

    pub fn patch(&self, path: impl AsRef<str>) -> ClientRequestBuilder {
        self.request(Method::Patch, path)
    }

    pub fn delete(&self, path: impl AsRef<str>) -> ClientRequestBuilder {
        self.request(Method::Delete, path)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, path: impl AsRef<str>) -> ClientRequestBuilder {
        let path = path.as_ref();
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        };

        let mut builder = RequestBuilder::new(method, url);
        for (key, value) in &self.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }
        if let Some(token) = self.bearer.read().as_deref() {
            builder = builder.bearer_auth(token);
        }

        ClientRequestBuilder {
            builder,
            transport: Arc::clone(&self.transport),
            json_error: None,
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
    json_error: Option<FetchError>,
}

impl ClientRequestBuilder {
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    pub fn query_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.builder = self.builder.query_pairs(pairs);
        self
    }

    /// Set the request body as JSON. Encoding errors surface from `send`.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match self.builder.clone().json(value) {
            Ok(builder) => self.builder = builder,
            Err(e) => self.json_error = Some(e),
        }
        self
    }

    pub fn multipart(mut self, part: FilePart) -> Self {
        self.builder = self.builder.multipart(part);
        self
    }

    /// Send the request and return the raw response, whatever its status.
    pub async fn send(self) -> Result<Response, FetchError> {
        if let Some(e) = self.json_error {
            return Err(e);
        }
        let request = self.builder.build()?;
        let method = request.method;
        let path = request.url.path().to_string();
        debug!(%method, %path, "sending request");

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            warn!(%method, %path, status = response.status, "request rejected");
        }
        Ok(response)
    }

    /// Send and require a 2xx response.
    pub async fn send_ok(self) -> Result<Response, FetchError> {
        self.send().await?.error_for_status()
    }

    /// Send and decode a single record.
    pub async fn send_record<T: DeserializeOwned>(self) -> Result<T, FetchError> {
        self.send_ok().await?.record()
    }

    /// Send and discard the body.
    pub async fn send_empty(self) -> Result<(), FetchError> {
        self.send_ok().await.map(|_| ())
    }
}
