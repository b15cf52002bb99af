//! HTTP response handling.

use crate::{ApiError, FetchError};
use grocer_commerce::search::{Page, Pagination};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// Header names are stored lowercase.
    pub headers: BTreeMap<String, String>,
    /// The response body.
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, headers: BTreeMap<String, String>, body: Vec<u8>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// A JSON response.
    pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self::new(status, headers, value.to_string().into_bytes())
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, FetchError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| FetchError::ParseError(format!("Invalid UTF-8: {}", e)))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::ParseError(e.to_string()))
    }

    /// Parse a single record that may arrive wrapped in `{"data": ...}`.
    pub fn record<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        self.json::<Envelope<T>>().map(Envelope::into_inner)
    }

    /// Parse a list that may arrive bare or as a paged envelope.
    pub fn page<T: DeserializeOwned>(&self) -> Result<Page<T>, FetchError> {
        self.json::<ListEnvelope<T>>().map(ListEnvelope::into_page)
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Convert to a Result, returning an error for non-2xx status codes.
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::Api(ApiError::from_body(self.status, &self.body)))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Paged {
        data: Vec<T>,
        #[serde(default)]
        total: Option<i64>,
        #[serde(default)]
        page: Option<i64>,
        #[serde(default)]
        limit: Option<i64>,
    },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    fn into_page(self) -> Page<T> {
        match self {
            ListEnvelope::Paged {
                data,
                total,
                page,
                limit,
            } => {
                let count = data.len() as i64;
                let pagination = Pagination::new(
                    page.unwrap_or(1),
                    limit.unwrap_or(count.max(1)),
                    total.unwrap_or(count),
                );
                Page::new(data, pagination)
            }
            ListEnvelope::Bare(items) => Page::single(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiErrorCode;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: String,
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "text/html".to_string());
        let resp = Response::new(200, headers, Vec::new());
        assert_eq!(resp.header("content-type"), Some("text/html"));
        assert_eq!(resp.header("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(resp.header("X-Missing"), None);
    }

    #[test]
    fn test_record_envelope_or_bare() {
        let wrapped = Response::json_body(200, &json!({"data": {"id": "p1"}}));
        let bare = Response::json_body(200, &json!({"id": "p2"}));
        assert_eq!(wrapped.record::<Row>().unwrap().id, "p1");
        assert_eq!(bare.record::<Row>().unwrap().id, "p2");
    }

    #[test]
    fn test_paged_list() {
        let resp = Response::json_body(
            200,
            &json!({"data": [{"id": "a"}, {"id": "b"}], "total": 12, "page": 2, "limit": 2}),
        );
        let page = resp.page::<Row>().unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 12);
        assert_eq!(page.pagination.total_pages, 6);
        assert!(page.pagination.has_next());
    }

    #[test]
    fn test_bare_list() {
        let resp = Response::json_body(200, &json!([{"id": "a"}]));
        let page = resp.page::<Row>().unwrap();
        assert_eq!(page.items, vec![Row { id: "a".into() }]);
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[test]
    fn test_error_for_status() {
        let resp = Response::json_body(
            409,
            &json!({"code": "slug_taken", "message": "Slug already exists"}),
        );
        let err = resp.error_for_status().unwrap_err();
        assert_eq!(err.code(), Some(ApiErrorCode::SlugTaken));
        assert_eq!(err.status(), Some(409));
        assert!(Response::json_body(204, &json!(null)).error_for_status().is_ok());
    }
}
