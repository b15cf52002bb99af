//! In-process transport with canned responses.

use crate::request::{Method, Request};
use crate::{FetchError, Response, Transport};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

enum Reply {
    Response(Response),
    Error(FetchError),
}

#[derive(Default)]
struct MockState {
    routes: HashMap<(Method, String), VecDeque<Reply>>,
    sticky: HashMap<(Method, String), Response>,
    requests: Vec<Request>,
}

/// Records every request and answers from queued replies.
///
/// Replies are matched on method and URL path. Queued replies are used once,
/// in order; a sticky reply answers every call after the queue is drained.
/// Unmatched requests get a 404.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply for one call.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, Reply::Response(Response::json_body(status, &body)))
    }

    /// Answer every call to `path` with this reply.
    pub fn respond_always(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.state
            .lock()
            .sticky
            .insert((method, path.to_string()), Response::json_body(status, &body));
        self
    }

    /// Queue a transport failure for one call.
    pub fn fail(&self, method: Method, path: &str, error: FetchError) -> &Self {
        self.push(method, path, Reply::Error(error))
    }

    fn push(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.state
            .lock()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().requests.clone()
    }

    /// Requests seen for one method and path.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Request> {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path() == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let mut state = self.state.lock();
        let key = (request.method, request.path().to_string());
        state.requests.push(request);

        if let Some(reply) = state.routes.get_mut(&key).and_then(VecDeque::pop_front) {
            return match reply {
                Reply::Response(response) => Ok(response),
                Reply::Error(error) => Err(error),
            };
        }
        if let Some(response) = state.sticky.get(&key) {
            return Ok(response.clone());
        }
        Ok(Response::json_body(
            404,
            &json!({"code": "not_found", "message": format!("no mock for {} {}", key.0, key.1)}),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchClient;

    #[tokio::test]
    async fn test_queued_then_sticky_then_404() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/ping", 200, json!({"n": 1}))
            .respond_always(Method::Get, "/ping", 200, json!({"n": 2}));
        let client = FetchClient::new(Arc::new(mock.clone()), "http://api.test");

        let first: Value = client.get("/ping").send_record().await.unwrap();
        let second: Value = client.get("/ping").send_record().await.unwrap();
        assert_eq!((first["n"].as_i64(), second["n"].as_i64()), (Some(1), Some(2)));

        let err = client.get("/missing").send_ok().await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_bearer_token_is_attached() {
        let mock = MockTransport::new();
        let client = FetchClient::new(Arc::new(mock.clone()), "http://api.test/");
        client.set_bearer_token(Some("tok".into()));
        let _ = client.get("products").send().await.unwrap();

        let sent = mock.requests_to(Method::Get, "/products");
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].headers.get("Authorization").map(String::as_str),
            Some("Bearer tok")
        );
    }
}
