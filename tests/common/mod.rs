//! In-memory transport shared by the integration tests.
#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use anaplan_client::{
    http_utils::RequestBody, AnaplanClient, ApiError, ApiRequest, ApiResponse, AuthToken,
    Connection, Transport,
};
use async_trait::async_trait;
use reqwest::Method;

pub const BASE_URL: &str = "https://api.test/2/0";
pub const WORKSPACE_ID: &str = "8a81b09d5e8c6f27015ece3402487d33";
pub const MODEL_ID: &str = "75A40874E6B64FA3AE0B6CC1A3D7F3B5";

pub fn model_url(path: &str) -> String {
    format!(
        "{}/workspaces/{}/models/{}{}",
        BASE_URL, WORKSPACE_ID, MODEL_ID, path
    )
}

pub fn connection() -> Connection {
    Connection::new(AuthToken::new("test-token"), WORKSPACE_ID, MODEL_ID)
}

struct Route {
    method: Method,
    suffix: String,
    replies: VecDeque<ApiResponse>,
}

#[derive(Default)]
struct MockState {
    routes: Vec<Route>,
    requests: Vec<ApiRequest>,
}

/// Records every request and answers from canned responses.
///
/// Responses are matched by method and URL suffix, in registration order.
/// Queued responses for a route are handed out in turn; the last one repeats.
/// Unmatched requests get a 404.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: Method, suffix: &str, status: u16, body: impl Into<Vec<u8>>) -> &Self {
        let response = ApiResponse::new(status, body);
        let mut state = self.state.lock().unwrap();
        match state
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.suffix == suffix)
        {
            Some(route) => route.replies.push_back(response),
            None => state.routes.push(Route {
                method,
                suffix: suffix.to_string(),
                replies: VecDeque::from([response]),
            }),
        }
        self
    }

    pub fn on_json(&self, method: Method, suffix: &str, status: u16, body: serde_json::Value) -> &Self {
        self.on(method, suffix, status, body.to_string())
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// `METHOD url` of every request, in order
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url))
            .collect()
    }

    pub fn count(&self, method: Method, suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(suffix))
            .count()
    }

    pub fn client(&self) -> AnaplanClient<MockTransport> {
        AnaplanClient::new(self.clone(), BASE_URL)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        let route = state
            .routes
            .iter_mut()
            .find(|r| r.method == request.method && request.url.ends_with(&r.suffix));
        let response = match route {
            Some(route) if route.replies.len() > 1 => route.replies.pop_front(),
            Some(route) => route.replies.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| ApiResponse::new(404, "no route")))
    }
}

pub fn json_body(request: &ApiRequest) -> serde_json::Value {
    match &request.body {
        RequestBody::Json(value) => value.clone(),
        other => panic!("expected a JSON body, got {:?}", other),
    }
}

pub fn bytes_body(request: &ApiRequest) -> Vec<u8> {
    match &request.body {
        RequestBody::Bytes(bytes) => bytes.clone(),
        other => panic!("expected a byte body, got {:?}", other),
    }
}
