//! Shared test harness for integration tests.
//!
//! Provides [`MockBackend`], a wiremock server standing in for the clip
//! backend, plus helpers to point an [`HttpBackend`] at it.

#![allow(dead_code)]

use std::time::Duration;

use cliploop::backend::HttpBackend;
use cliploop::config::BackendConfig;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub struct MockBackend {
    pub server: MockServer,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn config(&self) -> BackendConfig {
        BackendConfig {
            url: self.server.uri(),
            request_timeout_secs: 5,
        }
    }

    pub fn client(&self) -> HttpBackend {
        HttpBackend::new(&self.config())
    }

    /// Answer every `/video/...` warm-up with a partial response.
    pub async fn accept_warmups(&self) {
        Mock::given(method("GET"))
            .and(path_regex("^/video/"))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(vec![0u8; 16]))
            .mount(&self.server)
            .await;
    }

    /// Accept both session notifications.
    pub async fn accept_sessions(&self) {
        for endpoint in ["/session/start", "/session/end"] {
            Mock::given(method("POST"))
                .and(path(endpoint))
                .respond_with(ResponseTemplate::new(204))
                .mount(&self.server)
                .await;
        }
    }

    /// Every request received so far with the given path.
    pub async fn requests_to(&self, request_path: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == request_path)
            .collect()
    }

    /// Wait until at least `count` requests hit `request_path`.
    pub async fn wait_for(&self, request_path: &str, count: usize) -> Vec<Request> {
        for _ in 0..200 {
            let requests = self.requests_to(request_path).await;
            if requests.len() >= count {
                return requests;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {count} requests to {request_path}");
    }
}

/// A `/random` clip body.
pub fn clip_body(file: &str, start: f64, length: f64) -> Value {
    json!({ "file": file, "start": start, "length": length })
}

/// Value of a query parameter on a recorded request.
pub fn query(request: &Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
