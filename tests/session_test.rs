//! Integration tests for session bracketing and cache-status polling.

mod common;

use std::sync::Arc;
use std::time::Duration;

use cliploop::session::PlaybackSession;
use cliploop::sync::CacheStatusSync;
use common::MockBackend;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn serve_status(backend: &MockBackend) {
    Mock::given(method("GET"))
        .and(path("/cache/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2, "cached": 1, "caching": "b.mp4", "videos": ["a.mp4", "b.mp4"]
        })))
        .mount(&backend.server)
        .await;
}

#[tokio::test]
async fn session_start_and_end() {
    let backend = MockBackend::start().await;
    backend.accept_sessions().await;
    serve_status(&backend).await;

    let client = backend.client();
    let sync = CacheStatusSync::new(Arc::new(client.clone()), Duration::from_millis(100));
    let session = PlaybackSession::begin(client, Some(sync.clone()));
    let id = session.id().to_string();

    let started = backend.wait_for("/session/start", 1).await;
    let body: serde_json::Value = serde_json::from_slice(&started[0].body).unwrap();
    assert_eq!(body["id"], id);

    backend.wait_for("/cache/status", 1).await;
    for _ in 0..100 {
        if session.status().is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let status = session.status().unwrap();
    assert_eq!(status.cached, 1);
    assert!(sync.is_running());

    session.end().await;
    assert!(!sync.is_running());

    let ended = backend.requests_to("/session/end").await;
    assert_eq!(ended.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&ended[0].body).unwrap();
    assert_eq!(body["id"], id);
}

#[tokio::test]
async fn dropped_session_still_ends() {
    let backend = MockBackend::start().await;
    backend.accept_sessions().await;

    let session = PlaybackSession::begin(backend.client(), None);
    assert!(session.status().is_none());
    drop(session);

    backend.wait_for("/session/end", 1).await;
}

#[tokio::test]
async fn session_survives_backend_without_session_support() {
    let backend = MockBackend::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&backend.server)
        .await;

    let session = PlaybackSession::begin(backend.client(), None);
    backend.wait_for("/session/start", 1).await;
    session.end().await;
    assert_eq!(backend.requests_to("/session/end").await.len(), 1);
}

#[tokio::test]
async fn status_poll_failure_keeps_last_snapshot() {
    let backend = MockBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/cache/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3, "cached": 3, "caching": null, "videos": ["a.mp4", "b.mp4", "c.mp4"]
        })))
        .up_to_n_times(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cache/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend.server)
        .await;

    let sync = CacheStatusSync::new(Arc::new(backend.client()), Duration::from_millis(100));
    assert!(sync.refresh().await);
    assert!(!sync.refresh().await);

    let status = sync.snapshot().unwrap();
    assert_eq!(status.total, 3);
    assert_eq!(status.progress(), 1.0);
}
