//! End-to-end playback against a mock backend.
//!
//! These run on real time: the controller talks to wiremock over HTTP, so the
//! clip lengths served here are kept short.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use cliploop::backend::{ClipError, HttpBackend};
use cliploop::playback::{
    AdvanceOutcome, ControlError, ControllerEvent, ControllerHandle, ControllerOptions,
    ControllerSnapshot, LogSurface, Mode, PlaybackController,
};
use cliploop_common::Scope;
use common::{clip_body, query, MockBackend};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn spawn(backend: HttpBackend, options: ControllerOptions) -> ControllerHandle {
    let controller = PlaybackController::new(Arc::new(backend), LogSurface::new(), options);
    let (handle, _task) = controller.spawn();
    handle
}

/// Poll snapshots until `done` holds or two seconds pass.
async fn wait_until(
    handle: &ControllerHandle,
    done: impl Fn(&ControllerSnapshot) -> bool,
) -> ControllerSnapshot {
    for _ in 0..200 {
        let snapshot = handle.snapshot().await.unwrap();
        if done(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("controller never reached the expected state");
}

async fn serve_folder(backend: &MockBackend, folder: &str, length: f64) {
    Mock::given(method("GET"))
        .and(path("/random"))
        .and(query_param("target", folder))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(clip_body(&format!("{folder}/a.mp4"), 5.0, length)),
        )
        .mount(&backend.server)
        .await;
}

// ---------------------------------------------------------------------------
// Prefetch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn enter_folder_fetches_then_prefetches() {
    let backend = MockBackend::start().await;
    backend.accept_warmups().await;
    serve_folder(&backend, "films", 30.0).await;

    let handle = spawn(backend.client(), ControllerOptions::default());
    let outcome = handle.enter_folder("films").await.unwrap();
    assert_matches!(outcome, AdvanceOutcome::Presented(ref clip) if clip.file == "films/a.mp4");

    let snapshot = wait_until(&handle, |s| s.queue.len() == 5).await;
    assert_eq!(snapshot.scope, Scope::folder("films"));
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history_index, Some(0));
    assert!(snapshot.timer_armed);

    let sent = backend.requests_to("/random").await;
    assert_eq!(sent.len(), 6);
    assert_eq!(query(&sent[0], "preview"), None);
    assert!(sent[1..]
        .iter()
        .all(|r| query(r, "preview").as_deref() == Some("1")));

    // Every queued clip gets warmed.
    backend.wait_for("/video/films/a.mp4", 5).await;
}

#[tokio::test]
async fn preview_flag_can_be_disabled() {
    let backend = MockBackend::start().await;
    backend.accept_warmups().await;
    serve_folder(&backend, "films", 30.0).await;

    let options = ControllerOptions {
        queue_capacity: 2,
        preview_prefetch: false,
        warm_prefetch: false,
        ..ControllerOptions::default()
    };
    let handle = spawn(backend.client(), options);
    handle.enter_folder("films").await.unwrap();
    wait_until(&handle, |s| s.queue.len() == 2).await;

    let sent = backend.requests_to("/random").await;
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|r| query(r, "preview").is_none()));
    assert!(backend.requests_to("/video/films/a.mp4").await.is_empty());
}

#[tokio::test]
async fn preferred_duration_is_sent() {
    let backend = MockBackend::start().await;
    backend.accept_warmups().await;
    serve_folder(&backend, "films", 30.0).await;

    let options = ControllerOptions {
        preferred_duration: Some(12),
        queue_capacity: 1,
        ..ControllerOptions::default()
    };
    let handle = spawn(backend.client(), options);
    handle.enter_folder("films").await.unwrap();
    wait_until(&handle, |s| s.queue.len() == 1).await;

    handle.set_preferred_duration(None).await.unwrap();
    wait_until(&handle, |s| s.queue.len() == 1 && s.preferred_duration.is_none()).await;

    let durations: Vec<_> = backend
        .requests_to("/random")
        .await
        .iter()
        .map(|r| query(r, "duration"))
        .collect();
    assert_eq!(
        durations,
        vec![Some("12".to_string()), Some("12".to_string()), None]
    );
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_folder_keeps_current_clip() {
    let backend = MockBackend::start().await;
    backend.accept_warmups().await;
    serve_folder(&backend, "films", 30.0).await;
    Mock::given(method("GET"))
        .and(path("/random"))
        .and(query_param("target", "empty"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "no videos" })))
        .mount(&backend.server)
        .await;

    let handle = spawn(backend.client(), ControllerOptions::default());
    let mut events = handle.subscribe();
    let first = handle.enter_folder("films").await.unwrap();

    let outcome = handle.enter_folder("empty").await.unwrap();
    assert_eq!(outcome, AdvanceOutcome::Unavailable(ClipError::no_media("no videos")));

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.current.as_ref(), first.clip());
    assert_eq!(snapshot.scope, Scope::folder("empty"));
    assert_eq!(snapshot.status.as_deref(), Some("no clips available: no videos"));
    assert!(!snapshot.timer_armed);

    let mut saw_unavailable = false;
    while let Ok(event) = events.try_recv() {
        if let ControllerEvent::Unavailable { scope, reason } = event {
            assert_eq!(scope, Scope::folder("empty"));
            assert!(reason.contains("no videos"));
            saw_unavailable = true;
        }
    }
    assert!(saw_unavailable);
}

#[tokio::test]
async fn backend_down_does_not_crash() {
    let backend = MockBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/random"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&backend.server)
        .await;

    let handle = spawn(backend.client(), ControllerOptions::default());
    assert_matches!(
        handle.advance().await,
        Ok(AdvanceOutcome::Unavailable(ClipError::Transport(_)))
    );
    assert_matches!(
        handle.hold_current().await,
        Err(ControlError::NoCurrentClip)
    );

    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.current.is_none());
    assert!(snapshot.history.is_empty());
}

// ---------------------------------------------------------------------------
// Timing and modes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clips_auto_advance() {
    let backend = MockBackend::start().await;
    backend.accept_warmups().await;
    serve_folder(&backend, "short", 0.2).await;

    let handle = spawn(backend.client(), ControllerOptions::default());
    handle.enter_folder("short").await.unwrap();

    let snapshot = wait_until(&handle, |s| s.history.len() >= 3).await;
    assert_eq!(snapshot.history_index, Some(snapshot.history.len() - 1));
    assert_eq!(snapshot.mode, Mode::FolderLoop);
}

#[tokio::test]
async fn hold_and_whole_file_stop_auto_advance() {
    let backend = MockBackend::start().await;
    backend.accept_warmups().await;
    serve_folder(&backend, "short", 0.5).await;

    let handle = spawn(backend.client(), ControllerOptions::default());
    let first = handle.enter_folder("short").await.unwrap();
    let held = handle.hold_current().await.unwrap();
    assert_eq!(Some(&held), first.clip());

    tokio::time::sleep(Duration::from_millis(800)).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.history.len(), 1);
    assert!(!snapshot.timer_armed);

    let whole = handle.play_whole_file().await.unwrap();
    assert_eq!(whole.file, "short/a.mp4");
    assert!(whole.is_unbounded());
    assert_eq!(handle.advance().await.unwrap(), AdvanceOutcome::Ignored);

    tokio::time::sleep(Duration::from_millis(800)).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.current, Some(whole));
    assert_eq!(snapshot.history.len(), 2);

    assert_matches!(handle.release().await, Ok(AdvanceOutcome::Presented(_)));
    wait_until(&handle, |s| s.history.len() >= 4).await;
}

#[tokio::test]
async fn shutdown_closes_handle() {
    let backend = MockBackend::start().await;
    let controller = PlaybackController::new(
        Arc::new(backend.client()),
        LogSurface::new(),
        ControllerOptions::default(),
    );
    let (handle, task) = controller.spawn();

    handle.shutdown().await;
    task.await.unwrap();
    assert_matches!(handle.snapshot().await, Err(ControlError::Closed));
}
