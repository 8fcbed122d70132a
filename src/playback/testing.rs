//! Test doubles for the playback controller.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cliploop_common::{ClipDescriptor, ClipLength, Scope};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::backend::{ClipError, ClipRequest, ClipSource};

use super::{PlaybackController, PlaybackSurface};

/// Clip source that answers from a script, then generates clips named after
/// the requested scope: `clipN.mp4` at the root, `<folder>/clipN.mp4` in a
/// folder, and the file itself starting at `N` seconds in a file scope.
#[derive(Default)]
pub struct StubSource {
    scripted: Mutex<VecDeque<Result<ClipDescriptor, ClipError>>>,
    empty: HashSet<String>,
    limit: Option<usize>,
    length: Option<f64>,
    preview_gate: Option<Arc<Semaphore>>,
    served: Mutex<usize>,
    requests: Mutex<Vec<ClipRequest>>,
    warmed: Mutex<Vec<String>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next fetches with these results before generating clips.
    pub fn script(self, results: impl IntoIterator<Item = Result<ClipDescriptor, ClipError>>) -> Self {
        self.scripted.lock().extend(results);
        self
    }

    /// Report `no videos` for this folder or file.
    pub fn empty_target(mut self, target: &str) -> Self {
        self.empty.insert(target.to_string());
        self
    }

    /// Stop producing clips after this many successful fetches.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Length of generated clips in seconds (default 10).
    pub fn clip_length(mut self, secs: f64) -> Self {
        self.length = Some(secs);
        self
    }

    /// Look-ahead fetches each wait for a permit from `gate`.
    pub fn preview_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.preview_gate = Some(gate);
        self
    }

    pub fn requests(&self) -> Vec<ClipRequest> {
        self.requests.lock().clone()
    }

    pub fn warmed(&self) -> Vec<String> {
        self.warmed.lock().clone()
    }

    fn generate(&self, scope: &Scope) -> Result<ClipDescriptor, ClipError> {
        if let Some(target) = scope.target() {
            if self.empty.contains(target) {
                return Err(ClipError::no_media("no videos"));
            }
        }

        let mut served = self.served.lock();
        if self.limit.is_some_and(|limit| *served >= limit) {
            return Err(ClipError::no_media("no videos"));
        }
        *served += 1;
        let n = *served;

        let length = ClipLength::Seconds(self.length.unwrap_or(10.0));
        let clip = match scope {
            Scope::Root => ClipDescriptor::new(format!("clip{n}.mp4"), 0.0, length),
            Scope::Folder(folder) => ClipDescriptor::new(format!("{folder}/clip{n}.mp4"), 0.0, length),
            Scope::File(file) => ClipDescriptor::new(file.clone(), n as f64, length),
        };
        clip.map(|c| c.with_media_duration(Some(600.0)))
            .map_err(|e| ClipError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ClipSource for StubSource {
    async fn fetch_clip(&self, request: &ClipRequest) -> Result<ClipDescriptor, ClipError> {
        if request.preview {
            if let Some(gate) = &self.preview_gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
        }

        self.requests.lock().push(request.clone());

        let scripted = self.scripted.lock().pop_front();
        match scripted {
            Some(result) => result,
            None => self.generate(&request.scope),
        }
    }

    async fn warm(&self, file: &str) -> Result<(), ClipError> {
        self.warmed.lock().push(file.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SurfaceState {
    pub presented: Vec<(ClipDescriptor, bool)>,
    pub position: f64,
    pub paused: bool,
}

/// Surface that records what it was asked to show. Clones share state so a
/// test can keep a handle after moving one into the controller.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presented(&self) -> Vec<(ClipDescriptor, bool)> {
        self.state.lock().presented.clone()
    }

    pub fn presented_count(&self) -> usize {
        self.state.lock().presented.len()
    }

    pub fn set_position(&self, position: f64) {
        self.state.lock().position = position;
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }
}

impl PlaybackSurface for RecordingSurface {
    fn present(&mut self, clip: &ClipDescriptor, controls: bool) {
        let mut state = self.state.lock();
        state.presented.push((clip.clone(), controls));
        state.position = clip.start;
        state.paused = false;
    }

    fn position(&self) -> f64 {
        self.state.lock().position
    }

    fn pause(&mut self) {
        self.state.lock().paused = true;
    }

    fn resume(&mut self) {
        self.state.lock().paused = false;
    }
}

pub fn clip(file: &str, start: f64, length: f64) -> ClipDescriptor {
    ClipDescriptor::new(file, start, ClipLength::Seconds(length)).unwrap()
}

/// Handle background completions until none arrives for a short while.
pub async fn settle<S: ClipSource, P: PlaybackSurface>(ctrl: &mut PlaybackController<S, P>) {
    while tokio::time::timeout(Duration::from_millis(10), ctrl.next_event())
        .await
        .is_ok()
    {}
}
