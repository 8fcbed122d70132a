use cliploop_common::CacheStatus;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::StatusSource;

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Periodically refreshed snapshot of the backend's cache status.
///
/// Cloning is cheap; clones share the snapshot and the polling task. The
/// task stops on [`stop`](Self::stop) or when the last clone is dropped.
#[derive(Clone)]
pub struct CacheStatusSync {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn StatusSource>,
    interval: Duration,
    snapshot: Arc<RwLock<Option<CacheStatus>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CacheStatusSync {
    pub fn new(source: Arc<dyn StatusSource>, interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                interval,
                snapshot: Arc::new(RwLock::new(None)),
                task: Mutex::new(None),
            }),
        }
    }

    /// Start polling. Returns `false` if polling was already running.
    pub fn start(&self) -> bool {
        let mut task = self.inner.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }

        let source = self.inner.source.clone();
        let snapshot = self.inner.snapshot.clone();
        let period = self.inner.interval;

        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                poll(source.as_ref(), &snapshot).await;
            }
        }));

        tracing::debug!(interval_ms = period.as_millis() as u64, "Cache status polling started");
        true
    }

    pub fn stop(&self) {
        if let Some(task) = self.inner.task.lock().take() {
            task.abort();
            tracing::debug!("Cache status polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .task
            .lock()
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// Poll once right now, outside the interval.
    pub async fn refresh(&self) -> bool {
        poll(self.inner.source.as_ref(), &self.inner.snapshot).await
    }

    /// Latest successfully fetched status.
    pub fn snapshot(&self) -> Option<CacheStatus> {
        self.inner.snapshot.read().clone()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

/// Fetch and replace the snapshot wholesale. Failures keep the old snapshot.
async fn poll(source: &dyn StatusSource, snapshot: &RwLock<Option<CacheStatus>>) -> bool {
    match source.fetch_status().await {
        Ok(status) => {
            tracing::trace!(
                total = status.total,
                cached = status.cached,
                caching = ?status.caching,
                "Cache status updated"
            );
            *snapshot.write() = Some(status);
            true
        }
        Err(e) => {
            tracing::debug!(error = %e, "Cache status poll failed; keeping previous snapshot");
            false
        }
    }
}
