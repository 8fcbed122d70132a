//! Playback session bracketing.
//!
//! A session tells the backend that someone is watching so it can keep its
//! cache warm, and owns the cache-status poller for as long as playback
//! runs. Both notifications are best effort: a backend that ignores or
//! rejects them never affects playback.

use cliploop_common::{CacheStatus, SessionId};
use tracing::{debug, info};

use crate::backend::HttpBackend;
use crate::sync::CacheStatusSync;

pub struct PlaybackSession {
    id: SessionId,
    backend: HttpBackend,
    sync: Option<CacheStatusSync>,
    ended: bool,
}

impl PlaybackSession {
    /// Announce a new session and start status polling.
    ///
    /// Must be called from within a tokio runtime.
    pub fn begin(backend: HttpBackend, sync: Option<CacheStatusSync>) -> Self {
        let id = SessionId::new();
        info!(session = %id, backend = backend.base_url(), "Starting playback session");

        let client = backend.clone();
        tokio::spawn(async move {
            if let Err(e) = client.start_session(id).await {
                debug!(session = %id, error = %e, "Session start notification failed");
            }
        });

        if let Some(sync) = &sync {
            sync.start();
        }

        Self {
            id,
            backend,
            sync,
            ended: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Latest cache status, if polling is enabled and has succeeded once.
    pub fn status(&self) -> Option<CacheStatus> {
        self.sync.as_ref().and_then(|s| s.snapshot())
    }

    pub fn sync(&self) -> Option<&CacheStatusSync> {
        self.sync.as_ref()
    }

    /// Stop polling and tell the backend the session is over.
    pub async fn end(mut self) {
        self.ended = true;
        if let Some(sync) = &self.sync {
            sync.stop();
        }
        if let Err(e) = self.backend.end_session(self.id).await {
            debug!(session = %self.id, error = %e, "Session end notification failed");
        }
        info!(session = %self.id, "Playback session ended");
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        if self.ended {
            return;
        }
        if let Some(sync) = &self.sync {
            sync.stop();
        }

        // Without a runtime there is nobody left to send the notification.
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let id = self.id;
        let backend = self.backend.clone();
        runtime.spawn(async move {
            if let Err(e) = backend.end_session(id).await {
                debug!(session = %id, error = %e, "Session end notification failed");
            }
        });
    }
}
