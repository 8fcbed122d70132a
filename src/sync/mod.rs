//! Cache-status synchronization.
//!
//! The backend converts and caches library media in the background and
//! reports its progress on `/cache/status`. [`CacheStatusSync`] polls that
//! endpoint on a fixed interval and keeps the latest snapshot around for the
//! upcoming-clips preview. Nothing in playback ever waits on it.

mod poller;
mod preview;

pub use poller::{CacheStatusSync, DEFAULT_POLL_INTERVAL};
pub use preview::{annotate_upcoming, UpcomingEntry};

use async_trait::async_trait;
use cliploop_common::CacheStatus;

use crate::backend::HttpBackend;

/// Anything that can report the backend's cache status.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    async fn fetch_status(&self) -> anyhow::Result<CacheStatus>;
}

#[async_trait]
impl StatusSource for HttpBackend {
    async fn fetch_status(&self) -> anyhow::Result<CacheStatus> {
        self.cache_status().await
    }
}
