//! Client side of the clip backend.
//!
//! The controller only depends on the [`ClipSource`] trait: "give me a clip
//! for this scope" plus a best-effort media warm-up. [`HttpBackend`] is the
//! production implementation and also carries the endpoints the controller
//! does not need directly (`/tree`, `/cache/status`, session bracketing).
//!
//! # Failure model
//!
//! Every way a fetch can fail is a [`ClipError`], and callers treat all of
//! them the same way: do not advance, do not crash, show a diagnostic. There
//! are no retries at this layer; the next user or timer driven advance simply
//! asks again.

mod client;
mod types;

pub use client::HttpBackend;
pub use types::{RandomResponse, SessionRequest};

use async_trait::async_trait;
use cliploop_common::{ClipDescriptor, Scope};

/// What to ask the backend for.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRequest {
    pub scope: Scope,
    /// Desired clip length in seconds; `None` lets the backend choose.
    pub duration: Option<u32>,
    /// Look-ahead pick that must not be reported as "now playing".
    pub preview: bool,
}

impl ClipRequest {
    pub fn new(scope: Scope, duration: Option<u32>) -> Self {
        Self {
            scope,
            duration,
            preview: false,
        }
    }

    pub fn preview(mut self) -> Self {
        self.preview = true;
        self
    }
}

/// Why no clip could be produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClipError {
    /// The backend has nothing to offer for the requested scope.
    #[error("no clips available: {reason}")]
    NoMedia { reason: String },

    /// The request never produced a usable HTTP response.
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// The backend answered with something that is not a clip.
    #[error("malformed clip response: {0}")]
    Malformed(String),
}

impl ClipError {
    pub fn no_media(reason: impl Into<String>) -> Self {
        Self::NoMedia {
            reason: reason.into(),
        }
    }

    /// True when the backend explicitly reported an empty scope.
    pub fn is_no_media(&self) -> bool {
        matches!(self, Self::NoMedia { .. })
    }
}

/// Source of clips for the playback controller.
#[async_trait]
pub trait ClipSource: Send + Sync + 'static {
    /// Pick one clip matching `request`.
    async fn fetch_clip(&self, request: &ClipRequest) -> Result<ClipDescriptor, ClipError>;

    /// Ask for the media behind `file` so a later load starts warm.
    async fn warm(&self, file: &str) -> Result<(), ClipError>;
}
