//! The playback surface: whatever actually renders the media.
//!
//! The controller tells the surface what to show and reads back the current
//! media position when it needs the remaining time of a clip. It never owns
//! the position itself.

use cliploop_common::ClipDescriptor;
use tokio::time::Instant;

pub trait PlaybackSurface: Send + 'static {
    /// Load `clip` and start playing at its start offset. `controls` asks
    /// for native scrubbing controls (whole-file playback).
    fn present(&mut self, clip: &ClipDescriptor, controls: bool);

    /// Current media position in seconds.
    fn position(&self) -> f64;

    fn pause(&mut self);

    fn resume(&mut self);
}

/// Headless surface that logs what would be shown and estimates the media
/// position from a monotonic clock.
#[derive(Debug, Default)]
pub struct LogSurface {
    current: Option<ClipDescriptor>,
    anchor_position: f64,
    playing_since: Option<Instant>,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ClipDescriptor> {
        self.current.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.current.is_some() && self.playing_since.is_none()
    }
}

impl PlaybackSurface for LogSurface {
    fn present(&mut self, clip: &ClipDescriptor, controls: bool) {
        tracing::info!(
            file = %clip.file,
            start = clip.start,
            length = %clip.length,
            controls,
            "Now playing"
        );
        self.current = Some(clip.clone());
        self.anchor_position = clip.start;
        self.playing_since = Some(Instant::now());
    }

    fn position(&self) -> f64 {
        let elapsed = self
            .playing_since
            .map(|since| since.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        self.anchor_position + elapsed
    }

    fn pause(&mut self) {
        self.anchor_position = self.position();
        self.playing_since = None;
        tracing::info!(position = self.anchor_position, "Paused");
    }

    fn resume(&mut self) {
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
            tracing::info!(position = self.anchor_position, "Resumed");
        }
    }
}
