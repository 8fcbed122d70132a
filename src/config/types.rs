use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub status: StatusConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the clip backend (e.g. `http://127.0.0.1:8080`)
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Number of clips kept ready in the look-ahead queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Fixed clip length in seconds; unset lets the backend pick one
    #[serde(default)]
    pub preferred_duration_secs: Option<u32>,

    /// Mark look-ahead fetches with `preview=1`
    #[serde(default = "default_true")]
    pub preview_prefetch: bool,

    /// Warm the media of queued clips so they start without a cold load
    #[serde(default = "default_true")]
    pub warm_prefetch: bool,
}

fn default_queue_capacity() -> usize {
    5
}

fn default_true() -> bool {
    true
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            preferred_duration_secs: None,
            preview_prefetch: true,
            warm_prefetch: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusConfig {
    /// Poll `/cache/status` while a session is running
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval() -> u64 {
    2000
}

impl StatusConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: default_poll_interval(),
        }
    }
}
