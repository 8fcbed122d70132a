//! Notifications emitted by the controller for UIs and logs.

use cliploop_common::{ClipDescriptor, Scope};
use serde::Serialize;

use super::mode::Mode;

/// Something the playback controller did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    /// A new clip is on screen.
    ClipStarted {
        clip: ClipDescriptor,
        history_index: Option<usize>,
    },
    /// The held clip was restarted.
    ClipReplayed { clip: ClipDescriptor },
    ModeChanged { mode: Mode, scope: Scope },
    QueueChanged { len: usize },
    /// No clip could be fetched; the previous one stays on screen.
    Unavailable { scope: Scope, reason: String },
}
