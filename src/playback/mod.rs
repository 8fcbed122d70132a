//! Continuous clip playback.
//!
//! The [`PlaybackController`] decides what plays next. It looks in a bounded
//! prefetch queue first and falls back to a direct fetch from the
//! [`ClipSource`](crate::backend::ClipSource). It also keeps a browsable
//! history and arms a cancellable timer that advances when a clip's length
//! has elapsed.
//!
//! # Modes
//!
//! | Mode          | Next clip comes from            | Auto-advance |
//! |---------------|---------------------------------|--------------|
//! | `FolderLoop`  | random clips under the scope    | yes          |
//! | `FileLoop`    | random sub-clips of one file    | yes          |
//! | `ClipHold`    | the held clip again             | no           |
//! | `FullFile`    | nothing; plays to the end       | no           |

mod controller;
mod events;
mod history;
mod mode;
mod queue;
mod surface;
mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{
    AdvanceOutcome, Command, ControllerHandle, ControllerOptions, ControllerSnapshot,
    PlaybackController,
};
pub use events::ControllerEvent;
pub use history::{History, MAX_HISTORY_LEN};
pub use mode::Mode;
pub use queue::{PrefetchQueue, DEFAULT_CAPACITY};
pub use surface::{LogSurface, PlaybackSurface};
pub use timer::{AdvanceTimer, Ticket};

use thiserror::Error;

/// Why a playback command was refused.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("no clip is playing")]
    NoCurrentClip,

    #[error("cannot {action} in {mode} mode")]
    InvalidTransition {
        action: &'static str,
        mode: &'static str,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("playback controller has stopped")]
    Closed,
}

impl ControlError {
    pub fn invalid_transition(action: &'static str, mode: &Mode) -> Self {
        Self::InvalidTransition {
            action,
            mode: mode.name(),
        }
    }
}
