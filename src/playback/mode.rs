//! Lock states governing what "advance" means.

use cliploop_common::{ClipDescriptor, Scope};
use serde::Serialize;
use std::fmt;

/// Playback mode. Each state carries exactly the data it needs, so
/// combinations like "holding a clip while also playing a whole file" cannot
/// be expressed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Mode {
    /// Random clips from the current folder (or the whole library).
    #[default]
    FolderLoop,
    /// Random sub-clips of one file.
    FileLoop,
    /// Replay one clip on every advance.
    ClipHold { held: ClipDescriptor },
    /// One file from the start, no end bound, user-controlled.
    FullFile { file: String },
}

impl Mode {
    /// The looping mode a scope implies.
    pub fn looping(scope: &Scope) -> Self {
        if scope.is_file() {
            Self::FileLoop
        } else {
            Self::FolderLoop
        }
    }

    /// Whether advancing picks a fresh clip from the backend.
    pub fn picks_clips(&self) -> bool {
        matches!(self, Self::FolderLoop | Self::FileLoop)
    }

    /// Whether the end of a clip triggers the next one on its own.
    pub fn auto_advances(&self) -> bool {
        self.picks_clips()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FolderLoop => "folder-loop",
            Self::FileLoop => "file-loop",
            Self::ClipHold { .. } => "clip-hold",
            Self::FullFile { .. } => "full-file",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
