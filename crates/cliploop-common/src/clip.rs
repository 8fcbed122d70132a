//! Clip descriptors.
//!
//! A [`ClipDescriptor`] names a sub-range `[start, start + length)` of one
//! media file, or the whole file when its length is [`ClipLength::Unbounded`].
//! Descriptors are plain values: the prefetch queue, the history and the
//! current-clip slot each hold their own copy.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{Error, Result};

/// Intended playback duration of a clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipLength {
    /// Play for this many seconds, then auto-advance.
    Seconds(f64),
    /// Play the whole file; never auto-advance.
    Unbounded,
}

impl ClipLength {
    /// Number of seconds for a finite length.
    pub fn seconds(&self) -> Option<f64> {
        match self {
            Self::Seconds(secs) => Some(*secs),
            Self::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

// On the wire a finite length is a number and the unbounded sentinel is null.
impl Serialize for ClipLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.seconds().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ClipLength {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match Option::<f64>::deserialize(deserializer)? {
            Some(secs) if secs.is_finite() => Self::Seconds(secs),
            _ => Self::Unbounded,
        })
    }
}

impl fmt::Display for ClipLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(secs) => write!(f, "{secs:.2}s"),
            Self::Unbounded => write!(f, "full"),
        }
    }
}

/// One playable unit: a file plus the range of it to play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDescriptor {
    /// Path of the media file relative to the library root.
    pub file: String,
    /// Offset in seconds where playback begins.
    pub start: f64,
    /// How long to play before advancing.
    pub length: ClipLength,
    /// Real duration of the file, when the backend reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_duration: Option<f64>,
}

impl ClipDescriptor {
    /// Build a validated descriptor.
    ///
    /// `start` must be finite and non-negative; a finite `length` must be
    /// strictly positive.
    pub fn new(file: impl Into<String>, start: f64, length: ClipLength) -> Result<Self> {
        let file = file.into();
        if file.is_empty() {
            return Err(Error::invalid_input("clip file is empty"));
        }
        if !start.is_finite() || start < 0.0 {
            return Err(Error::invalid_input(format!(
                "clip start must be a non-negative number, got {start}"
            )));
        }
        if let ClipLength::Seconds(secs) = length {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(Error::invalid_input(format!(
                    "clip length must be positive, got {secs}"
                )));
            }
        }

        Ok(Self {
            file,
            start,
            length,
            media_duration: None,
        })
    }

    /// The whole file from its beginning, with no end bound.
    pub fn whole_file(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            start: 0.0,
            length: ClipLength::Unbounded,
            media_duration: None,
        }
    }

    /// Attach the file's real duration.
    pub fn with_media_duration(mut self, duration: Option<f64>) -> Self {
        self.media_duration = duration.filter(|d| d.is_finite() && *d > 0.0);
        self
    }

    /// End offset in seconds, `None` for an unbounded clip.
    pub fn end(&self) -> Option<f64> {
        self.length.seconds().map(|len| self.start + len)
    }

    pub fn is_unbounded(&self) -> bool {
        self.length.is_unbounded()
    }

    /// Replace the length with `secs`, clamped so the clip never runs past
    /// the end of a file whose duration is known.
    ///
    /// Unbounded clips and clips with no room left after `start` are
    /// returned unchanged.
    pub fn fit_to(mut self, secs: f64) -> Self {
        if self.is_unbounded() || !secs.is_finite() || secs <= 0.0 {
            return self;
        }
        let secs = match self.media_duration {
            Some(duration) => secs.min(duration - self.start),
            None => secs,
        };
        if secs > 0.0 {
            self.length = ClipLength::Seconds(secs);
        }
        self
    }

    /// Seconds left until the clip's end when the media sits at `position`.
    ///
    /// Returns `None` for unbounded clips and clamps at zero once the end
    /// has been passed.
    pub fn remaining_at(&self, position: f64) -> Option<f64> {
        self.end().map(|end| (end - position).max(0.0))
    }
}

impl fmt::Display for ClipDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:.2}s +{}", self.file, self.start, self.length)
    }
}
