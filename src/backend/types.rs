use cliploop_common::{ClipDescriptor, ClipLength, SessionId};
use serde::{Deserialize, Serialize};

use super::ClipError;

/// Body of `GET /random`: either a clip or an `error` message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RandomResponse {
    pub file: Option<String>,
    pub start: Option<f64>,
    pub length: Option<f64>,
    /// Real duration of the file, sent by newer backends.
    pub dur: Option<f64>,
    pub error: Option<String>,
}

impl RandomResponse {
    /// Normalize into a descriptor, downgrading anything unusable to an error.
    pub fn into_clip(self) -> Result<ClipDescriptor, ClipError> {
        if let Some(error) = self.error {
            return Err(ClipError::no_media(error));
        }

        let file = self
            .file
            .ok_or_else(|| ClipError::Malformed("missing 'file'".into()))?;
        let start = self
            .start
            .ok_or_else(|| ClipError::Malformed("missing 'start'".into()))?;
        let length = self
            .length
            .ok_or_else(|| ClipError::Malformed("missing 'length'".into()))?;

        ClipDescriptor::new(file, start, ClipLength::Seconds(length))
            .map(|clip| clip.with_media_duration(self.dur))
            .map_err(|e| ClipError::Malformed(e.to_string()))
    }
}

/// Body of `POST /session/start` and `POST /session/end`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest {
    pub id: SessionId,
}
