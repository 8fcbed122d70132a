use cliploop_common::{CacheStatus, ClipDescriptor};
use serde::Serialize;

/// One queued clip as shown in the "up next" list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingEntry {
    pub clip: ClipDescriptor,
    /// The backend lists this file among its known videos.
    pub known: bool,
    /// The backend is caching this file right now.
    pub caching: bool,
}

/// Annotate queued clips with what the latest cache snapshot says about them.
pub fn annotate_upcoming<'a>(
    clips: impl IntoIterator<Item = &'a ClipDescriptor>,
    status: Option<&CacheStatus>,
) -> Vec<UpcomingEntry> {
    clips
        .into_iter()
        .map(|clip| UpcomingEntry {
            clip: clip.clone(),
            known: status.is_some_and(|s| s.is_known(&clip.file)),
            caching: status.is_some_and(|s| s.is_caching(&clip.file)),
        })
        .collect()
}
