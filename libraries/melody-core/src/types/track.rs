/// Track domain type
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A playable piece of media plus its display metadata
///
/// Immutable once built by a resolver. Two tracks with identical fields are
/// still distinct queue entries; a track carries no identity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Opaque handle the playback backend renders (stream URL, file path)
    pub source: String,

    /// Display title, kept at full length; trimmed only when rendered
    pub title: String,

    /// Stable permalink for the track
    pub canonical_url: String,

    /// Display name of the user who queued the track
    #[serde(default)]
    pub requester: String,

    /// Track length in seconds, 0 if unknown
    #[serde(default)]
    pub duration_secs: u64,
}

impl Track {
    /// Create a new track with no requester
    pub fn new(
        source: impl Into<String>,
        title: impl Into<String>,
        canonical_url: impl Into<String>,
        duration_secs: u64,
    ) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            canonical_url: canonical_url.into(),
            requester: String::new(),
            duration_secs,
        }
    }

    /// Attach the requesting user's display name
    #[must_use]
    pub fn with_requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = requester.into();
        self
    }

    /// Get the track duration as a Duration
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Whether the duration is known
    pub fn has_duration(&self) -> bool {
        self.duration_secs > 0
    }
}
