//! Core types for playback sessions

use melody_core::Track;
use serde::{Deserialize, Serialize};

/// Playback state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing is being rendered
    #[default]
    Idle,

    /// The track at the cursor is being rendered
    Playing,

    /// The track at the cursor is paused mid-track
    Paused,
}

impl PlaybackState {
    /// Whether a backend `play` call is outstanding
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

/// Why the backend reported a track as finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionReason {
    /// Track played to its end
    NaturalEnd,

    /// Track was stopped or superseded before its end
    Stopped,
}

/// Result of a "play" request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Session was idle; the resolved track is now playing
    NowPlaying(Track),

    /// Something was already playing; the resolved track was appended
    Queued(Track),

    /// Session was paused; playback resumed without resolving anything
    Resumed,
}

/// Configuration for playback sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum rendered title width in queue listings (default: 40)
    pub max_title_length: usize,

    /// Initial loop-track flag (default: false)
    pub loop_track: bool,

    /// Initial loop-queue flag (default: false)
    pub loop_queue: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_title_length: 40,
            loop_track: false,
            loop_queue: false,
        }
    }
}

/// Point-in-time copy of a session's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Queue contents in play order
    pub tracks: Vec<Track>,

    /// Cursor index; equals `tracks.len()` once the queue has been played through
    pub cursor: usize,

    /// Current playback state
    pub state: PlaybackState,

    /// Loop-track flag
    pub loop_track: bool,

    /// Loop-queue flag
    pub loop_queue: bool,

    /// Fencing counter for completion callbacks
    pub generation: u64,
}

impl SessionSnapshot {
    /// Track under the cursor, if any
    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.cursor)
    }
}
