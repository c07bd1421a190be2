//! Session Events
//!
//! Out-of-band notifications for the front end. Sessions emit them whenever
//! something happens that no command reply covers, most importantly when a
//! completion callback advances to the next track on its own:
//! - A track started (command-driven or auto-advance)
//! - The queue ran out
//! - The backend refused to start a track

use melody_core::{GuildId, Track};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted by playback sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A track started playing
    NowPlaying {
        /// Session the track plays in
        guild: GuildId,
        /// The track now under the cursor
        track: Track,
        /// 0-based queue position
        position: usize,
    },

    /// Last track finished and loop-queue is off
    QueueFinished {
        /// Session that went idle
        guild: GuildId,
    },

    /// Backend failed to start a track; the session is idle
    PlaybackFailed {
        /// Session that failed
        guild: GuildId,
        /// Error message
        message: String,
    },
}

impl SessionEvent {
    /// Guild the event belongs to
    pub fn guild(&self) -> GuildId {
        match self {
            Self::NowPlaying { guild, .. }
            | Self::QueueFinished { guild }
            | Self::PlaybackFailed { guild, .. } => *guild,
        }
    }
}

/// Sending half handed to sessions; unbounded so emitting never blocks
pub type EventSender = mpsc::UnboundedSender<SessionEvent>;

/// Receiving half kept by the front end
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Create an event channel
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
