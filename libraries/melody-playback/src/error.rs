//! Error types for playback sessions

use crate::types::PlaybackState;
use melody_core::{GuildId, ResolveError};
use thiserror::Error;

/// Session errors
///
/// None of these are fatal; the front end decides what to tell the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The resolver returned nothing for the query
    #[error("No result for query: {query}")]
    NotFound { query: String },

    /// The resolver itself failed
    #[error("Resolver unavailable: {0}")]
    ResolverUnavailable(String),

    /// Jump position outside `[1, len]`
    #[error("Position {position} is out of range (queue has {len} tracks)")]
    OutOfRange { position: usize, len: usize },

    /// Queue is empty
    #[error("Queue is empty")]
    EmptyQueue,

    /// A session already exists for the guild
    #[error("A session is already active for guild {0}")]
    AlreadyActive(GuildId),

    /// No session exists for the guild
    #[error("No active session for guild {0}")]
    NoActiveSession(GuildId),

    /// Operation requires a different playback state
    #[error("Nothing to do while {state:?}")]
    NotInSession { state: PlaybackState },

    /// Playback backend refused to start a track
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl From<ResolveError> for SessionError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound { query } => Self::NotFound { query },
            ResolveError::Unavailable(msg) => Self::ResolverUnavailable(msg),
        }
    }
}

/// Playback backend errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The source could not be opened or decoded
    #[error("Failed to start playback of {source_ref}: {reason}")]
    Start { source_ref: String, reason: String },

    /// The backend is no longer connected (voice channel gone)
    #[error("Playback backend disconnected")]
    Disconnected,
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
