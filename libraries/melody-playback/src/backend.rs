//! Playback backend contract
//!
//! Abstracts the audio transport for one session (voice connection, local
//! output, test double). The session only ever talks to it through these
//! verbs; the network stream and decoder stay owned by the backend.

use crate::error::BackendError;
use crate::types::CompletionReason;
use melody_core::GuildId;
use std::sync::Arc;

/// Completion notification for one `play` call
///
/// Invoked exactly once, later, usually on the backend's own thread.
pub type CompletionHandler = Box<dyn FnOnce(CompletionReason) + Send + 'static>;

/// Audio renderer for a single session
///
/// All verbs are non-blocking triggers. Implementors must not call a
/// completion handler from inside `play` or `stop`; the session holds its lock
/// while issuing them.
pub trait PlaybackBackend: Send + Sync {
    /// Start rendering `source`, reporting completion through `on_complete`
    ///
    /// # Returns
    /// * `Ok(())` - Rendering started; `on_complete` will fire exactly once
    /// * `Err(_)` - Nothing started; `on_complete` is dropped without firing
    fn play(&self, source: &str, on_complete: CompletionHandler) -> Result<(), BackendError>;

    /// Pause the current track
    fn pause(&self);

    /// Resume a paused track
    fn resume(&self);

    /// Stop the current track
    ///
    /// The outstanding completion still fires, with [`CompletionReason::Stopped`]
    /// unless the track had already ended naturally.
    fn stop(&self);

    /// Whether audio is being rendered
    fn is_playing(&self) -> bool;

    /// Whether rendering is paused mid-track
    fn is_paused(&self) -> bool;
}

/// Creates one backend per session when a guild joins
pub trait BackendFactory: Send + Sync {
    /// Open a backend for `guild`
    fn create(&self, guild: GuildId) -> Result<Arc<dyn PlaybackBackend>, BackendError>;
}

impl<F> BackendFactory for F
where
    F: Fn(GuildId) -> Result<Arc<dyn PlaybackBackend>, BackendError> + Send + Sync,
{
    fn create(&self, guild: GuildId) -> Result<Arc<dyn PlaybackBackend>, BackendError> {
        self(guild)
    }
}
