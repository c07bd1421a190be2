//! Melody - Playback Sessions
//!
//! Per-guild playback control for Melody.
//!
//! This crate provides:
//! - Ordered track queue with a play cursor (finished tracks stay listed)
//! - Play / pause / resume / skip / jump / stop / clear
//! - Whole-queue shuffle that restarts from the new first track
//! - Loop-track and loop-queue flags
//! - Generation-fenced completion handling for backends that call back
//!   from their own thread
//! - A registry mapping guilds to sessions
//! - Queue listing helpers
//!
//! # Architecture
//!
//! `melody-playback` knows nothing about chat platforms or audio decoding.
//! The two collaborators are supplied via traits:
//! - [`Resolver`](melody_core::Resolver): query text to [`Track`](melody_core::Track)
//! - [`PlaybackBackend`]: renders one track at a time and reports completion
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use melody_core::{GuildId, Resolver, ResolveError, Track};
//! use melody_playback::{
//!     BackendError, CompletionHandler, PlaybackBackend, PlayOutcome, SessionConfig,
//!     SessionRegistry,
//! };
//! use std::sync::Arc;
//!
//! struct Jukebox;
//!
//! impl Resolver for Jukebox {
//!     fn resolve(&self, query: &str, requester: &str) -> Result<Track, ResolveError> {
//!         Ok(Track::new(format!("file://{query}.ogg"), query, "https://example.com", 200)
//!             .with_requester(requester))
//!     }
//! }
//!
//! // A backend that never finishes anything
//! struct Silence;
//!
//! impl PlaybackBackend for Silence {
//!     fn play(&self, _source: &str, _done: CompletionHandler) -> Result<(), BackendError> {
//!         Ok(())
//!     }
//!     fn pause(&self) {}
//!     fn resume(&self) {}
//!     fn stop(&self) {}
//!     fn is_playing(&self) -> bool { true }
//!     fn is_paused(&self) -> bool { false }
//! }
//!
//! let factory = |_guild: GuildId| -> Result<Arc<dyn PlaybackBackend>, BackendError> {
//!     Ok(Arc::new(Silence))
//! };
//! let registry = SessionRegistry::new(Arc::new(Jukebox), Arc::new(factory), SessionConfig::default());
//!
//! let guild = GuildId::new(1);
//! let outcome = registry.play(guild, "intro", "alice").unwrap();
//! assert!(matches!(outcome, PlayOutcome::NowPlaying(_)));
//!
//! let outcome = registry.play(guild, "outro", "bob").unwrap();
//! assert!(matches!(outcome, PlayOutcome::Queued(_)));
//!
//! let session = registry.session(guild).unwrap();
//! session.toggle_loop_queue();
//! println!("{}", session.format_queue());
//! ```

mod backend;
mod error;
mod events;
pub mod format;
mod queue;
mod registry;
mod session;
mod shuffle;
pub mod types;

// Public exports
pub use backend::{BackendFactory, CompletionHandler, PlaybackBackend};
pub use error::{BackendError, Result, SessionError};
pub use events::{event_channel, EventReceiver, EventSender, SessionEvent};
pub use queue::TrackQueue;
pub use registry::SessionRegistry;
pub use session::PlaybackSession;
pub use shuffle::{shuffle_tracks, shuffle_tracks_with};
pub use types::{CompletionReason, PlayOutcome, PlaybackState, SessionConfig, SessionSnapshot};
