//! Melody Core
//!
//! Domain types and collaborator traits shared by the Melody playback
//! libraries and applications.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `GuildId`
//! - **Core Traits**: `Resolver` (free-text query to playable track)
//! - **Error Handling**: `ResolveError` and its `Result` alias
//!
//! # Example
//!
//! ```rust
//! use melody_core::{GuildId, Resolver, ResolveError, Track};
//!
//! struct Jukebox;
//!
//! impl Resolver for Jukebox {
//!     fn resolve(&self, query: &str, requester: &str) -> Result<Track, ResolveError> {
//!         if query.is_empty() {
//!             return Err(ResolveError::not_found(query));
//!         }
//!         Ok(Track::new("stream://1", query, "https://example.com/1", 180).with_requester(requester))
//!     }
//! }
//!
//! let track = Jukebox.resolve("lofi beats", "alice").unwrap();
//! assert_eq!(track.requester, "alice");
//! assert_eq!(GuildId::new(7).get(), 7);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ResolveError, Result};
pub use traits::Resolver;
pub use types::{GuildId, Track};
