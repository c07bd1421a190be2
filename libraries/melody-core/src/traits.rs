/// Core traits for Melody
use crate::error::Result;
use crate::types::Track;

/// Track resolution gateway
///
/// Implementers turn free text (a search phrase or a URL) into a playable
/// [`Track`]. The same resolver is shared by every session, so calls may
/// arrive concurrently from different guilds; no ordering between calls is
/// assumed.
pub trait Resolver: Send + Sync {
    /// Resolve `query` into a track queued on behalf of `requester`
    ///
    /// # Errors
    /// Returns [`ResolveError::NotFound`](crate::ResolveError::NotFound) when
    /// the query has no result. Failures are not retried by callers.
    fn resolve(&self, query: &str, requester: &str) -> Result<Track>;
}
