/// Core error types for Melody
use thiserror::Error;

/// Result type alias using `ResolveError`
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Failure to turn a search query into a playable track
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The query produced no result
    #[error("No result for query: {query}")]
    NotFound {
        /// The query as given
        query: String,
    },

    /// The resolution gateway could not be reached or failed
    #[error("Resolver unavailable: {0}")]
    Unavailable(String),
}

impl ResolveError {
    /// Create a not found error
    pub fn not_found(query: impl Into<String>) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
