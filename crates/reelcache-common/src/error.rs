//! Common error types used throughout reelcache.
//!
//! The first five variants form the lookup failure taxonomy: each one aborts
//! the current lookup call and is never retried automatically. Transport and
//! JSON-parse failures are deliberately absent — those are swallowed and
//! logged at the provider-client boundary and never propagate this far.

/// Common error type for reelcache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No usable search criteria were supplied, or free-text parsing
    /// produced nothing usable.
    #[error("No criteria specified for lookup: {0}")]
    InvalidCriteria(String),

    /// Cache-only mode was requested but no cached record exists.
    #[error("Movie {0} not found in cache")]
    NotFoundInCache(String),

    /// The provider returned nothing usable across all attempted strategies.
    #[error("No results found for {0}")]
    NoResults(String),

    /// The top candidate scores were too close to call; the matcher never
    /// silently guesses.
    #[error("Unable to determine correct movie, score difference too small: {0}")]
    AmbiguousMatch(String),

    /// Every search candidate was filtered out by year or minimum score.
    #[error("No suitable results for {0}")]
    NoSuitableResults(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new InvalidCriteria error.
    pub fn invalid_criteria<S: Into<String>>(msg: S) -> Self {
        Self::InvalidCriteria(msg.into())
    }

    /// Create a new NotFoundInCache error.
    pub fn not_found_in_cache<S: Into<String>>(msg: S) -> Self {
        Self::NotFoundInCache(msg.into())
    }

    /// Create a new NoResults error.
    pub fn no_results<S: Into<String>>(msg: S) -> Self {
        Self::NoResults(msg.into())
    }

    /// Create a new AmbiguousMatch error.
    pub fn ambiguous_match<S: Into<String>>(msg: S) -> Self {
        Self::AmbiguousMatch(msg.into())
    }

    /// Create a new NoSuitableResults error.
    pub fn no_suitable_results<S: Into<String>>(msg: S) -> Self {
        Self::NoSuitableResults(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
