use thiserror::Error;

/// Result type alias for DNSBL check operations
pub type Result<T> = std::result::Result<T, CheckError>;

/// Errors that stop a check run before or during setup
#[derive(Error, Debug)]
pub enum CheckError {
    /// No DNSBL zone was configured
    #[error("no service (zone) list specified (-s option)")]
    NoZones,

    /// A zone name was empty or otherwise unusable
    #[error("invalid zone name: {0:?}")]
    InvalidZone(String),

    /// The DNS resolver could not be initialized
    #[error("unable to initialize DNS library: {0}")]
    ResolverInit(String),

    /// Configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),
}

/// Outcome of a single DNS query that did not produce records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The name does not exist or has no records of the requested type.
    /// This is a definitive negative answer, not a failure.
    #[error("no such record")]
    NotFound,

    /// Timeout, transport failure, malformed response or server failure
    #[error("{0}")]
    Failed(String),
}

impl QueryError {
    /// Returns true for a definitive negative answer
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Build a failure from any displayable error
    pub fn failed(err: impl std::fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}
