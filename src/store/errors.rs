//! Distributed store error types.

use thiserror::Error;

/// Errors surfaced by a [`super::DistributedStore`] implementation.
///
/// The lifecycle manager never lets these escape; they are wrapped into
/// domain errors at its boundary.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store holds no record for this feed identity.
    #[error("no record for feed '{0}'")]
    UnknownFeed(String),

    /// Key material could not be parsed or derived.
    #[error("invalid key material: {0}")]
    BadKey(String),

    /// The underlying store failed to read or write.
    #[error("record store i/o: {0}")]
    Io(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
