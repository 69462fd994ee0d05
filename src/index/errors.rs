//! Feed index error types.

use thiserror::Error;

/// Errors surfaced by a [`super::FeedIndex`] implementation.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index already holds an active row for this feed identity.
    #[error("feed '{0}' already has an active index row")]
    DuplicateFeed(String),

    /// A persisted record failed its checksum or did not parse.
    #[error("corrupt index record at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    /// The underlying storage failed to read or write.
    #[error("index i/o: {0}")]
    Io(String),
}

impl From<std::io::Error> for IndexError {
    fn from(e: std::io::Error) -> Self {
        IndexError::Io(e.to_string())
    }
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
