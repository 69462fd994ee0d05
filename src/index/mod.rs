//! The local feed index.
//!
//! A relational-style store keyed by feed identity, holding the address
//! material needed to reach a feed's distributed record. The storage engine
//! behind it is opaque to the core: everything goes through the
//! [`FeedIndex`] trait. [`LogIndex`] persists rows to an append-only
//! checksummed log; [`MemoryIndex`] backs tests.

pub mod errors;
pub mod log;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use errors::{IndexError, IndexResult};
pub use log::LogIndex;
pub use memory::MemoryIndex;

/// Row state. Deleted rows are kept for audit; only active rows resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FeedState {
    Deleted,
    Active,
}

impl From<FeedState> for u8 {
    fn from(state: FeedState) -> u8 {
        match state {
            FeedState::Deleted => 0,
            FeedState::Active => 1,
        }
    }
}

impl TryFrom<u8> for FeedState {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FeedState::Deleted),
            1 => Ok(FeedState::Active),
            other => Err(format!("unknown feed state {}", other)),
        }
    }
}

/// One index row.
///
/// Invariant: at most one active row exists per `feed_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub feed_id: String,
    /// Hex-encoded record public key.
    pub record_key: String,
    /// Hex-encoded record encryption key.
    pub encryption_key: String,
    pub state: FeedState,
    pub meta: Value,
    /// Creation time, unix millis.
    pub created_at: i64,
}

impl FeedRecord {
    pub fn is_active(&self) -> bool {
        self.state == FeedState::Active
    }
}

/// CRUD surface of the local index.
#[async_trait]
pub trait FeedIndex: Send + Sync {
    /// Prepares the index for use (opens/replays backing storage).
    async fn init(&self) -> IndexResult<()>;

    /// Inserts a new active row. Fails with [`IndexError::DuplicateFeed`]
    /// when an active row for the identity already exists.
    async fn insert(&self, record: FeedRecord) -> IndexResult<()>;

    /// The active row for a feed identity, if any.
    async fn find_active(&self, feed_id: &str) -> IndexResult<Option<FeedRecord>>;

    /// All active rows.
    async fn all_active(&self) -> IndexResult<Vec<FeedRecord>>;

    /// Marks the feed's row deleted. A missing row is not an error.
    async fn mark_deleted(&self, feed_id: &str) -> IndexResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serializes_as_int() {
        assert_eq!(serde_json::to_string(&FeedState::Active).unwrap(), "1");
        assert_eq!(serde_json::to_string(&FeedState::Deleted).unwrap(), "0");
        let state: FeedState = serde_json::from_str("1").unwrap();
        assert_eq!(state, FeedState::Active);
        assert!(serde_json::from_str::<FeedState>("7").is_err());
    }
}
