//! The distributed record store boundary.
//!
//! The store itself (replication, peer discovery, physical persistence) is an
//! external collaborator; the core reaches it only through the
//! [`DistributedStore`] trait. One logical record exists per feed identity,
//! addressed by a [`FeedHandle`] whose keys also form the shareable
//! [`FeedUrl`]. [`MemoryStore`] is the in-process implementation used for
//! development and tests.

pub mod errors;
pub mod handle;
pub mod memory;
pub mod url;

use async_trait::async_trait;
use serde_json::Value;

pub use errors::{StoreError, StoreResult};
pub use handle::{EncryptionKey, RecordKey, KEY_LEN};
pub use memory::MemoryStore;
pub use url::{FeedUrl, FEED_SCHEME};

/// Prefix under which feed field values live inside a record.
///
/// The record root keeps the schema header; field values are namespaced so
/// readers can list them without touching the header.
pub const FEED_PREFIX: &str = "/feed";

/// Key under which a feed's schema header is mirrored into its record.
pub const HEADER_PATH: &str = "/schema.json";

/// Identifies a feed's distributed record.
///
/// Obtained fresh on each store access; the core never caches handles
/// between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedHandle {
    pub record_key: RecordKey,
    pub encryption_key: EncryptionKey,
}

impl FeedHandle {
    /// The shareable address for this record.
    pub fn url(&self) -> FeedUrl {
        FeedUrl::new(self.record_key, self.encryption_key)
    }
}

/// Joins the feed prefix with a field's storage path.
pub fn feed_field_path(storage_path: &str) -> String {
    format!("{}{}", FEED_PREFIX, storage_path)
}

/// An opaque replicated keyed store, one logical record per feed identity.
#[async_trait]
pub trait DistributedStore: Send + Sync {
    /// Returns the handle for a feed's record, allocating the record if this
    /// identity has not been seen before.
    async fn open_feed(&self, feed_id: &str) -> StoreResult<FeedHandle>;

    /// Writes a value at a key inside the feed's record.
    async fn put(&self, feed_id: &str, path: &str, value: &Value) -> StoreResult<()>;

    /// Reads a value from the feed's record. `None` when the key is unset.
    async fn get(&self, feed_id: &str, path: &str) -> StoreResult<Option<Value>>;

    /// Destroys the feed's record and all its keys.
    async fn destroy(&self, feed_id: &str) -> StoreResult<()>;

    /// Re-announces the feed's record to the network so peers can find it.
    async fn announce(&self, feed_id: &str) -> StoreResult<()>;

    /// Feed identities the store currently holds records for.
    async fn known_feeds(&self) -> StoreResult<Vec<String>>;
}
