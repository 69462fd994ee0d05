//! In-process distributed store implementation.
//!
//! Backs development and tests. Key material is derived deterministically
//! from a per-store seed, so re-opening a feed always yields the same handle
//! within one store instance, mirroring how a seeded networked store derives
//! record keys. Nothing here replicates; the trait is the contract.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use rand::RngCore;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use super::handle::{EncryptionKey, RecordKey, KEY_LEN};
use super::{DistributedStore, FeedHandle};

#[derive(Debug, Default)]
struct RecordState {
    entries: BTreeMap<String, Value>,
    announced: bool,
}

/// An in-memory [`DistributedStore`].
pub struct MemoryStore {
    seed: [u8; KEY_LEN],
    records: RwLock<HashMap<String, RecordState>>,
}

impl MemoryStore {
    /// A store with a random seed.
    pub fn new() -> Self {
        let mut seed = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut seed);
        Self::with_seed(seed)
    }

    /// A store deriving all key material from the given seed.
    pub fn with_seed(seed: [u8; KEY_LEN]) -> Self {
        Self { seed, records: RwLock::new(HashMap::new()) }
    }

    fn derive_handle(&self, feed_id: &str) -> FeedHandle {
        FeedHandle {
            record_key: RecordKey::from_bytes(derive(&self.seed, feed_id, b"record")),
            encryption_key: EncryptionKey::from_bytes(derive(&self.seed, feed_id, b"secret")),
        }
    }

    /// Whether a feed's record has been announced since the store started.
    pub async fn is_announced(&self, feed_id: &str) -> bool {
        self.records
            .read()
            .await
            .get(feed_id)
            .map(|r| r.announced)
            .unwrap_or(false)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn derive(seed: &[u8; KEY_LEN], feed_id: &str, label: &[u8]) -> [u8; KEY_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(feed_id.as_bytes());
    hasher.update(label);
    hasher.finalize().into()
}

#[async_trait]
impl DistributedStore for MemoryStore {
    async fn open_feed(&self, feed_id: &str) -> StoreResult<FeedHandle> {
        let mut records = self.records.write().await;
        records.entry(feed_id.to_string()).or_default();
        Ok(self.derive_handle(feed_id))
    }

    async fn put(&self, feed_id: &str, path: &str, value: &Value) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(feed_id)
            .ok_or_else(|| StoreError::UnknownFeed(feed_id.to_string()))?;
        record.entries.insert(path.to_string(), value.clone());
        Ok(())
    }

    async fn get(&self, feed_id: &str, path: &str) -> StoreResult<Option<Value>> {
        let records = self.records.read().await;
        let record = records
            .get(feed_id)
            .ok_or_else(|| StoreError::UnknownFeed(feed_id.to_string()))?;
        Ok(record.entries.get(path).cloned())
    }

    async fn destroy(&self, feed_id: &str) -> StoreResult<()> {
        self.records.write().await.remove(feed_id);
        Ok(())
    }

    async fn announce(&self, feed_id: &str) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(feed_id)
            .ok_or_else(|| StoreError::UnknownFeed(feed_id.to_string()))?;
        record.announced = true;
        Ok(())
    }

    async fn known_feeds(&self) -> StoreResult<Vec<String>> {
        let mut ids: Vec<String> = self.records.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_open_feed_is_stable_per_identity() {
        let store = MemoryStore::new();
        let first = store.open_feed("acct_1").await.unwrap();
        let second = store.open_feed("acct_1").await.unwrap();
        assert_eq!(first, second);

        let other = store.open_feed("acct_2").await.unwrap();
        assert_ne!(first.record_key, other.record_key);
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let store = MemoryStore::new();
        store.open_feed("acct_1").await.unwrap();
        store.put("acct_1", "/feed/bitcoin/", &json!(21.5)).await.unwrap();
        let value = store.get("acct_1", "/feed/bitcoin/").await.unwrap();
        assert_eq!(value, Some(json!(21.5)));
        assert_eq!(store.get("acct_1", "/feed/unset/").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_to_unopened_feed_fails() {
        let store = MemoryStore::new();
        let err = store.put("ghost", "/feed/x/", &json!(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownFeed(_)));
    }

    #[tokio::test]
    async fn test_destroy_removes_record() {
        let store = MemoryStore::new();
        store.open_feed("acct_1").await.unwrap();
        store.destroy("acct_1").await.unwrap();
        assert!(store.known_feeds().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_announce_marks_record() {
        let store = MemoryStore::new();
        store.open_feed("acct_1").await.unwrap();
        assert!(!store.is_announced("acct_1").await);
        store.announce("acct_1").await.unwrap();
        assert!(store.is_announced("acct_1").await);
    }

    #[tokio::test]
    async fn test_seeded_stores_derive_identical_handles() {
        let a = MemoryStore::with_seed([9u8; KEY_LEN]);
        let b = MemoryStore::with_seed([9u8; KEY_LEN]);
        assert_eq!(
            a.open_feed("acct_1").await.unwrap(),
            b.open_feed("acct_1").await.unwrap()
        );
    }
}
