//! In-memory feed index for tests and ephemeral runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::errors::{IndexError, IndexResult};
use super::{FeedIndex, FeedRecord};

/// A [`FeedIndex`] held entirely in memory.
#[derive(Default)]
pub struct MemoryIndex {
    rows: RwLock<HashMap<String, FeedRecord>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedIndex for MemoryIndex {
    async fn init(&self) -> IndexResult<()> {
        Ok(())
    }

    async fn insert(&self, record: FeedRecord) -> IndexResult<()> {
        let mut rows = self.rows.write().await;
        if rows.get(&record.feed_id).map_or(false, |r| r.is_active()) {
            return Err(IndexError::DuplicateFeed(record.feed_id));
        }
        rows.insert(record.feed_id.clone(), record);
        Ok(())
    }

    async fn find_active(&self, feed_id: &str) -> IndexResult<Option<FeedRecord>> {
        let rows = self.rows.read().await;
        Ok(rows.get(feed_id).filter(|r| r.is_active()).cloned())
    }

    async fn all_active(&self) -> IndexResult<Vec<FeedRecord>> {
        let rows = self.rows.read().await;
        let mut active: Vec<FeedRecord> =
            rows.values().filter(|r| r.is_active()).cloned().collect();
        active.sort_by(|a, b| a.feed_id.cmp(&b.feed_id));
        Ok(active)
    }

    async fn mark_deleted(&self, feed_id: &str) -> IndexResult<()> {
        let mut rows = self.rows.write().await;
        if let Some(row) = rows.get_mut(feed_id) {
            row.state = super::FeedState::Deleted;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FeedState;
    use serde_json::json;

    fn record(feed_id: &str) -> FeedRecord {
        FeedRecord {
            feed_id: feed_id.into(),
            record_key: "aa".repeat(32),
            encryption_key: "bb".repeat(32),
            state: FeedState::Active,
            meta: json!({}),
            created_at: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let index = MemoryIndex::new();
        index.insert(record("acct_1")).await.unwrap();
        let found = index.find_active("acct_1").await.unwrap().unwrap();
        assert_eq!(found.feed_id, "acct_1");
        assert!(index.find_active("acct_2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_active_rejected() {
        let index = MemoryIndex::new();
        index.insert(record("acct_1")).await.unwrap();
        let err = index.insert(record("acct_1")).await.unwrap_err();
        assert!(matches!(err, IndexError::DuplicateFeed(_)));
    }

    #[tokio::test]
    async fn test_delete_frees_identity_for_reuse() {
        let index = MemoryIndex::new();
        index.insert(record("acct_1")).await.unwrap();
        index.mark_deleted("acct_1").await.unwrap();
        assert!(index.find_active("acct_1").await.unwrap().is_none());
        // A fresh create after delete is allowed.
        index.insert(record("acct_1")).await.unwrap();
        assert!(index.find_active("acct_1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_all_active_sorted_and_filtered() {
        let index = MemoryIndex::new();
        index.insert(record("b")).await.unwrap();
        index.insert(record("a")).await.unwrap();
        index.mark_deleted("b").await.unwrap();
        let active = index.all_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].feed_id, "a");
    }
}
