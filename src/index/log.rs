//! Append-only log-backed feed index.
//!
//! Every mutation appends one checksummed JSON line; the full state is
//! rebuilt by replaying the log at init, last writer wins per feed identity.
//! Line format: `<crc32 of the json, hex>\t<record json>`.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::errors::{IndexError, IndexResult};
use super::{FeedIndex, FeedRecord, FeedState};

/// A [`FeedIndex`] persisted to an append-only checksummed log file.
pub struct LogIndex {
    path: PathBuf,
    // Small synchronous appends; one writer at a time.
    writer: Mutex<Option<File>>,
    rows: RwLock<HashMap<String, FeedRecord>>,
}

impl LogIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(None),
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn append(&self, record: &FeedRecord) -> IndexResult<()> {
        let json = serde_json::to_string(record)
            .map_err(|e| IndexError::Io(format!("serialize index record: {}", e)))?;
        let crc = crc32fast::hash(json.as_bytes());
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| IndexError::Io("index writer poisoned".into()))?;
        let file = guard
            .as_mut()
            .ok_or_else(|| IndexError::Io("index not initialized".into()))?;
        writeln!(file, "{:08x}\t{}", crc, json)?;
        file.flush()?;
        Ok(())
    }

    fn replay(path: &Path) -> IndexResult<HashMap<String, FeedRecord>> {
        let mut rows = HashMap::new();
        if !path.exists() {
            return Ok(rows);
        }
        let reader = BufReader::new(File::open(path)?);
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let record = parse_line(&line, number + 1)?;
            rows.insert(record.feed_id.clone(), record);
        }
        Ok(rows)
    }
}

fn parse_line(line: &str, number: usize) -> IndexResult<FeedRecord> {
    let (crc_text, json) = line.split_once('\t').ok_or_else(|| IndexError::Corrupt {
        line: number,
        reason: "missing checksum separator".into(),
    })?;
    let expected = u32::from_str_radix(crc_text, 16).map_err(|_| IndexError::Corrupt {
        line: number,
        reason: "unparsable checksum".into(),
    })?;
    let actual = crc32fast::hash(json.as_bytes());
    if actual != expected {
        return Err(IndexError::Corrupt {
            line: number,
            reason: format!("checksum mismatch: {:08x} != {:08x}", actual, expected),
        });
    }
    serde_json::from_str(json).map_err(|e| IndexError::Corrupt {
        line: number,
        reason: e.to_string(),
    })
}

#[async_trait]
impl FeedIndex for LogIndex {
    async fn init(&self) -> IndexResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let replayed = Self::replay(&self.path)?;
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        *self
            .writer
            .lock()
            .map_err(|_| IndexError::Io("index writer poisoned".into()))? = Some(file);
        *self.rows.write().await = replayed;
        Ok(())
    }

    async fn insert(&self, record: FeedRecord) -> IndexResult<()> {
        let mut rows = self.rows.write().await;
        if rows.get(&record.feed_id).map_or(false, |r| r.is_active()) {
            return Err(IndexError::DuplicateFeed(record.feed_id));
        }
        self.append(&record)?;
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
            let mut tombstone = row.clone();
            tombstone.state = FeedState::Deleted;
            self.append(&tombstone)?;
            *row = tombstone;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(feed_id: &str) -> FeedRecord {
        FeedRecord {
            feed_id: feed_id.into(),
            record_key: "aa".repeat(32),
            encryption_key: "bb".repeat(32),
            state: FeedState::Active,
            meta: json!({"origin": "test"}),
            created_at: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_rows_survive_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("feeds.log");

        let index = LogIndex::new(&path);
        index.init().await.unwrap();
        index.insert(record("acct_1")).await.unwrap();
        index.insert(record("acct_2")).await.unwrap();
        index.mark_deleted("acct_2").await.unwrap();

        let reopened = LogIndex::new(&path);
        reopened.init().await.unwrap();
        assert!(reopened.find_active("acct_1").await.unwrap().is_some());
        assert!(reopened.find_active("acct_2").await.unwrap().is_none());
        assert_eq!(reopened.all_active().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_active_rejected() {
        let tmp = TempDir::new().unwrap();
        let index = LogIndex::new(tmp.path().join("feeds.log"));
        index.init().await.unwrap();
        index.insert(record("acct_1")).await.unwrap();
        assert!(matches!(
            index.insert(record("acct_1")).await.unwrap_err(),
            IndexError::DuplicateFeed(_)
        ));
    }

    #[tokio::test]
    async fn test_tampered_line_detected_on_replay() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("feeds.log");

        let index = LogIndex::new(&path);
        index.init().await.unwrap();
        index.insert(record("acct_1")).await.unwrap();
        drop(index);

        let tampered = std::fs::read_to_string(&path).unwrap().replace("acct_1", "acct_x");
        std::fs::write(&path, tampered).unwrap();

        let reopened = LogIndex::new(&path);
        let err = reopened.init().await.unwrap_err();
        assert!(matches!(err, IndexError::Corrupt { line: 1, .. }));
    }

    #[tokio::test]
    async fn test_insert_after_delete_reuses_identity() {
        let tmp = TempDir::new().unwrap();
        let index = LogIndex::new(tmp.path().join("feeds.log"));
        index.init().await.unwrap();
        index.insert(record("acct_1")).await.unwrap();
        index.mark_deleted("acct_1").await.unwrap();
        index.insert(record("acct_1")).await.unwrap();
        assert!(index.find_active("acct_1").await.unwrap().is_some());
    }
}
