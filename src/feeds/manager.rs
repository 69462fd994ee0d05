//! The feed lifecycle manager.
//!
//! Owns the canonical schema, the resolved feed type validator and both
//! collaborators (index and distributed store), and drives the
//! create/update/delete/get state machine. Per feed identity the states are
//! `absent` and `active`; `create_feed` moves a feed to `active`,
//! `delete_feed` back to `absent`.
//!
//! Consistency is best-effort: no transaction spans the index and the store.
//! The maintained invariant is "an active index row implies the distributed
//! record exists"; the converse does not hold (a create that fails after its
//! store writes leaves an orphaned record). [`FeedManager::reconcile`]
//! reports such drift without repairing it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::index::{FeedIndex, FeedRecord, FeedState};
use crate::observability::{Logger, Severity};
use crate::schema::{FeedSchema, FeedTypeValidator, FieldUpdate, TypeRegistry};
use crate::store::{feed_field_path, DistributedStore, FeedHandle, HEADER_PATH};

use super::errors::{FeedError, FeedResult};
use super::lock::SingleFlight;

/// Address material returned by `create_feed` and `get_feed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedInfo {
    pub url: String,
    pub record_key: String,
    pub encryption_key: String,
}

/// Outcome of a successful broadcast pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    /// Feeds successfully re-announced.
    pub announced: usize,
}

/// Drift between the index and the distributed store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Store records with no active index row.
    pub orphaned_records: Vec<String>,
    /// Active index rows whose store record is gone.
    pub missing_records: Vec<String>,
}

/// The feed lifecycle state machine.
pub struct FeedManager {
    schema: FeedSchema,
    validator: Arc<dyn FeedTypeValidator>,
    index: Arc<dyn FeedIndex>,
    store: Arc<dyn DistributedStore>,
    locks: SingleFlight,
    ready: AtomicBool,
}

impl FeedManager {
    /// Builds a manager for a validated schema.
    ///
    /// The feed type validator is resolved from the registry here, once;
    /// operations never re-resolve it.
    pub fn new(
        schema: FeedSchema,
        registry: &TypeRegistry,
        index: Arc<dyn FeedIndex>,
        store: Arc<dyn DistributedStore>,
    ) -> FeedResult<Self> {
        let validator = registry
            .resolve(&schema.feed_type)
            .map_err(|e| FeedError::BadConfig(e.message().to_string()))?;
        Ok(Self {
            schema,
            validator,
            index,
            store,
            locks: SingleFlight::new(),
            ready: AtomicBool::new(false),
        })
    }

    /// Initializes the index and marks the manager ready.
    pub async fn start(&self) -> FeedResult<()> {
        self.index.init().await.map_err(|e| {
            Logger::error("index_init_failed", &e, &[]);
            FeedError::DbFailedStart
        })?;
        self.ready.store(true, Ordering::SeqCst);
        Logger::log(Severity::Info, "feed_manager_started", &[("schema", &self.schema.name)]);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn schema(&self) -> &FeedSchema {
        &self.schema
    }

    /// Creates the feed's distributed record, initializes every schema field
    /// with a placeholder and inserts the index row.
    ///
    /// Serialized per feed identity: a concurrent create for the same
    /// `feed_id` fails immediately with `PROCESS_ALREADY_RUNNING`. A failure
    /// after the record was allocated leaves the record behind without an
    /// index row; `reconcile` surfaces it.
    pub async fn create_feed(&self, feed_id: &str) -> FeedResult<FeedInfo> {
        self.ensure_ready()?;
        check_feed_id(feed_id)?;

        let _guard = self
            .locks
            .try_acquire(feed_id)
            .ok_or(FeedError::ProcessAlreadyRunning)?;

        if self.find_active(feed_id, FeedError::FailedCreateFeed).await?.is_some() {
            return Err(FeedError::FeedExists);
        }

        let handle = self.store.open_feed(feed_id).await.map_err(|e| {
            Logger::error("store_open_failed", &e, &[("feed_id", feed_id)]);
            FeedError::FailedCreateFeed
        })?;
        if handle.record_key.is_zero() {
            return Err(FeedError::IdNoFeed);
        }

        self.init_feed_record(feed_id).await?;

        let record = FeedRecord {
            feed_id: feed_id.to_string(),
            record_key: handle.record_key.to_hex(),
            encryption_key: handle.encryption_key.to_hex(),
            state: FeedState::Active,
            meta: serde_json::json!({}),
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.index.insert(record).await.map_err(|e| {
            Logger::error("index_insert_failed", &e, &[("feed_id", feed_id)]);
            FeedError::FailedCreateFeed
        })?;

        let info = feed_info(&handle);
        Logger::log(
            Severity::Info,
            "feed_created",
            &[("feed_id", feed_id), ("url", &info.url)],
        );
        Ok(info)
    }

    /// Writes the schema header and a placeholder per field into a freshly
    /// allocated record. Writes already applied before a failure stay.
    async fn init_feed_record(&self, feed_id: &str) -> FeedResult<()> {
        let header = serde_json::to_value(&self.schema).map_err(|e| {
            Logger::error("schema_header_encode_failed", &e, &[("feed_id", feed_id)]);
            FeedError::BadSchemaSetup
        })?;
        self.store.put(feed_id, HEADER_PATH, &header).await.map_err(|e| {
            Logger::error("schema_header_write_failed", &e, &[("feed_id", feed_id)]);
            FeedError::BadSchemaSetup
        })?;

        for field in &self.schema.fields {
            let path = feed_field_path(&field.storage_path);
            self.store
                .put(feed_id, &path, &Value::Null)
                .await
                .map_err(|e| {
                    Logger::error(
                        "field_init_failed",
                        &e,
                        &[("feed_id", feed_id), ("field", &field.name)],
                    );
                    FeedError::BadSchemaSetup
                })?;
        }
        Ok(())
    }

    /// Validates and applies a batch of field updates.
    ///
    /// All updates are validated before anything is written. Writes are
    /// applied in order; the first failing write aborts the call and earlier
    /// writes remain applied (no atomic multi-field update).
    pub async fn update_feed(&self, feed_id: &str, updates: &[FieldUpdate]) -> FeedResult<()> {
        self.ensure_ready()?;
        check_feed_id(feed_id)?;

        if updates.is_empty() {
            return Err(FeedError::MissingFields);
        }

        let mut writes = Vec::with_capacity(updates.len());
        for update in updates {
            let name = update
                .name
                .as_deref()
                .filter(|n| !n.is_empty())
                .ok_or(FeedError::MissingFieldName)?;
            let value = update.value.as_ref().ok_or(FeedError::MissingFieldValue)?;
            let field = self
                .schema
                .field(name)
                .ok_or_else(|| FeedError::UnknownField(name.to_string()))?;
            let validated = self.validator.validate_update(field, value).map_err(|e| {
                FeedError::InvalidFieldValue {
                    field: name.to_string(),
                    reason: e.message().to_string(),
                }
            })?;
            writes.push((feed_field_path(&field.storage_path), validated.to_json()));
        }

        if self
            .find_active(feed_id, FeedError::UpdateFeedFailed)
            .await?
            .is_none()
        {
            return Err(FeedError::FeedNotExists);
        }

        for (path, value) in &writes {
            self.store.put(feed_id, path, value).await.map_err(|e| {
                Logger::error(
                    "field_update_failed",
                    &e,
                    &[("feed_id", feed_id), ("path", path)],
                );
                FeedError::UpdateFeedFailed
            })?;
        }

        Logger::log(Severity::Info, "feed_updated", &[("feed_id", feed_id)]);
        Ok(())
    }

    /// Returns the feed's address material from the index alone.
    ///
    /// The index is the address-of-record; the distributed store is never
    /// queried on read.
    pub async fn get_feed(&self, feed_id: &str) -> FeedResult<FeedInfo> {
        self.ensure_ready()?;
        check_feed_id(feed_id)?;

        let record = self
            .find_active(feed_id, FeedError::FeedNotFound)
            .await?
            .ok_or(FeedError::FeedNotFound)?;
        feed_info_from_record(&record).ok_or_else(|| {
            Logger::error(
                "index_row_unparsable",
                &"bad key material in index row",
                &[("feed_id", feed_id)],
            );
            FeedError::FeedNotFound
        })
    }

    /// Deletes the feed. A feed that was never created is not an error.
    ///
    /// The index row is retired first, then the record destroyed; a failure
    /// in between leaves an orphaned record, which `reconcile` surfaces.
    pub async fn delete_feed(&self, feed_id: &str) -> FeedResult<()> {
        self.ensure_ready()?;
        check_feed_id(feed_id)?;

        if self
            .find_active(feed_id, FeedError::FailedDeleteFeed)
            .await?
            .is_none()
        {
            return Ok(());
        }

        self.index.mark_deleted(feed_id).await.map_err(|e| {
            Logger::error("index_delete_failed", &e, &[("feed_id", feed_id)]);
            FeedError::FailedDeleteFeed
        })?;
        self.store.destroy(feed_id).await.map_err(|e| {
            Logger::error("store_destroy_failed", &e, &[("feed_id", feed_id)]);
            FeedError::FailedDeleteFeed
        })?;

        Logger::log(Severity::Info, "feed_deleted", &[("feed_id", feed_id)]);
        Ok(())
    }

    /// Re-announces every active feed's record to the network.
    ///
    /// Used after process restart so previously created feeds stay
    /// reachable. Failures do not stop the pass; any failure turns the
    /// result into `FAILED_BROADCAST` carrying the success count.
    pub async fn start_broadcast(&self) -> FeedResult<BroadcastReport> {
        self.ensure_ready()?;

        let active = self.index.all_active().await.map_err(|e| {
            Logger::error("broadcast_scan_failed", &e, &[]);
            FeedError::FailedBroadcast { announced: 0, failed: 0 }
        })?;

        let mut announced = 0usize;
        let mut failed = 0usize;
        for record in &active {
            match self.store.announce(&record.feed_id).await {
                Ok(()) => announced += 1,
                Err(e) => {
                    failed += 1;
                    Logger::error("announce_failed", &e, &[("feed_id", &record.feed_id)]);
                }
            }
        }

        if failed > 0 {
            return Err(FeedError::FailedBroadcast { announced, failed });
        }
        Logger::log(
            Severity::Info,
            "broadcast_complete",
            &[("announced", &announced.to_string())],
        );
        Ok(BroadcastReport { announced })
    }

    /// Reports drift between the index and the store without repairing it.
    pub async fn reconcile(&self) -> FeedResult<ReconcileReport> {
        self.ensure_ready()?;

        let active = self.index.all_active().await.map_err(|e| {
            Logger::error("reconcile_scan_failed", &e, &[]);
            FeedError::FailedReconcile
        })?;
        let known = self.store.known_feeds().await.map_err(|e| {
            Logger::error("reconcile_store_scan_failed", &e, &[]);
            FeedError::FailedReconcile
        })?;

        let active_ids: Vec<&str> = active.iter().map(|r| r.feed_id.as_str()).collect();
        let mut report = ReconcileReport::default();
        for id in &known {
            if !active_ids.contains(&id.as_str()) {
                report.orphaned_records.push(id.clone());
            }
        }
        for id in active_ids {
            if !known.iter().any(|k| k == id) {
                report.missing_records.push(id.to_string());
            }
        }
        report.orphaned_records.sort();
        report.missing_records.sort();

        if !report.orphaned_records.is_empty() || !report.missing_records.is_empty() {
            Logger::log(
                Severity::Warn,
                "reconcile_drift",
                &[
                    ("orphaned", &report.orphaned_records.len().to_string()),
                    ("missing", &report.missing_records.len().to_string()),
                ],
            );
        }
        Ok(report)
    }

    fn ensure_ready(&self) -> FeedResult<()> {
        if !self.is_ready() {
            return Err(FeedError::NotReady);
        }
        Ok(())
    }

    /// Index lookup with the calling operation's failure kind.
    async fn find_active(
        &self,
        feed_id: &str,
        on_failure: FeedError,
    ) -> FeedResult<Option<FeedRecord>> {
        self.index.find_active(feed_id).await.map_err(|e| {
            Logger::error("index_lookup_failed", &e, &[("feed_id", feed_id)]);
            on_failure
        })
    }
}

fn check_feed_id(feed_id: &str) -> FeedResult<()> {
    if feed_id.trim().is_empty() {
        return Err(FeedError::FeedIdMissing);
    }
    Ok(())
}

fn feed_info(handle: &FeedHandle) -> FeedInfo {
    FeedInfo {
        url: handle.url().to_string(),
        record_key: handle.record_key.to_hex(),
        encryption_key: handle.encryption_key.to_hex(),
    }
}

fn feed_info_from_record(record: &FeedRecord) -> Option<FeedInfo> {
    let record_key = record.record_key.parse().ok()?;
    let encryption_key = record.encryption_key.parse().ok()?;
    let handle = FeedHandle { record_key, encryption_key };
    Some(feed_info(&handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn test_schema() -> FeedSchema {
        let registry = TypeRegistry::with_builtin();
        let config = serde_json::from_value(json!({
            "name": "Exchange Account",
            "description": "Balances and P/L",
            "icons": { "48": "data:image/png;base64,iVBORw0KGgo" },
            "fields": [
                {
                    "name": "Bitcoin",
                    "description": "BTC balance",
                    "type": "balance",
                    "units": "BTC",
                    "denomination_type": "main",
                    "denomination_ratio": 100000000u64
                },
                {
                    "name": "Bitcoin P/L",
                    "description": "BTC profit and loss",
                    "type": "pnl",
                    "units": "BTC"
                }
            ]
        }))
        .unwrap();
        crate::schema::SchemaValidator::new(&registry).generate(&config).unwrap()
    }

    async fn started_manager() -> FeedManager {
        let registry = TypeRegistry::with_builtin();
        let manager = FeedManager::new(
            test_schema(),
            &registry,
            Arc::new(MemoryIndex::new()),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();
        manager.start().await.unwrap();
        manager
    }

    fn update(name: &str, value: Value) -> FieldUpdate {
        FieldUpdate { name: Some(name.to_string()), value: Some(value) }
    }

    #[tokio::test]
    async fn test_operations_require_ready() {
        let registry = TypeRegistry::with_builtin();
        let manager = FeedManager::new(
            test_schema(),
            &registry,
            Arc::new(MemoryIndex::new()),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();
        assert_eq!(manager.create_feed("acct_1").await.unwrap_err(), FeedError::NotReady);
        assert_eq!(manager.get_feed("acct_1").await.unwrap_err(), FeedError::NotReady);
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_keys() {
        let manager = started_manager().await;
        let created = manager.create_feed("acct_1").await.unwrap();
        let fetched = manager.get_feed("acct_1").await.unwrap();
        assert_eq!(created, fetched);
        assert!(created.url.starts_with("feed://"));
    }

    #[tokio::test]
    async fn test_create_twice_fails_feed_exists() {
        let manager = started_manager().await;
        manager.create_feed("acct_1").await.unwrap();
        assert_eq!(
            manager.create_feed("acct_1").await.unwrap_err(),
            FeedError::FeedExists
        );
    }

    #[tokio::test]
    async fn test_create_rejects_empty_feed_id() {
        let manager = started_manager().await;
        assert_eq!(manager.create_feed("").await.unwrap_err(), FeedError::FeedIdMissing);
    }

    #[tokio::test]
    async fn test_update_validations() {
        let manager = started_manager().await;
        manager.create_feed("acct_1").await.unwrap();

        assert_eq!(
            manager.update_feed("acct_1", &[]).await.unwrap_err(),
            FeedError::MissingFields
        );
        assert_eq!(
            manager
                .update_feed("acct_1", &[FieldUpdate { name: None, value: Some(json!(1)) }])
                .await
                .unwrap_err(),
            FeedError::MissingFieldName
        );
        assert_eq!(
            manager
                .update_feed("acct_1", &[FieldUpdate { name: Some("Bitcoin".into()), value: None }])
                .await
                .unwrap_err(),
            FeedError::MissingFieldValue
        );
        assert_eq!(
            manager
                .update_feed("acct_1", &[update("Dogecoin", json!(1))])
                .await
                .unwrap_err(),
            FeedError::UnknownField("Dogecoin".into())
        );
        assert!(matches!(
            manager
                .update_feed("acct_1", &[update("Bitcoin", json!("12"))])
                .await
                .unwrap_err(),
            FeedError::InvalidFieldValue { .. }
        ));
    }

    #[tokio::test]
    async fn test_update_without_record_fails_feed_not_exists() {
        let manager = started_manager().await;
        assert_eq!(
            manager
                .update_feed("ghost", &[update("Bitcoin", json!(1))])
                .await
                .unwrap_err(),
            FeedError::FeedNotExists
        );
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let manager = started_manager().await;
        assert!(manager.delete_feed("never_created").await.is_ok());

        manager.create_feed("acct_1").await.unwrap();
        manager.delete_feed("acct_1").await.unwrap();
        assert_eq!(
            manager.get_feed("acct_1").await.unwrap_err(),
            FeedError::FeedNotFound
        );
        // Deleting again is still fine.
        assert!(manager.delete_feed("acct_1").await.is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_counts_active_feeds() {
        let manager = started_manager().await;
        manager.create_feed("acct_1").await.unwrap();
        manager.create_feed("acct_2").await.unwrap();
        let report = manager.start_broadcast().await.unwrap();
        assert_eq!(report, BroadcastReport { announced: 2 });
    }

    #[tokio::test]
    async fn test_reconcile_clean_after_lifecycle() {
        let manager = started_manager().await;
        manager.create_feed("acct_1").await.unwrap();
        let report = manager.reconcile().await.unwrap();
        assert_eq!(report, ReconcileReport::default());
    }
}
