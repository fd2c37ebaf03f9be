use thiserror::Error;

use crate::api::{ApiError, RemoteApi};
use crate::db::LogStore;
use crate::models::{LogRecord, NewLogRequest};

/// Errors surfaced by the sync layer.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Server unreachable, timed out, or returned a non-success response,
    /// and no usable cached data exists for the operation.
    #[error("network unavailable: {0}")]
    Network(String),
    /// Create input rejected, either locally before any network attempt or
    /// by the server.
    #[error("invalid log: {0}")]
    Validation(String),
    /// Local cache failure.
    #[error("local store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NetworkUnavailable(message) => SyncError::Network(message),
            ApiError::Validation(message) => SyncError::Validation(message),
        }
    }
}

/// Result of a list operation, flagging whether cached data was substituted.
#[derive(Debug, Clone)]
pub struct LogListing {
    pub records: Vec<LogRecord>,
    pub is_offline: bool,
}

/// Mediates between the remote server and the local cache.
///
/// Dependencies are injected explicitly; nothing here owns a hidden global
/// connection. Successful remote reads and writes are mirrored into the
/// store; every store mutation is a whole-record upsert or a delete by id.
pub struct SyncManager<A> {
    api: A,
    store: LogStore,
}

impl<A: RemoteApi> SyncManager<A> {
    pub fn new(api: A, store: LogStore) -> Self {
        Self { api, store }
    }

    /// Lists logs from the server, mirroring them into the cache. When the
    /// server is unreachable and the cache is non-empty, returns the cached
    /// set with `is_offline: true`; an empty cache re-raises the failure.
    pub async fn list_logs(&self) -> Result<LogListing, SyncError> {
        match self.api.list_logs().await {
            Ok(records) => {
                for record in &records {
                    self.store.upsert(record).await?;
                }
                Ok(LogListing {
                    records,
                    is_offline: false,
                })
            }
            Err(err) => {
                tracing::info!("list failed, falling back to local cache: {}", err);
                let cached = self.store.get_all().await?;
                if cached.is_empty() {
                    Err(err.into())
                } else {
                    Ok(LogListing {
                        records: cached,
                        is_offline: true,
                    })
                }
            }
        }
    }

    /// Fetches one log's detail. The cached copy is only trusted as a
    /// fallback when this id was individually fetched online before; records
    /// that entered the cache via a list or a push are not served as detail.
    pub async fn get_log(&self, id: i64) -> Result<LogRecord, SyncError> {
        match self.api.get_log(id).await {
            Ok(record) => {
                self.store.upsert(&record).await?;
                self.store.mark_fetched(id).await?;
                Ok(record)
            }
            Err(err) => {
                tracing::info!(id, "detail fetch failed, checking cache: {}", err);
                if self.store.is_fetched(id).await? {
                    if let Some(cached) = self.store.get_by_id(id).await? {
                        return Ok(cached);
                    }
                }
                Err(err.into())
            }
        }
    }

    /// Creates a log on the server. Online-only: a network failure is never
    /// queued locally, and the store is untouched until the server confirms.
    pub async fn create_log(&self, new: &NewLogRequest) -> Result<LogRecord, SyncError> {
        new.validate()
            .map_err(|err| SyncError::Validation(err.to_string()))?;

        let created = self.api.create_log(new).await?;
        self.store.upsert(&created).await?;
        Ok(created)
    }

    /// Deletes a log on the server, then drops it from the cache. Online-only
    /// like create; a failure leaves the cache unchanged.
    pub async fn delete_log(&self, id: i64) -> Result<LogRecord, SyncError> {
        let deleted = self.api.delete_log(id).await?;
        self.store.delete_by_id(id).await?;
        Ok(deleted)
    }

    /// Full dataset for reports. Always remote, never cached: reports are
    /// defined to be unavailable offline.
    pub async fn list_all_logs(&self) -> Result<Vec<LogRecord>, SyncError> {
        Ok(self.api.list_all_logs().await?)
    }

    /// Merges a pushed record into the cache, replacing any stored copy with
    /// the same id. Pushed records are not marked as fetched.
    pub async fn ingest_pushed(&self, record: LogRecord) -> Result<(), SyncError> {
        tracing::debug!(id = record.id, "ingesting pushed log");
        self.store.upsert(&record).await?;
        Ok(())
    }

    /// Cached set for startup display, without any network attempt. `None`
    /// when the cache is empty.
    pub async fn cached_logs(&self) -> Result<Option<Vec<LogRecord>>, SyncError> {
        let cached = self.store.get_all().await?;
        if cached.is_empty() {
            Ok(None)
        } else {
            Ok(Some(cached))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    /// Remote test double: serves a fixed record set when online, fails every
    /// call when offline.
    #[derive(Clone, Default)]
    struct MockApi {
        online: bool,
        remote: Arc<Mutex<Vec<LogRecord>>>,
        calls: Arc<AtomicUsize>,
    }

    impl MockApi {
        fn online(records: Vec<LogRecord>) -> Self {
            Self {
                online: true,
                remote: Arc::new(Mutex::new(records)),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn offline() -> Self {
            Self::default()
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn check_online(&self) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.online {
                Ok(())
            } else {
                Err(ApiError::NetworkUnavailable("connection refused".into()))
            }
        }
    }

    impl RemoteApi for MockApi {
        async fn list_logs(&self) -> Result<Vec<LogRecord>, ApiError> {
            self.check_online()?;
            Ok(self.remote.lock().unwrap().clone())
        }

        async fn get_log(&self, id: i64) -> Result<LogRecord, ApiError> {
            self.check_online()?;
            self.remote
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| ApiError::NetworkUnavailable("not found".into()))
        }

        async fn create_log(&self, new: &NewLogRequest) -> Result<LogRecord, ApiError> {
            self.check_online()?;
            let mut remote = self.remote.lock().unwrap();
            let id = remote.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            let created = LogRecord {
                id,
                date: new.date.clone(),
                amount: new.amount,
                kind: new.kind.clone(),
                category: new.category.clone(),
                description: new.description.clone(),
            };
            remote.push(created.clone());
            Ok(created)
        }

        async fn delete_log(&self, id: i64) -> Result<LogRecord, ApiError> {
            self.check_online()?;
            let mut remote = self.remote.lock().unwrap();
            let pos = remote
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| ApiError::NetworkUnavailable("not found".into()))?;
            Ok(remote.remove(pos))
        }

        async fn list_all_logs(&self) -> Result<Vec<LogRecord>, ApiError> {
            self.check_online()?;
            Ok(self.remote.lock().unwrap().clone())
        }
    }

    async fn test_manager(api: MockApi) -> (tempfile::TempDir, SyncManager<MockApi>) {
        let temp_dir = tempdir().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        (temp_dir, SyncManager::new(api, LogStore::new(pool)))
    }

    fn record(id: i64, category: &str, amount: f64) -> LogRecord {
        LogRecord {
            id,
            date: "2024-01-05".to_string(),
            amount,
            kind: "intake".to_string(),
            category: category.to_string(),
            description: String::new(),
        }
    }

    fn new_request() -> NewLogRequest {
        NewLogRequest {
            date: "2024-01-05".to_string(),
            amount: 500.0,
            kind: "intake".to_string(),
            category: "lunch".to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_list_logs_online_mirrors_into_cache() {
        let remote = vec![record(1, "lunch", 500.0), record(2, "dinner", 700.0)];
        let (_dir, manager) = test_manager(MockApi::online(remote.clone())).await;

        // Pre-existing cached record with an id not on the server survives.
        manager.ingest_pushed(record(9, "snack", 100.0)).await.unwrap();

        let listing = manager.list_logs().await.unwrap();
        assert!(!listing.is_offline);
        assert_eq!(listing.records, remote);

        let cached = manager.cached_logs().await.unwrap().unwrap();
        assert_eq!(cached.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 9]);
    }

    #[tokio::test]
    async fn test_list_logs_online_newest_wins_by_id() {
        let (_dir, manager) =
            test_manager(MockApi::online(vec![record(1, "brunch", 450.0)])).await;

        manager.ingest_pushed(record(1, "lunch", 500.0)).await.unwrap();
        manager.list_logs().await.unwrap();

        let cached = manager.cached_logs().await.unwrap().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].category, "brunch");
    }

    #[tokio::test]
    async fn test_list_logs_offline_returns_cached() {
        let (_dir, manager) = test_manager(MockApi::offline()).await;
        manager.ingest_pushed(record(1, "lunch", 500.0)).await.unwrap();

        let listing = manager.list_logs().await.unwrap();
        assert!(listing.is_offline);
        assert_eq!(listing.records.len(), 1);
        assert_eq!(listing.records[0].id, 1);
    }

    #[tokio::test]
    async fn test_list_logs_offline_empty_cache_propagates() {
        let (_dir, manager) = test_manager(MockApi::offline()).await;

        let err = manager.list_logs().await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
    }

    #[tokio::test]
    async fn test_get_log_fallback_requires_fetched_marker() {
        let remote = vec![record(1, "lunch", 500.0), record(2, "dinner", 700.0)];
        let api = MockApi::online(remote);
        let (_dir, manager) = test_manager(api.clone()).await;

        // id 1 individually fetched, id 2 only seen via a list.
        manager.get_log(1).await.unwrap();
        manager.list_logs().await.unwrap();

        let offline_api = MockApi::offline();
        let offline = SyncManager::new(offline_api, manager.store.clone());

        let cached = offline.get_log(1).await.unwrap();
        assert_eq!(cached.category, "lunch");

        // Present in the cache but never detail-fetched: the failure wins.
        let err = offline.get_log(2).await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
    }

    #[tokio::test]
    async fn test_get_log_offline_unknown_id_propagates() {
        let (_dir, manager) = test_manager(MockApi::offline()).await;
        let err = manager.get_log(42).await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
    }

    #[tokio::test]
    async fn test_create_log_online_mirrors_into_cache() {
        let (_dir, manager) = test_manager(MockApi::online(Vec::new())).await;

        let created = manager.create_log(&new_request()).await.unwrap();
        assert_eq!(created.id, 1);

        let cached = manager.cached_logs().await.unwrap().unwrap();
        assert_eq!(cached, vec![created]);
    }

    #[tokio::test]
    async fn test_create_log_validates_before_network() {
        let api = MockApi::online(Vec::new());
        let (_dir, manager) = test_manager(api.clone()).await;

        let mut bad = new_request();
        bad.amount = 0.0;
        let err = manager.create_log(&bad).await.unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_log_offline_leaves_cache_untouched() {
        let (_dir, manager) = test_manager(MockApi::offline()).await;

        let err = manager.create_log(&new_request()).await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
        assert!(manager.cached_logs().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_log_online_removes_from_cache() {
        let (_dir, manager) = test_manager(MockApi::online(vec![record(1, "lunch", 500.0)])).await;
        manager.list_logs().await.unwrap();

        let deleted = manager.delete_log(1).await.unwrap();
        assert_eq!(deleted.id, 1);
        assert!(manager.cached_logs().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_log_offline_leaves_cache_untouched() {
        let (_dir, manager) = test_manager(MockApi::offline()).await;
        manager.ingest_pushed(record(1, "lunch", 500.0)).await.unwrap();

        let err = manager.delete_log(1).await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
        assert_eq!(manager.cached_logs().await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_all_logs_never_touches_cache() {
        let remote = vec![record(1, "lunch", 500.0)];
        let (_dir, manager) = test_manager(MockApi::online(remote.clone())).await;

        let all = manager.list_all_logs().await.unwrap();
        assert_eq!(all, remote);
        assert!(manager.cached_logs().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_logs_offline_propagates() {
        let (_dir, manager) = test_manager(MockApi::offline()).await;
        manager.ingest_pushed(record(1, "lunch", 500.0)).await.unwrap();

        // Cached data exists but reports never use it.
        let err = manager.list_all_logs().await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
    }

    #[tokio::test]
    async fn test_cached_logs_reads_without_network() {
        let api = MockApi::offline();
        let (_dir, manager) = test_manager(api.clone()).await;

        assert!(manager.cached_logs().await.unwrap().is_none());

        manager.ingest_pushed(record(1, "lunch", 500.0)).await.unwrap();
        let cached = manager.cached_logs().await.unwrap().unwrap();
        assert_eq!(cached[0].id, 1);
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ingest_pushed_replaces_by_id() {
        let (_dir, manager) = test_manager(MockApi::offline()).await;

        manager.ingest_pushed(record(1, "lunch", 500.0)).await.unwrap();
        manager.ingest_pushed(record(1, "dinner", 700.0)).await.unwrap();

        let cached = manager.cached_logs().await.unwrap().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].category, "dinner");
    }

    #[tokio::test]
    async fn test_ingest_pushed_does_not_mark_fetched() {
        let (_dir, manager) = test_manager(MockApi::offline()).await;
        manager.ingest_pushed(record(1, "lunch", 500.0)).await.unwrap();

        // A pushed record is not trusted as detail, so the offline detail
        // fetch still fails.
        let err = manager.get_log(1).await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
    }
}
