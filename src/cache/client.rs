//! Cache client that fronts the configured store.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::memory::MemoryStore;
use crate::cache::observer::{CacheObserver, CacheOp, TracingObserver};
use crate::cache::redis::RedisStore;
use crate::cache::{CacheError, ConnectionState, KeyValueStore};
use crate::config::settings::{CacheBackend, CacheConfig};

/// Handle to a remote key-value store with expiring entries.
///
/// Cloning is cheap and every clone shares the same connection handle.
/// Values are never cached locally: each read is a round-trip to the store.
/// Failures never panic; they are reported to the [`CacheObserver`] and
/// returned as values.
#[derive(Clone)]
pub struct CacheClient {
    store: Arc<dyn KeyValueStore>,
    observer: Arc<dyn CacheObserver>,
    key_prefix: Option<String>,
}

impl CacheClient {
    /// Wrap an existing store, logging failures through `tracing`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            observer: Arc::new(TracingObserver),
            key_prefix: None,
        }
    }

    /// Open a client for the backend selected in `config`.
    ///
    /// For Redis the connection is negotiated in the background; use
    /// [`CacheClient::wait_until_alive`] to wait for it. Only configuration
    /// problems are returned here.
    pub fn open(config: &CacheConfig) -> Result<Self, CacheError> {
        let store: Arc<dyn KeyValueStore> = match config.backend {
            CacheBackend::Redis => Arc::new(RedisStore::connect(&config.redis)?),
            CacheBackend::Memory => Arc::new(MemoryStore::new()),
        };

        tracing::debug!(backend = ?config.backend, "Cache client opened");
        Ok(Self::new(store).with_key_prefix(&config.key_prefix))
    }

    /// Replace the failure observer.
    pub fn with_observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Namespace every key as `{prefix}:{key}`. An empty prefix disables it.
    pub fn with_key_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        self
    }

    fn prefixed_key<'a>(&self, key: &'a str) -> std::borrow::Cow<'a, str> {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key).into(),
            None => key.into(),
        }
    }

    fn report<T>(
        &self,
        op: CacheOp,
        key: &str,
        result: Result<T, CacheError>,
    ) -> Result<T, CacheError> {
        if let Err(ref err) = result {
            self.observer.on_failure(op, key, err);
        }
        result
    }

    // ========================================================================
    // Connection state
    // ========================================================================

    /// Whether the connection handle reports an established session.
    ///
    /// Reads local state only and never suspends.
    pub fn is_alive(&self) -> bool {
        self.store.state() == ConnectionState::Connected
    }

    pub fn state(&self) -> ConnectionState {
        self.store.state()
    }

    /// Wait up to `timeout` for a session to be up, including one being
    /// re-established after a drop.
    pub async fn wait_until_alive(&self, timeout: Duration) -> bool {
        self.store.wait_until_connected(timeout).await
    }

    /// Tear down the connection handle shared by all clones.
    pub async fn close(&self) {
        self.store.close().await;
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Get the value stored under `key`.
    ///
    /// Returns `None` when the key is absent, expired, or the store could not
    /// be reached.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.try_get(key).await.unwrap_or(None)
    }

    /// Like [`CacheClient::get`] but keeps the failure.
    pub async fn try_get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let result = self.store.get(&self.prefixed_key(key)).await;
        self.report(CacheOp::Get, key, result)
    }

    /// Store `value` under `key`, expiring `duration_secs` seconds from now.
    ///
    /// Overwrites any existing value and expiration.
    pub async fn set(
        &self,
        key: &str,
        value: &str,
        duration_secs: u64,
    ) -> Result<(), CacheError> {
        let result = self
            .store
            .set_ex(&self.prefixed_key(key), value, duration_secs)
            .await;
        self.report(CacheOp::Set, key, result)
    }

    /// Remove `key`. Removing a missing key succeeds.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let result = self.store.del(&self.prefixed_key(key)).await.map(|removed| {
            tracing::trace!(key, removed, "Cache key deleted");
        });
        self.report(CacheOp::Delete, key, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use proptest::prelude::*;

    #[derive(Default)]
    struct RecordingObserver {
        failures: Mutex<Vec<(CacheOp, String, CacheError)>>,
    }

    impl RecordingObserver {
        fn failures(&self) -> Vec<(CacheOp, String, CacheError)> {
            self.failures.lock().unwrap().clone()
        }
    }

    impl CacheObserver for RecordingObserver {
        fn on_failure(&self, op: CacheOp, key: &str, error: &CacheError) {
            self.failures
                .lock()
                .unwrap()
                .push((op, key.to_string(), error.clone()));
        }
    }

    fn client_with(store: Arc<MemoryStore>) -> (CacheClient, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::default());
        let client = CacheClient::new(store).with_observer(observer.clone());
        (client, observer)
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let (client, observer) = client_with(MemoryStore::shared());
        assert_eq!(client.get("never-written").await, None);
        assert!(observer.failures().is_empty());
    }

    #[tokio::test]
    async fn test_session_expires_after_duration() {
        let (client, _) = client_with(MemoryStore::shared());

        client.set("session:42", "user-7", 2).await.unwrap();
        assert_eq!(client.get("session:42").await.as_deref(), Some("user-7"));

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(client.get("session:42").await, None);
    }

    #[tokio::test]
    async fn test_set_overwrites_value() {
        let (client, _) = client_with(MemoryStore::shared());
        client.set("k", "old", 60).await.unwrap();
        client.set("k", "new", 60).await.unwrap();
        assert_eq!(client.get("k").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_delete_missing_key_succeeds() {
        let (client, observer) = client_with(MemoryStore::shared());
        assert_eq!(client.delete("nope").await, Ok(()));
        assert!(observer.failures().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_key() {
        let (client, _) = client_with(MemoryStore::shared());
        client.set("k", "v", 60).await.unwrap();
        client.delete("k").await.unwrap();
        assert_eq!(client.get("k").await, None);
    }

    #[tokio::test]
    async fn test_not_ready_handle() {
        let store = Arc::new(MemoryStore::pending());
        let (client, observer) = client_with(store.clone());

        assert!(!client.is_alive());
        assert_eq!(client.get("k").await, None);
        assert_eq!(client.set("k", "v", 5).await, Err(CacheError::NotReady));
        assert_eq!(client.delete("k").await, Err(CacheError::NotReady));
        assert_eq!(observer.failures().len(), 3);

        store.mark_connected();
        assert!(client.is_alive());
        assert!(client.set("k", "v", 5).await.is_ok());
    }

    #[tokio::test]
    async fn test_broken_connection() {
        let store = MemoryStore::shared();
        let (client, observer) = client_with(store.clone());
        client.set("anykey", "v", 60).await.unwrap();

        store.break_connection();

        assert!(!client.is_alive());
        assert_eq!(client.get("anykey").await, None);
        assert!(matches!(
            client.try_get("anykey").await,
            Err(CacheError::Transport(_))
        ));

        let failures = observer.failures();
        assert_eq!(failures[0].0, CacheOp::Get);
        assert_eq!(failures[0].1, "anykey");
    }

    #[tokio::test]
    async fn test_store_error_reported() {
        let (client, observer) = client_with(MemoryStore::shared());
        let result = client.set("k", "v", 0).await;
        assert!(matches!(result, Err(CacheError::Store(_))));
        assert_eq!(observer.failures()[0].0, CacheOp::Set);
    }

    #[tokio::test]
    async fn test_close_shared_by_clones() {
        let (client, _) = client_with(MemoryStore::shared());
        let other = client.clone();

        client.close().await;

        assert!(!other.is_alive());
        assert_eq!(other.state(), ConnectionState::Closed);
        assert_eq!(other.delete("k").await, Err(CacheError::Closed));
    }

    #[tokio::test]
    async fn test_key_prefix_applied() {
        let store = MemoryStore::shared();
        let prefixed = CacheClient::new(store.clone()).with_key_prefix("app");
        let raw = CacheClient::new(store);

        prefixed.set("k", "v", 60).await.unwrap();
        assert_eq!(raw.get("app:k").await.as_deref(), Some("v"));
        assert_eq!(raw.get("k").await, None);
        assert_eq!(prefixed.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_empty_prefix_is_ignored() {
        let store = MemoryStore::shared();
        let client = CacheClient::new(store.clone()).with_key_prefix("");
        client.set("k", "v", 60).await.unwrap();
        assert_eq!(CacheClient::new(store).get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_concurrent_operations_share_handle() {
        let (client, _) = client_with(MemoryStore::shared());

        let writes = (0..32).map(|i| {
            let client = client.clone();
            async move { client.set(&format!("k{}", i), &i.to_string(), 60).await }
        });
        for result in futures::future::join_all(writes).await {
            assert!(result.is_ok());
        }

        let reads = (0..32).map(|i| {
            let client = client.clone();
            async move { (i, client.get(&format!("k{}", i)).await) }
        });
        for (i, value) in futures::future::join_all(reads).await {
            assert_eq!(value, Some(i.to_string()));
        }
    }

    #[tokio::test]
    async fn test_open_memory_backend() {
        let config = CacheConfig {
            backend: CacheBackend::Memory,
            ..CacheConfig::default()
        };
        let client = CacheClient::open(&config).unwrap();
        assert!(client.is_alive());
        assert!(client.wait_until_alive(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_open_redis_unreachable_does_not_panic() {
        let mut config = CacheConfig::default();
        config.redis.url = "redis://127.0.0.1:1".to_string();
        config.redis.connection_timeout = 1;

        let client = CacheClient::open(&config).unwrap();
        assert!(!client.wait_until_alive(Duration::from_secs(2)).await);
        assert!(!client.is_alive());
        assert_eq!(client.get("anykey").await, None);
        assert!(client.set("anykey", "v", 5).await.is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_set_then_get_returns_value(
            key in "[a-z:0-9]{1,24}",
            value in ".{0,64}",
            duration in 1u64..3600,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let got = rt.block_on(async {
                let client = CacheClient::new(MemoryStore::shared());
                client.set(&key, &value, duration).await.unwrap();
                client.get(&key).await
            });
            prop_assert_eq!(got, Some(value));
        }

        #[test]
        fn prop_get_after_delete_is_none(key in "[a-z:0-9]{1,24}", written in any::<bool>()) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (deleted, got) = rt.block_on(async {
                let client = CacheClient::new(MemoryStore::shared());
                if written {
                    client.set(&key, "v", 60).await.unwrap();
                }
                (client.delete(&key).await, client.get(&key).await)
            });
            prop_assert_eq!(deleted, Ok(()));
            prop_assert_eq!(got, None);
        }
    }
}
