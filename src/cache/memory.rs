//! In-process store with per-entry expiration.
//!
//! Stands in for the remote server in local runs and tests. Its connection
//! state can be driven by hand to exercise not-ready and broken-connection
//! paths of the client.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::watch;

use crate::cache::{CacheError, ConnectionState, KeyValueStore};

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Memory-backed store.
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
    state: watch::Sender<ConnectionState>,
}

impl MemoryStore {
    /// Create a store that is already connected.
    pub fn new() -> Self {
        Self::with_state(ConnectionState::Connected)
    }

    /// Create a store whose connection has not finished negotiating.
    pub fn pending() -> Self {
        Self::with_state(ConnectionState::Connecting)
    }

    fn with_state(state: ConnectionState) -> Self {
        let (state, _) = watch::channel(state);
        Self {
            entries: DashMap::new(),
            state,
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Finish the simulated negotiation.
    pub fn mark_connected(&self) {
        self.set_state(ConnectionState::Connected);
    }

    /// Simulate the peer dropping the connection.
    pub fn break_connection(&self) {
        self.set_state(ConnectionState::Disconnected);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set_state(&self, next: ConnectionState) {
        self.state.send_if_modified(|current| {
            if *current == ConnectionState::Closed || *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    fn ensure_connected(&self) -> Result<(), CacheError> {
        match self.state().unavailable_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    async fn wait_until_connected(&self, timeout: Duration) -> bool {
        let mut rx = self.state.subscribe();
        let settled = rx.wait_for(|state| {
            matches!(state, ConnectionState::Connected | ConnectionState::Closed)
        });

        match tokio::time::timeout(timeout, settled).await {
            Ok(Ok(state)) => *state == ConnectionState::Connected,
            _ => false,
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.ensure_connected()?;

        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<(), CacheError> {
        self.ensure_connected()?;

        if seconds == 0 {
            return Err(CacheError::Store(
                "invalid expire time in 'setex' command".to_string(),
            ));
        }

        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(seconds),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<u64, CacheError> {
        self.ensure_connected()?;

        let now = Instant::now();
        match self.entries.remove(key) {
            Some((_, entry)) if !entry.is_expired(now) => Ok(1),
            _ => Ok(0),
        }
    }

    async fn close(&self) {
        self.state.send_replace(ConnectionState::Closed);
        self.entries.clear();
    }
}
