//! KeyValueStore trait definition.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::CacheError;

/// Lifecycle state of a store's connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Initial negotiation still in progress.
    Connecting,
    Connected,
    /// The connection failed or was dropped; stores may be reconnecting.
    Disconnected,
    /// Closed by the owner.
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Closed => "closed",
        }
    }

    /// Error reported for operations issued while in this state.
    ///
    /// Returns `None` when the state permits issuing requests.
    pub fn unavailable_error(&self) -> Option<CacheError> {
        match self {
            ConnectionState::Connected => None,
            ConnectionState::Connecting => Some(CacheError::NotReady),
            ConnectionState::Disconnected => Some(CacheError::Transport(
                "connection to the store is down".to_string(),
            )),
            ConnectionState::Closed => Some(CacheError::Closed),
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for the remote key-value store behind the cache client.
///
/// Implementations own the connection handle. Values are text and every
/// operation is a single attempt.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Current connection state. Must not perform I/O.
    fn state(&self) -> ConnectionState;

    /// Wait until a session is up or the store is closed.
    ///
    /// Returns `true` when connected before `timeout` elapsed. A store that
    /// is reconnecting keeps waiting.
    async fn wait_until_connected(&self, timeout: Duration) -> bool;

    /// Get a value; `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Set a value expiring `seconds` after the store accepts it.
    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<(), CacheError>;

    /// Remove a key, returning how many keys were removed.
    async fn del(&self, key: &str) -> Result<u64, CacheError>;

    /// Tear down the connection handle.
    async fn close(&self);
}
