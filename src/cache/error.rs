//! Cache error types.

use redis::RedisError;
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The connection has not finished its initial negotiation yet.
    #[error("Cache connection not ready")]
    NotReady,

    /// The client was closed by its owner.
    #[error("Cache connection closed")]
    Closed,

    /// Network-level failure while talking to the store.
    #[error("Cache transport failed: {0}")]
    Transport(String),

    /// The store rejected the command.
    #[error("Cache store error: {0}")]
    Store(String),

    #[error("Cache configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// Whether this error means the connection handle is unusable.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            CacheError::NotReady | CacheError::Closed | CacheError::Transport(_)
        )
    }
}

impl From<RedisError> for CacheError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error()
            || err.is_timeout()
            || err.is_connection_dropped()
        {
            CacheError::Transport(err.to_string())
        } else {
            CacheError::Store(err.to_string())
        }
    }
}
