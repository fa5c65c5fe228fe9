//! Failure reporting for cache operations.

use std::fmt;

use tracing::Level;

use crate::cache::CacheError;

/// Cache operation kinds, used when reporting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOp {
    Get,
    Set,
    Delete,
}

impl CacheOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOp::Get => "get",
            CacheOp::Set => "set",
            CacheOp::Delete => "delete",
        }
    }
}

impl fmt::Display for CacheOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives every failure absorbed by the cache client.
pub trait CacheObserver: Send + Sync {
    fn on_failure(&self, op: CacheOp, key: &str, error: &CacheError);
}

/// Lost sessions are already logged by the store when they drop, so
/// connection errors on individual requests are only warnings.
fn level_for(error: &CacheError) -> Level {
    if error.is_connection_error() {
        Level::WARN
    } else {
        Level::ERROR
    }
}

/// Observer that logs failures through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CacheObserver for TracingObserver {
    fn on_failure(&self, op: CacheOp, key: &str, error: &CacheError) {
        if level_for(error) == Level::WARN {
            tracing::warn!(op = %op, key, "Cache unavailable: {}", error);
        } else {
            tracing::error!(op = %op, key, "Cache operation failed: {}", error);
        }
    }
}
