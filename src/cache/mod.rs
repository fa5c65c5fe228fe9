//! Cache client for a remote key-value store with expiring entries.
//!
//! [`CacheClient`] exposes four operations over a single connection handle:
//! `is_alive`, `get`, `set` (with an expiration in seconds) and `delete`.
//! Storage, expiration and the wire protocol belong to the store; the client
//! only translates replies and failures into plain results.
//!
//! Two stores are available:
//! - Redis (`GET`, `SETEX`, `DEL` over one multiplexed connection)
//! - Memory (in-process, for local runs and tests)
//!
//! # Configuration
//!
//! ```toml
//! [cache]
//! backend = "redis"  # or "memory"
//! key_prefix = ""
//!
//! [cache.redis]
//! url = "redis://127.0.0.1:6379"
//! connection_timeout = 5
//! health_check_interval = 10
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let cache = CacheClient::open(&settings.cache)?;
//! cache.wait_until_alive(Duration::from_secs(5)).await;
//!
//! cache.set("session:42", "user-7", 2).await?;
//! assert_eq!(cache.get("session:42").await.as_deref(), Some("user-7"));
//! cache.delete("session:42").await?;
//! ```

mod client;
mod error;
mod memory;
mod observer;
mod redis;
mod traits;

pub use client::CacheClient;
pub use error::CacheError;
pub use memory::MemoryStore;
pub use observer::{CacheObserver, CacheOp, TracingObserver};
pub use redis::RedisStore;
pub use traits::{ConnectionState, KeyValueStore};

// Re-export config types
pub use crate::config::settings::{CacheBackend, CacheConfig, RedisConfig};
