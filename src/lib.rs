//! kvgate library
//!
//! A small facade over a remote key-value store with expiring entries,
//! plus the configuration and logging plumbing used by the `kvgate` binary.

use shadow_rs::shadow;
shadow!(build);

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod logger;

pub use cache::CacheClient;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}
