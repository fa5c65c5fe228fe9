//! Configuration management module for kvgate
//!
//! This module provides layered configuration loading with support for:
//! - TOML configuration files
//! - Environment variable overrides
//! - Multiple environment configurations (development, test, staging, production)
//!
//! # Configuration Priority (lowest to highest)
//! 1. Built-in defaults (local Redis on `redis://127.0.0.1:6379`)
//! 2. `default.toml` - Base configuration
//! 3. `{environment}.toml` - Environment-specific configuration
//! 4. `local.toml` - Local overrides (not committed to version control)
//! 5. `KVGATE_*` environment variables

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

// Re-export public types
pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{CacheBackend, CacheConfig, LoggerSettings, RedisConfig, Settings};
