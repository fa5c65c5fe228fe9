//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{CacheConfig, LoggerSettings, RedisConfig, Settings};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// URL schemes understood by the redis client
const VALID_REDIS_SCHEMES: &[&str] = &["redis://", "rediss://", "redis+unix://", "unix://"];

impl RedisConfig {
    /// Validate Redis configuration
    ///
    /// # Validation Rules
    /// - URL must not be empty
    /// - URL must use a scheme the redis client supports
    /// - Connection timeout must be greater than 0
    /// - Health check interval must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::validation(
                "cache.redis.url",
                "Redis URL is required. Example: redis://127.0.0.1:6379",
            ));
        }

        if !VALID_REDIS_SCHEMES
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
        {
            return Err(ConfigError::validation(
                "cache.redis.url".to_string(),
                format!(
                    "Invalid Redis URL '{}'. Expected one of: {}",
                    self.url,
                    VALID_REDIS_SCHEMES.join(", ")
                ),
            ));
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "cache.redis.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        if self.health_check_interval == 0 {
            return Err(ConfigError::validation(
                "cache.redis.health_check_interval",
                "Health check interval must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl CacheConfig {
    /// Validate cache configuration
    ///
    /// Redis settings are only checked when Redis is the selected backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::validation(
                "cache.key_prefix",
                "Key prefix must not contain whitespace.",
            ));
        }

        match self.backend {
            crate::config::settings::CacheBackend::Redis => self.redis.validate(),
            crate::config::settings::CacheBackend::Memory => Ok(()),
        }
    }
}

impl LoggerSettings {
    /// Validate logger configuration
    ///
    /// # Validation Rules
    /// - Level must be one of trace, debug, info, warn, error
    /// - At least one output must be enabled
    /// - File format must be known and file path non-empty when file output is on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level".to_string(),
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.parse_format()?;

        if self.file.enabled && self.file.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "Log file path cannot be empty when file output is enabled.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate the complete configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logger.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::CacheBackend;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_redis_url_schemes() {
        for url in [
            "redis://127.0.0.1:6379",
            "rediss://secure:6380",
            "unix:///tmp/redis.sock",
            "redis+unix:///tmp/redis.sock",
        ] {
            let config = RedisConfig {
                url: url.to_string(),
                ..RedisConfig::default()
            };
            assert!(config.validate().is_ok(), "{} should be valid", url);
        }
    }

    #[test]
    fn test_redis_url_invalid() {
        let config = RedisConfig {
            url: "http://127.0.0.1:6379".to_string(),
            ..RedisConfig::default()
        };
        match config.validate() {
            Err(ConfigError::ValidationError { field, .. }) => assert_eq!(field, "cache.redis.url"),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_redis_url_empty() {
        let config = RedisConfig {
            url: "  ".to_string(),
            ..RedisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redis_zero_timeout() {
        let config = RedisConfig {
            connection_timeout: 0,
            ..RedisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redis_zero_health_check_interval() {
        let config = RedisConfig {
            health_check_interval: 0,
            ..RedisConfig::default()
        };
        match config.validate() {
            Err(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field, "cache.redis.health_check_interval")
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_memory_backend_ignores_redis_settings() {
        let config = CacheConfig {
            backend: CacheBackend::Memory,
            redis: RedisConfig {
                url: String::new(),
                connection_timeout: 0,
                health_check_interval: 0,
            },
            ..CacheConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_key_prefix_with_whitespace() {
        let config = CacheConfig {
            key_prefix: "my app".to_string(),
            ..CacheConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logger_invalid_level() {
        let mut settings = Settings::default();
        settings.logger.level = "verbose".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_logger_file_enabled_empty_path() {
        let mut settings = Settings::default();
        settings.logger.file.enabled = true;
        settings.logger.file.path = String::new();
        assert!(settings.validate().is_err());
    }
}
