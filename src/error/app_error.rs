use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigError;

/// Error type for the `kvgate` command-line surface.
///
/// Library callers work with [`CacheError`] directly; this enum adds the
/// configuration and argument failures that only occur at the binary edge.
#[derive(Error, Debug)]
pub enum AppError {
    /// Cache operation or connection failure
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Configuration loading or validation failure
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The store did not become reachable in time
    #[error("Cache server not reachable within {timeout_secs}s")]
    Unreachable { timeout_secs: u64 },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Configuration(_) => 2,
            AppError::Unreachable { .. } => 3,
            AppError::Cache(_) | AppError::Internal { .. } => 1,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_conversion() {
        let err: AppError = CacheError::NotReady.into();
        assert!(matches!(err, AppError::Cache(CacheError::NotReady)));
        assert_eq!(err.to_string(), "Cache error: Cache connection not ready");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: AppError = ConfigError::validation("cache.redis.url", "bad").into();
        assert_eq!(err.to_string(), "Validation error: cache.redis.url - bad");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_unreachable_exit_code() {
        let err = AppError::Unreachable { timeout_secs: 5 };
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("5s"));
    }
}
