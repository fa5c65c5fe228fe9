//! CLI argument validation functions
//!
//! Custom value parsers for arguments clap cannot check on its own.

use std::fs;
use std::path::PathBuf;

/// Upper bound on `--ttl`, matching what Redis accepts for `SETEX`
const MAX_TTL_SECONDS: u64 = i64::MAX as u64 / 1000;

/// Upper bound on `ping --wait`
const MAX_WAIT_SECONDS: u64 = 300;

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!(
            "Cannot read configuration file '{}': {}",
            path_str, e
        )),
    }
}

/// Validate a cache key is non-empty
pub fn validate_key(key: &str) -> Result<String, String> {
    if key.is_empty() {
        return Err("Key cannot be empty".to_string());
    }
    Ok(key.to_string())
}

/// Validate an expiration is a positive number of seconds
pub fn validate_ttl(ttl_str: &str) -> Result<u64, String> {
    let ttl: u64 = ttl_str.parse().map_err(|_| {
        format!(
            "TTL must be a positive number of seconds, got: '{}'",
            ttl_str
        )
    })?;

    if ttl == 0 {
        return Err("TTL must be greater than 0 seconds".to_string());
    }

    if ttl > MAX_TTL_SECONDS {
        return Err(format!("TTL cannot exceed {} seconds", MAX_TTL_SECONDS));
    }

    Ok(ttl)
}

/// Validate the `ping --wait` duration
pub fn validate_wait_seconds(wait_str: &str) -> Result<u64, String> {
    let wait: u64 = wait_str
        .parse()
        .map_err(|_| format!("Wait must be a number of seconds, got: '{}'", wait_str))?;

    if wait > MAX_WAIT_SECONDS {
        return Err(format!("Wait cannot exceed {} seconds", MAX_WAIT_SECONDS));
    }

    Ok(wait)
}
