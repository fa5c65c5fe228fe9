//! CLI module for kvgate
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration loading driven by `--config` and `--env`
//! - Command handlers for the cache operations

pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use executor::{execute_command, execute_command_with_output};
pub use parser::{Cli, Commands, Environment};

use crate::config::settings::Settings;
use crate::config::{ConfigError, ConfigLoader, Environment as AppEnvironment};
use crate::logger::init_logger;

/// Load configuration for the parsed CLI arguments
///
/// `--config` selects a single file; otherwise the layered loader is used
/// (`KVGATE_CONFIG_DIR` / `KVGATE_CONFIG_FILE`). `--env` overrides
/// `KVGATE_APP_ENV`.
///
/// # Returns
/// Validated settings and the environment they were loaded for
pub fn load_config(cli: &Cli) -> Result<(Settings, AppEnvironment), ConfigError> {
    let environment = AppEnvironment::resolve(cli.env.map(Into::into));

    let loader = match &cli.config {
        Some(path) => ConfigLoader::from_file(path),
        None => ConfigLoader::new()?,
    }
    .with_environment(environment);

    let settings = loader.load()?;
    Ok((settings, environment))
}

/// Initialize logger from settings
///
/// `--verbose` and `--quiet` replace the configured level.
pub fn init_logger_from_settings(settings: &Settings, cli: &Cli) -> anyhow::Result<()> {
    let mut logger_config = settings.logger.clone().into_logger_config()?;

    if let Some(level) = cli.log_level_override() {
        logger_config = logger_config.with_level(level);
    }

    init_logger(logger_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kvgate.toml");
        std::fs::write(
            &path,
            "[cache]\nbackend = \"memory\"\nkey_prefix = \"app\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "kvgate",
            "--config",
            path.to_str().unwrap(),
            "--env",
            "staging",
            "check-config",
        ])
        .unwrap();

        let (settings, environment) = load_config(&cli).unwrap();
        assert_eq!(environment, AppEnvironment::Staging);
        assert_eq!(settings.cache.key_prefix, "app");
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kvgate.toml");
        std::fs::write(&path, "[cache]\nkey_prefix = \"has space\"\n").unwrap();

        let cli = Cli::try_parse_from(["kvgate", "--config", path.to_str().unwrap(), "ping"])
            .unwrap();

        assert!(matches!(
            load_config(&cli),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
