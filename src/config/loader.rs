//! Configuration loader for kvgate
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "KVGATE_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "KVGATE_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "KVGATE";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Where configuration files come from
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigSource {
    /// Layered files in a directory. An explicitly chosen directory must
    /// contain `default.toml`; the implicit `config/` may be absent.
    Directory { path: PathBuf, explicit: bool },
    /// A single file, skipping layered loading
    File(PathBuf),
}

/// Configuration loader that handles layered configuration loading
///
/// Sources, lowest priority first:
/// 1. Built-in defaults
/// 2. `default.toml`
/// 3. `{environment}.toml` (optional)
/// 4. `local.toml` (optional)
/// 5. `KVGATE_*` environment variables
#[derive(Debug)]
pub struct ConfigLoader {
    source: ConfigSource,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `KVGATE_CONFIG_DIR`, `KVGATE_CONFIG_FILE` and
    /// `KVGATE_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `KVGATE_CONFIG_DIR` and `KVGATE_CONFIG_FILE`
    /// are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        let source = match (config_dir, config_file) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::MutualExclusivityError(
                    "KVGATE_CONFIG_DIR and KVGATE_CONFIG_FILE cannot both be set. \
                     Use KVGATE_CONFIG_DIR for layered configuration or \
                     KVGATE_CONFIG_FILE for a single configuration file."
                        .to_string(),
                ));
            }
            (None, Some(file)) => ConfigSource::File(file),
            (Some(dir), None) => ConfigSource::Directory {
                path: dir,
                explicit: true,
            },
            (None, None) => ConfigSource::Directory {
                path: PathBuf::from(DEFAULT_CONFIG_DIR),
                explicit: false,
            },
        };

        Ok(Self {
            source,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Create a loader that reads a single file, e.g. from `--config`
    pub fn from_file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            source: ConfigSource::File(path.into()),
            environment: AppEnvironment::from_env(),
        }
    }

    /// Override the environment used to pick `{environment}.toml`
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Load, deserialize and validate settings from all sources
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        tracing::debug!(environment = %self.environment, "Configuration loaded");
        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match &self.source {
            ConfigSource::File(path) => add_file_source(builder, path, true)?,
            ConfigSource::Directory { path, explicit } => {
                self.build_layered_config(builder, path, *explicit)?
            }
        };

        // KVGATE_CACHE__REDIS__URL -> cache.redis.url
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        );

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
        dir: &Path,
        explicit: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if !explicit && !dir.is_dir() {
            return Ok(builder);
        }

        let builder = add_file_source(builder, &dir.join("default.toml"), explicit)?;
        let builder = add_file_source(
            builder,
            &dir.join(self.environment.config_file_name()),
            false,
        )?;
        add_file_source(builder, &dir.join("local.toml"), false)
    }
}

fn add_file_source(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if required && !path.is_file() {
        return Err(ConfigError::file_not_found(format!(
            "Required configuration file not found: {}",
            path.display()
        )));
    }

    let name = path
        .to_str()
        .ok_or_else(|| ConfigError::ParseError(format!("Non UTF-8 path: {}", path.display())))?;

    Ok(builder.add_source(File::new(name, FileFormat::Toml).required(required)))
}
