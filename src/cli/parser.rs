//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line client for a Redis-backed key-value cache
#[derive(Parser, Debug)]
#[command(name = "kvgate")]
#[command(about = "Command-line client for a Redis-backed key-value cache")]
#[command(long_about = "
kvgate talks to a Redis server (or an in-process store) through a small cache
facade offering four operations: liveness check, get, set with expiration and
delete.

EXAMPLES:
    # Check whether the server is reachable
    kvgate ping --wait 5

    # Store a value for 60 seconds
    kvgate set session:42 user-7 --ttl 60

    # Read it back
    kvgate get session:42

    # Remove it
    kvgate del session:42

    # Use a specific configuration file and verbose logging
    kvgate --config /etc/kvgate/production.toml --verbose ping

    # Validate configuration without connecting
    kvgate check-config
")]
#[command(version = crate::build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Load a single TOML file instead of the layered `config/` directory.
    /// The file must exist and be readable.
    #[arg(short, long, value_name = "FILE", global = true, value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` is layered over `default.toml`.
    /// Falls back to `KVGATE_APP_ENV`, then `development`.
    #[arg(short, long, value_enum, global = true)]
    pub env: Option<Environment>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Report whether the cache server connection is alive
    ///
    /// Prints `alive` or `not alive`. Exits non-zero when not alive.
    Ping {
        /// Seconds to wait for the initial connection
        #[arg(long, value_name = "SECS", default_value = "5", value_parser = super::validation::validate_wait_seconds)]
        wait: u64,
    },

    /// Print the value stored under KEY, or `(nil)` when absent
    Get {
        #[arg(value_parser = super::validation::validate_key)]
        key: String,
    },

    /// Store VALUE under KEY with an expiration
    Set {
        #[arg(value_parser = super::validation::validate_key)]
        key: String,

        value: String,

        /// Expiration in seconds
        #[arg(short, long, value_name = "SECS", value_parser = super::validation::validate_ttl)]
        ttl: u64,
    },

    /// Remove KEY; removing a missing key succeeds
    #[command(alias = "delete")]
    Del {
        #[arg(value_parser = super::validation::validate_key)]
        key: String,
    },

    /// Validate configuration and exit without connecting
    CheckConfig,
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

impl Cli {
    /// Log level implied by `--verbose` / `--quiet`, if any
    pub fn log_level_override(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }

    /// Whether the command needs a live store connection
    pub fn needs_connection(&self) -> bool {
        !matches!(self.command, Commands::CheckConfig)
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}
