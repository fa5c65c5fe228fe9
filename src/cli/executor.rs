//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use std::io::Write;
use std::time::Duration;

use super::handlers::{CacheCommandHandler, CheckConfigHandler};
use super::parser::{Cli, Commands};
use crate::cache::CacheClient;
use crate::config::Environment;
use crate::config::settings::Settings;
use crate::error::AppResult;

/// Execute a CLI command with the given settings, replying on stdout
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
) -> AppResult<()> {
    execute_command_with_output(cli, settings, environment, &mut std::io::stdout()).await
}

/// Execute a CLI command, writing replies to `out`
///
/// The cache connection is closed before returning, whatever the outcome.
pub async fn execute_command_with_output(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
    out: &mut impl Write,
) -> AppResult<()> {
    if !cli.needs_connection() {
        return CheckConfigHandler::new(settings, environment).execute(out);
    }

    let connect_timeout = Duration::from_secs(settings.cache.redis.connection_timeout);
    let client = CacheClient::open(&settings.cache)?;
    let handler = CacheCommandHandler::new(client, connect_timeout);

    tracing::debug!(command = ?cli.command, "Executing cache command");

    let result = match &cli.command {
        Commands::Ping { wait } => handler.ping(*wait, out).await,
        Commands::Get { key } => handler.get(key, out).await,
        Commands::Set { key, value, ttl } => handler.set(key, value, *ttl, out).await,
        Commands::Del { key } => handler.del(key, out).await,
        Commands::CheckConfig => Ok(()),
    };

    handler.shutdown().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::CacheBackend;
    use crate::error::AppError;
    use clap::Parser;

    fn memory_settings() -> Settings {
        let mut config = Settings::default();
        config.cache.backend = CacheBackend::Memory;
        config
    }

    async fn run(args: &[&str], settings: Settings) -> (AppResult<()>, String) {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut out = Vec::new();
        let result =
            execute_command_with_output(&cli, settings, Environment::Test, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_execute_check_config() {
        let (result, out) = run(&["kvgate", "check-config"], Settings::default()).await;
        assert!(result.is_ok());
        assert!(out.starts_with("✓ Configuration is valid (test)"));
    }

    #[tokio::test]
    async fn test_execute_ping_memory_backend() {
        let (result, out) = run(&["kvgate", "ping", "--wait", "0"], memory_settings()).await;
        assert!(result.is_ok());
        assert_eq!(out, "alive\n");
    }

    #[tokio::test]
    async fn test_execute_set() {
        let (result, out) = run(
            &["kvgate", "set", "session:42", "user-7", "--ttl", "2"],
            memory_settings(),
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(out, "OK\n");
    }

    #[tokio::test]
    async fn test_execute_get_on_fresh_store() {
        let (result, out) = run(&["kvgate", "get", "session:42"], memory_settings()).await;
        assert!(result.is_ok());
        assert_eq!(out, "(nil)\n");
    }

    #[tokio::test]
    async fn test_execute_against_unreachable_redis() {
        let mut settings = Settings::default();
        settings.cache.redis.url = "redis://127.0.0.1:1".to_string();
        settings.cache.redis.connection_timeout = 1;

        let (result, out) = run(&["kvgate", "ping", "--wait", "1"], settings).await;
        assert!(matches!(result, Err(AppError::Unreachable { .. })));
        assert_eq!(out, "not alive\n");
    }
}
