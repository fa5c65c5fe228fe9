//! Cache command handler
//!
//! Runs `ping`, `get`, `set` and `del` against a [`CacheClient`] and prints
//! a redis-cli style reply.

use std::io::Write;
use std::time::Duration;

use anyhow::Context;

use crate::cache::CacheClient;
use crate::error::{AppError, AppResult};

/// Handler for the key-value subcommands
pub struct CacheCommandHandler {
    client: CacheClient,
    connect_timeout: Duration,
}

impl CacheCommandHandler {
    /// Create a handler that waits up to `connect_timeout` for the store
    /// before running a data command
    pub fn new(client: CacheClient, connect_timeout: Duration) -> Self {
        Self {
            client,
            connect_timeout,
        }
    }

    /// Print `alive` or `not alive`
    ///
    /// Waits up to `wait_secs` for the initial connection. A dead connection
    /// is reported as [`AppError::Unreachable`] after the line is printed.
    pub async fn ping(&self, wait_secs: u64, out: &mut impl Write) -> AppResult<()> {
        if wait_secs > 0 {
            self.client
                .wait_until_alive(Duration::from_secs(wait_secs))
                .await;
        }

        if self.client.is_alive() {
            writeln!(out, "alive").context("Failed to write reply")?;
            Ok(())
        } else {
            writeln!(out, "not alive").context("Failed to write reply")?;
            Err(AppError::Unreachable {
                timeout_secs: wait_secs,
            })
        }
    }

    /// Print the value under `key`, or `(nil)`
    pub async fn get(&self, key: &str, out: &mut impl Write) -> AppResult<()> {
        self.ensure_connected().await?;

        match self.client.try_get(key).await? {
            Some(value) => writeln!(out, "{}", value),
            None => writeln!(out, "(nil)"),
        }
        .context("Failed to write reply")?;
        Ok(())
    }

    pub async fn set(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
        out: &mut impl Write,
    ) -> AppResult<()> {
        self.ensure_connected().await?;

        self.client.set(key, value, ttl_secs).await?;
        writeln!(out, "OK").context("Failed to write reply")?;
        Ok(())
    }

    pub async fn del(&self, key: &str, out: &mut impl Write) -> AppResult<()> {
        self.ensure_connected().await?;

        self.client.delete(key).await?;
        writeln!(out, "OK").context("Failed to write reply")?;
        Ok(())
    }

    /// Release the connection handle
    pub async fn shutdown(&self) {
        self.client.close().await;
    }

    async fn ensure_connected(&self) -> AppResult<()> {
        if self.client.wait_until_alive(self.connect_timeout).await {
            return Ok(());
        }

        tracing::debug!(state = %self.client.state(), "Cache store not reachable");
        Err(AppError::Unreachable {
            timeout_secs: self.connect_timeout.as_secs(),
        })
    }
}
