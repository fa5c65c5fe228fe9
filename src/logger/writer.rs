//! File writer for the logger

use crate::logger::config::FileConfig;
use crate::logger::error::LoggerError;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Error recovery strategy for handling write failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Fallback to console output when file write fails
    FallbackToConsole,
    /// Silently drop the log message
    SilentDrop,
}

/// Log file writer shared by every event the subscriber formats
pub struct LogFileWriter {
    state: Arc<Mutex<WriterState>>,
    recovery_strategy: RecoveryStrategy,
}

struct WriterState {
    file: BufWriter<File>,
    /// Writing to stderr after a file failure
    fallback_mode: bool,
}

impl LogFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        Self::with_recovery(config, RecoveryStrategy::FallbackToConsole)
    }

    pub fn with_recovery(
        config: &FileConfig,
        recovery_strategy: RecoveryStrategy,
    ) -> Result<Self, LoggerError> {
        if !config.enabled {
            return Err(LoggerError::config("file output is disabled"));
        }

        if let Some(parent) = config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = open_log_file(&config.path, config.append)?;

        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                file,
                fallback_mode: false,
            })),
            recovery_strategy,
        })
    }

    /// Check if the writer is currently in fallback mode
    pub fn is_in_fallback_mode(&self) -> bool {
        self.state
            .lock()
            .map(|s| s.fallback_mode)
            .unwrap_or(false)
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriterGuard {
            state: self.state.clone(),
            recovery_strategy: self.recovery_strategy,
        }
    }
}

/// Per-event handle to the shared log file
pub struct LogWriterGuard {
    state: Arc<Mutex<WriterState>>,
    recovery_strategy: RecoveryStrategy,
}

impl Write for LogWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;

        if state.fallback_mode {
            return io::stderr().write(buf);
        }

        match state.file.write(buf) {
            Ok(written) => Ok(written),
            Err(e) => match self.recovery_strategy {
                RecoveryStrategy::FallbackToConsole => {
                    state.fallback_mode = true;
                    eprintln!("[Logger] File write failed, falling back to stderr: {}", e);
                    io::stderr().write(buf)
                }
                RecoveryStrategy::SilentDrop => Ok(buf.len()),
            },
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;

        if state.fallback_mode {
            return io::stderr().flush();
        }

        state.file.flush()
    }
}

impl Drop for LogWriterGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            let _ = state.file.flush();
        }
    }
}

fn open_log_file(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}
