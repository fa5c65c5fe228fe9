//! Tests for the logger module

use crate::logger::config::*;
use crate::logger::error::LoggerError;
use crate::logger::writer::{LogFileWriter, RecoveryStrategy};
use std::io::Write;
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

fn file_config(dir: &TempDir, name: &str, append: bool) -> FileConfig {
    FileConfig {
        enabled: true,
        path: dir.path().join(name),
        append,
        format: LogFormat::Json,
    }
}

#[test]
fn test_writer_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir, "nested/deeper/kvgate.log", true);

    let writer = LogFileWriter::new(&config).expect("writer should open");
    writer.make_writer().write_all(b"hello\n").unwrap();

    assert!(config.path.exists());
    assert!(!writer.is_in_fallback_mode());
}

#[test]
fn test_writer_appends_or_truncates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kvgate.log");
    std::fs::write(&path, "old\n").unwrap();

    {
        let writer = LogFileWriter::new(&file_config(&dir, "kvgate.log", true)).unwrap();
        writer.make_writer().write_all(b"new\n").unwrap();
    }
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\nnew\n");

    {
        let writer = LogFileWriter::new(&file_config(&dir, "kvgate.log", false)).unwrap();
        writer.make_writer().write_all(b"fresh\n").unwrap();
    }
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
}

#[test]
fn test_writer_rejects_disabled_config() {
    let config = FileConfig::default();
    let result = LogFileWriter::with_recovery(&config, RecoveryStrategy::SilentDrop);
    assert!(matches!(result, Err(LoggerError::Config { .. })));
}

#[test]
fn test_writer_fails_on_directory_path() {
    let dir = TempDir::new().unwrap();
    let config = FileConfig {
        enabled: true,
        path: dir.path().to_path_buf(),
        append: true,
        format: LogFormat::Full,
    };
    assert!(matches!(LogFileWriter::new(&config), Err(LoggerError::Io(_))));
}

// Only one subscriber can be installed per process; whichever of these runs
// second gets an "already set" error after its log file has been opened.
#[test]
fn test_init_console_and_json_file() {
    let dir = TempDir::new().unwrap();
    let config = LoggerConfig {
        console: ConsoleConfig::new(true, false),
        file: file_config(&dir, "logs/kvgate.log", false),
        level: "info".to_string(),
    };

    let result = super::init_both(&config, super::build_filter("info"));
    assert!(dir.path().join("logs/kvgate.log").exists());

    if result.is_ok() && std::env::var_os("RUST_LOG").is_none() {
        tracing::error!(target: "kvgate", "json layer wired");
        let contents = std::fs::read_to_string(dir.path().join("logs/kvgate.log")).unwrap();
        assert!(contents.contains("\"message\":\"json layer wired\""));
    }
}

#[test]
fn test_init_console_and_compact_file() {
    let dir = TempDir::new().unwrap();
    let mut file = file_config(&dir, "kvgate.log", true);
    file.format = LogFormat::Compact;
    let config = LoggerConfig {
        console: ConsoleConfig::new(true, false),
        file,
        level: "debug".to_string(),
    };

    let _ = super::init_both(&config, super::build_filter(&config.level));
    assert!(dir.path().join("kvgate.log").exists());
}
