//! Tracing subscriber setup.
//!
//! Long-running commands (`serve`, `export`) log JSON lines to the console and
//! write the same records to `<log_dir>/app.<date>.log`, rotated daily with the
//! newest [`MAX_LOG_FILES`] kept. One-shot query commands only print warnings
//! to stderr so their stdout stays clean.
//!
//! `RUST_LOG` always wins over the built-in filters.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing_appender::rolling::{self, InitError, RollingFileAppender, Rotation};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("logging already initialized: {0}")]
    Init(#[from] TryInitError),
    #[error("failed to open log file: {0}")]
    Appender(#[from] InitError),
}

pub const LOG_FILE_PREFIX: &str = "app";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const MAX_LOG_FILES: usize = 12;

/// Built-in filter when `RUST_LOG` is unset.
pub fn default_filter(settings: &Settings) -> &'static str {
    if settings.is_dev() {
        "museum_exhibits=debug,tower_http=debug,info"
    } else {
        "info"
    }
}

/// JSON logging to the console and to the rotated files in `log_dir`.
pub fn init(settings: &Settings) -> Result<(), LoggingError> {
    let file = log_appender(&settings.log_dir)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(settings)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .with(fmt::layer().json().with_ansi(false).with_writer(file))
        .try_init()?;
    Ok(())
}

/// Compact warnings-only logging to stderr.
pub fn init_console() -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

fn log_appender(log_dir: &Path) -> Result<RollingFileAppender, LoggingError> {
    fs::create_dir_all(log_dir)?;
    let appender = rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)?;
    Ok(appender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn dev_stage_logs_crate_at_debug() {
        let dev = Settings::default();
        assert!(default_filter(&dev).contains("museum_exhibits=debug"));

        let prod = Settings {
            stage: "prod".into(),
            ..Settings::default()
        };
        assert_eq!(default_filter(&prod), "info");
    }

    #[test]
    fn log_file_is_dated_and_appended() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested/logs");

        writeln!(log_appender(&dir).unwrap(), "first").unwrap();
        writeln!(log_appender(&dir).unwrap(), "second").unwrap();

        let files: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("app."), "{name}");
        assert!(name.ends_with(".log"), "{name}");
        assert_eq!(fs::read_to_string(&files[0]).unwrap(), "first\nsecond\n");
    }
}
