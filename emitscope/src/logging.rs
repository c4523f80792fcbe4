//! Logging setup.
//!
//! Events go to stderr, and optionally to a file through a non-blocking
//! `tracing-appender` writer. `RUST_LOG` overrides the configured level.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub use tracing_appender::non_blocking::WorkerGuard;

/// Errors installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{0}': {1}")]
    InvalidFilter(String, String),

    #[error("Failed to open log file {0}: {1}")]
    File(PathBuf, std::io::Error),

    #[error("Failed to install logger: {0}")]
    Init(String),
}

/// What to log and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `emitscope=debug`.
    pub level: String,
    pub file: Option<PathBuf>,
    pub ansi: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            ansi: true,
        }
    }
}

impl LoggingOptions {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }
}

/// Build the filter from `RUST_LOG`, falling back to `level`.
pub fn build_filter(level: &str, env: Option<&str>) -> Result<EnvFilter, LoggingError> {
    let directive = env.filter(|e| !e.trim().is_empty()).unwrap_or(level);
    EnvFilter::try_new(directive)
        .map_err(|e| LoggingError::InvalidFilter(directive.to_string(), e.to_string()))
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for the life of the program when logging
/// to a file; dropping it flushes and stops the background writer.
pub fn init(options: &LoggingOptions) -> Result<Option<WorkerGuard>, LoggingError> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(&options.level, env.as_deref())?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(options.ansi)
        .with_target(false);

    let (file_layer, guard) = match &options.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(guard)
}

fn file_writer(
    path: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard), LoggingError> {
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        LoggingError::File(
            path.to_path_buf(),
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
        )
    })?;

    std::fs::create_dir_all(directory).map_err(|e| LoggingError::File(path.to_path_buf(), e))?;
    let appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_level() {
        let filter = build_filter("info", Some("emitscope=trace")).unwrap();
        assert_eq!(filter.to_string(), "emitscope=trace");
    }

    #[test]
    fn test_blank_env_ignored() {
        let filter = build_filter("warn", Some("  ")).unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn test_invalid_filter() {
        let err = build_filter("emitscope=loud", None).unwrap_err();
        assert!(matches!(err, LoggingError::InvalidFilter(ref d, _) if d == "emitscope=loud"));
    }

    #[test]
    fn test_options_builders() {
        let options = LoggingOptions::default()
            .with_level("debug")
            .with_file(Some(PathBuf::from("/tmp/emitscope.log")))
            .with_ansi(false);
        assert_eq!(options.level, "debug");
        assert!(!options.ansi);
        assert!(options.file.is_some());
    }

    #[test]
    fn test_file_writer_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("emitscope.log");
        let (_writer, _guard) = file_writer(&path).unwrap();
        assert!(dir.path().join("logs").is_dir());
    }
}
