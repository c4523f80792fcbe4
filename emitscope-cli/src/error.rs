//! CLI error type.

use std::fmt;

use emitscope::config::ConfigError;
use emitscope::logging::LoggingError;
use emitscope::source::SourceError;
use emitscope::InventoryError;

/// Errors surfaced to the user by a command.
#[derive(Debug)]
pub enum CliError {
    /// Bad configuration or command-line input.
    Config(String),
    /// The inventory request failed.
    Inventory(InventoryError),
    /// The HTTP client could not be built.
    Client(SourceError),
    Logging(LoggingError),
    Io(std::io::Error),
    Output(serde_json::Error),
    Runtime(String),
}

impl CliError {
    /// Process exit code.
    ///
    /// Inventory failures map their status class: input errors exit 2,
    /// missing regions 3, upstream failures 4, cancellation 130.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::Inventory(e) => match e.status_code() {
                400 => 2,
                404 => 3,
                499 => 130,
                _ => 4,
            },
            CliError::Client(_) => 4,
            CliError::Logging(_)
            | CliError::Io(_)
            | CliError::Output(_)
            | CliError::Runtime(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::Inventory(e) => write!(f, "{} (status {})", e, e.status_code()),
            CliError::Client(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Inventory(e) => Some(e),
            CliError::Client(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::Config(_) | CliError::Runtime(_) => None,
        }
    }
}

impl From<InventoryError> for CliError {
    fn from(err: InventoryError) -> Self {
        CliError::Inventory(err)
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other.to_string()),
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(err: LoggingError) -> Self {
        CliError::Logging(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emitscope::query::QueryError;

    #[test]
    fn test_exit_codes_follow_status_class() {
        let invalid = CliError::from(InventoryError::InvalidQuery(QueryError::MissingRegion));
        assert_eq!(invalid.exit_code(), 2);

        let missing = CliError::from(InventoryError::RegionNotFound("Atlantis".into()));
        assert_eq!(missing.exit_code(), 3);

        let upstream = CliError::from(InventoryError::Upstream(SourceError::Transport(
            "connection reset".into(),
        )));
        assert_eq!(upstream.exit_code(), 4);

        assert_eq!(CliError::from(InventoryError::Cancelled).exit_code(), 130);
        assert_eq!(CliError::Config("bad".into()).exit_code(), 2);
    }

    #[test]
    fn test_display_includes_status() {
        let err = CliError::from(InventoryError::RegionNotFound("Atlantis".into()));
        assert_eq!(err.to_string(), "Region not found: Atlantis (status 404)");
    }

    #[test]
    fn test_config_io_error_kept_as_io() {
        let err = CliError::from(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        )));
        assert!(matches!(err, CliError::Io(_)));
    }
}
