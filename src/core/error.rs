//! Error types for the logging pipeline

use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Configuration file missing, unreadable, malformed or lacking the `log` table
    #[error("Cannot load logging configuration '{}': {message}", path.display())]
    ConfigLoad {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Unknown IANA timezone name
    #[error("Invalid timezone '{name}': {message}")]
    InvalidTimezone { name: String, message: String },

    /// Log directory could not be created
    #[error("Cannot create log directory '{}': {source}", path.display())]
    LogDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A formatter section is absent or malformed
    #[error("Formatter configuration error in [{section}]: {message}")]
    FormatterConfig { section: String, message: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// File appender error with path
    #[error("File appender error for '{path}': {message}")]
    FileAppenderError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),
}

impl LoggerError {
    /// Create a configuration load error
    pub fn config_load(
        path: impl AsRef<Path>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        LoggerError::ConfigLoad {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid timezone error
    pub fn invalid_timezone(name: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidTimezone {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a log directory error
    pub fn log_directory(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        LoggerError::LogDirectory {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a formatter configuration error
    pub fn formatter_config(section: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterConfig {
            section: section.into(),
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file appender error
    pub fn file_appender(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileAppenderError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Whether this error is a startup misconfiguration rather than a runtime write failure
    #[must_use]
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            LoggerError::ConfigLoad { .. }
                | LoggerError::InvalidTimezone { .. }
                | LoggerError::LogDirectory { .. }
                | LoggerError::FormatterConfig { .. }
                | LoggerError::InvalidConfiguration { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("file handler", "unsupported encoding");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::invalid_timezone("Mars/Olympus", "unknown zone");
        assert!(matches!(err, LoggerError::InvalidTimezone { .. }));

        let err = LoggerError::file_appender("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileAppenderError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::config_load("/etc/app/logger.toml", "missing [log] table", None);
        assert_eq!(
            err.to_string(),
            "Cannot load logging configuration '/etc/app/logger.toml': missing [log] table"
        );

        let err = LoggerError::file_rotation("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );

        let err = LoggerError::formatter_config("formatters.default", "table is missing");
        assert_eq!(
            err.to_string(),
            "Formatter configuration error in [formatters.default]: table is missing"
        );
    }

    #[test]
    fn test_log_directory_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::log_directory("/root/logs", io_err);

        assert!(matches!(err, LoggerError::LogDirectory { .. }));
        assert!(err.to_string().contains("/root/logs"));
        assert!(err.to_string().contains("access denied"));
        assert!(err.is_startup_error());
    }

    #[test]
    fn test_runtime_errors_are_not_startup_errors() {
        assert!(!LoggerError::writer("closed").is_startup_error());
        assert!(!LoggerError::file_rotation("a.log", "rename failed").is_startup_error());
    }
}
