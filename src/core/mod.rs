//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod error;
pub mod exception;
pub mod log_context;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod timestamp;

pub use appender::Appender;
pub use config::{
    ColoredFormatterSection, ConsoleHandlerConfig, DefaultFormatterSection, FileHandlerConfig,
    HandlersConfig, JsonFormatterSection, LogConfig, DEFAULT_LOG_FILE,
};
pub use error::{LoggerError, Result};
pub use exception::ErrorContext;
pub use log_context::{FieldValue, LogContext};
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use logger::{NamedLogger, RootLogger, ROOT_LOGGER_NAME};
pub use metrics::LoggerMetrics;
pub use timestamp::{parse_timezone, ZonedTimestamp, DEFAULT_TIMEZONE};
