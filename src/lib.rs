//! # tomlog
//!
//! A logging pipeline configured from a single TOML file.
//!
//! ## Features
//!
//! - **Timezone-aware timestamps**: IANA zones, strftime `datefmt`
//! - **Three renderers**: plain templates, colored console lines, JSON lines
//! - **Timed rotation**: S/M/H/D/midnight/weekday schedules, backup pruning,
//!   optional gzip compression
//! - **Fault isolation**: a failing sink never stops the others, and a failed
//!   file write falls back to the console
//! - **Thread safe**: one process-wide pipeline, initialized exactly once
//!
//! ## Quick start
//!
//! ```no_run
//! use tomlog::prelude::*;
//!
//! let facade = LoggingFacade::init("config/logger_config.toml").unwrap();
//! let logger = facade.get_logger("app.devices");
//! logger.info("device attached");
//! tomlog::warning!(logger, "disk {}% full", 93);
//! ```

pub mod appenders;
pub mod core;
pub mod facade;
pub mod formatters;
pub mod macros;
pub mod paths;
pub mod pipeline;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, TimedRotatingFileAppender};
    pub use crate::core::{
        Appender, ErrorContext, FieldValue, LogConfig, LogContext, LogLevel, LogRecord,
        LoggerError, LoggerMetrics, NamedLogger, Result, RootLogger,
    };
    pub use crate::facade::LoggingFacade;
    pub use crate::formatters::{Formatter, OutputFormatterFactory, TimestampFormatter};
    pub use crate::paths::ProjectPaths;
    pub use crate::pipeline::LogPipelineBuilder;
}

pub use appenders::{ConsoleAppender, TimedRotatingFileAppender};
pub use core::{
    Appender, ErrorContext, FieldValue, LogConfig, LogContext, LogLevel, LogRecord, LoggerError,
    LoggerMetrics, NamedLogger, Result, RootLogger, ROOT_LOGGER_NAME,
};
pub use facade::LoggingFacade;
pub use formatters::{Formatter, OutputFormatterFactory, TimestampFormatter};
pub use paths::ProjectPaths;
pub use pipeline::LogPipelineBuilder;
