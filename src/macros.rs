//! Logging macros with `format!` arguments and call-site location.
//!
//! Every macro takes a [`NamedLogger`](crate::NamedLogger) (or anything with
//! the same `name`/`is_enabled_for`/`log_record` methods) and records the file,
//! line and module of the call, so `{filename}`, `{lineno}` and `{module}`
//! resolve in templates. Arguments are not formatted when the level is off.
//!
//! # Examples
//!
//! ```
//! use tomlog::{info, LogLevel, NamedLogger, RootLogger};
//! use std::sync::Arc;
//!
//! let logger = NamedLogger::new("app", Arc::new(RootLogger::new(LogLevel::Info)));
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message at an explicit level.
///
/// ```
/// # use tomlog::{LogLevel, NamedLogger, RootLogger};
/// # let logger = NamedLogger::new("app", std::sync::Arc::new(RootLogger::default()));
/// use tomlog::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let level = $level;
        let logger = &$logger;
        if logger.is_enabled_for(level) {
            logger.log_record(
                $crate::LogRecord::new(logger.name(), level, format!($($arg)+))
                    .with_location(file!(), line!(), module_path!()),
            );
        }
    }};
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
///
/// ```
/// # use tomlog::{LogLevel, NamedLogger, RootLogger};
/// # let logger = NamedLogger::new("app", std::sync::Arc::new(RootLogger::default()));
/// use tomlog::critical;
/// critical!(logger, "System failure: {}", "out of memory");
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}
