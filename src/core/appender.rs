//! Appender trait for log output destinations

use super::{error::Result, log_level::LogLevel, log_record::LogRecord};

/// A sink: one output destination with its own formatter and threshold.
///
/// Appenders do not filter; [`RootLogger`](super::RootLogger) compares the
/// record level with [`Appender::min_level`] before calling `append`, so a
/// forced write can bypass the threshold.
pub trait Appender: Send + Sync {
    fn append(&mut self, record: &LogRecord) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
    fn min_level(&self) -> LogLevel;

    /// Console sinks receive last-resort writes when another sink fails
    fn is_console(&self) -> bool {
        false
    }
}
