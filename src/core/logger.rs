//! Root logger and named loggers
//!
//! The [`RootLogger`] owns the sink list and the overall threshold. Named
//! loggers are cheap handles sharing one root; they only stamp their name on
//! the records they create.

use super::{
    appender::Appender,
    error::Result,
    exception::ErrorContext,
    log_context::LogContext,
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Name of the logger the facade emits through
pub const ROOT_LOGGER_NAME: &str = "root";

pub struct RootLogger {
    min_level: RwLock<LogLevel>,
    appenders: RwLock<Vec<Mutex<Box<dyn Appender>>>>,
    metrics: LoggerMetrics,
}

impl RootLogger {
    #[must_use]
    pub fn new(level: LogLevel) -> Self {
        Self {
            min_level: RwLock::new(level),
            appenders: RwLock::new(Vec::new()),
            metrics: LoggerMetrics::new(),
        }
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    #[must_use]
    pub fn level(&self) -> LogLevel {
        *self.min_level.read()
    }

    #[inline]
    #[must_use]
    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    pub fn add_appender(&self, appender: Box<dyn Appender>) {
        self.appenders.write().push(Mutex::new(appender));
    }

    /// Swap the whole sink list in one step, returning the detached sinks.
    ///
    /// Emission holds the read side of the same lock, so no record is ever
    /// split between the old and the new list.
    pub fn replace_appenders(&self, appenders: Vec<Box<dyn Appender>>) -> Vec<Box<dyn Appender>> {
        let incoming: Vec<_> = appenders.into_iter().map(Mutex::new).collect();
        let previous = std::mem::replace(&mut *self.appenders.write(), incoming);
        previous.into_iter().map(Mutex::into_inner).collect()
    }

    /// Detach and drop every sink
    pub fn clear_appenders(&self) {
        let detached = self.replace_appenders(Vec::new());
        drop(detached);
    }

    #[must_use]
    pub fn appender_count(&self) -> usize {
        self.appenders.read().len()
    }

    #[must_use]
    pub fn appender_names(&self) -> Vec<String> {
        self.appenders
            .read()
            .iter()
            .map(|slot| slot.lock().name().to_string())
            .collect()
    }

    /// Dispatch a record to every sink whose threshold it meets.
    ///
    /// Never fails: sink errors and panics are isolated, counted and reported
    /// on stderr. When a non-console sink fails and the console did not
    /// already print the record, the console gets one forced write.
    pub fn log_record(&self, record: &LogRecord) {
        if !self.is_enabled_for(record.level) {
            return;
        }

        let appenders = self.appenders.read();
        let mut console_slot = None;
        let mut console_printed = false;
        let mut sink_failed = false;

        for (idx, slot) in appenders.iter().enumerate() {
            let mut appender = slot.lock();
            let is_console = appender.is_console();
            if is_console && console_slot.is_none() {
                console_slot = Some(idx);
            }
            if record.level < appender.min_level() {
                continue;
            }

            match Self::append_isolated(appender.as_mut(), record) {
                Ok(()) => console_printed |= is_console,
                Err(reason) => {
                    self.metrics.record_write_failure();
                    eprintln!(
                        "[LOGGER ERROR] Appender '{}' (#{}) failed: {}",
                        appender.name(),
                        idx,
                        reason
                    );
                    sink_failed |= !is_console;
                }
            }
        }

        if sink_failed && !console_printed {
            if let Some(slot) = console_slot.and_then(|idx| appenders.get(idx)) {
                let mut console = slot.lock();
                self.metrics.record_fallback();
                if let Err(reason) = Self::append_isolated(console.as_mut(), record) {
                    eprintln!("[LOGGER ERROR] Console fallback write failed: {}", reason);
                }
            }
        }

        self.metrics.record_logged();
    }

    /// Run one append with per-appender panic isolation
    fn append_isolated(
        appender: &mut dyn Appender,
        record: &LogRecord,
    ) -> std::result::Result<(), String> {
        match catch_unwind(AssertUnwindSafe(|| appender.append(record))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(panic_info) => Err(format!("panicked: {}", panic_message(&panic_info))),
        }
    }

    /// Flush every sink, continuing past failures; returns the first error
    pub fn flush(&self) -> Result<()> {
        let appenders = self.appenders.read();
        let mut first_error = None;
        for (idx, slot) in appenders.iter().enumerate() {
            let mut appender = slot.lock();
            match catch_unwind(AssertUnwindSafe(|| appender.flush())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Appender #{} flush failed: {}", idx, e);
                    first_error.get_or_insert(e);
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} panicked during flush: {}. \
                         Other appenders continue to function.",
                        idx,
                        panic_message(&panic_info)
                    );
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }
}

impl Default for RootLogger {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}

impl std::fmt::Debug for RootLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootLogger")
            .field("level", &self.level())
            .field("appenders", &self.appender_names())
            .finish()
    }
}

fn panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// A named handle onto a shared [`RootLogger`]
///
/// # Example
///
/// ```
/// use tomlog::{LogLevel, NamedLogger, RootLogger};
/// use std::sync::Arc;
///
/// let root = Arc::new(RootLogger::new(LogLevel::Warning));
/// let logger = NamedLogger::new("app.devices", Arc::clone(&root));
///
/// assert!(!logger.is_enabled_for(LogLevel::Info));
/// logger.warning("battery low");
/// ```
#[derive(Clone)]
pub struct NamedLogger {
    name: String,
    root: Arc<RootLogger>,
}

impl NamedLogger {
    pub fn new(name: impl Into<String>, root: Arc<RootLogger>) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Arc<RootLogger> {
        &self.root
    }

    #[inline]
    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        self.root.is_enabled_for(level)
    }

    /// Emit a prepared record; the record keeps whatever name it carries
    pub fn log_record(&self, record: LogRecord) {
        self.root.log_record(&record);
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.log_with(level, message, LogContext::new());
    }

    /// Log with `extra` attributes
    pub fn log_with(&self, level: LogLevel, message: impl Into<String>, extra: LogContext) {
        if !self.is_enabled_for(level) {
            return;
        }
        let record = LogRecord::new(self.name.as_str(), level, message).with_extra(extra);
        self.root.log_record(&record);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message);
    }

    /// ERROR record flagged for emphasis, with the error section when given
    pub fn exception(&self, message: impl Into<String>, error: Option<&ErrorContext>) {
        self.exception_with(message, error, LogContext::new());
    }

    pub fn exception_with(
        &self,
        message: impl Into<String>,
        error: Option<&ErrorContext>,
        extra: LogContext,
    ) {
        if !self.is_enabled_for(LogLevel::Error) {
            return;
        }
        let mut record = LogRecord::new(self.name.as_str(), LogLevel::Error, message)
            .with_extra(extra)
            .with_emphasis(true);
        if let Some(error) = error {
            record = record.with_error(error.clone());
        }
        self.root.log_record(&record);
    }
}

impl std::fmt::Debug for NamedLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedLogger").field("name", &self.name).finish()
    }
}
