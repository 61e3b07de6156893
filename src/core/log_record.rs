//! Log record structure

use super::exception::ErrorContext;
use super::log_context::LogContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::sync::OnceLock;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<u64>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

static PROCESS_START: OnceLock<DateTime<Utc>> = OnceLock::new();

/// Instant the logging system was first touched; origin of `relativeCreated`
pub fn process_start() -> DateTime<Utc> {
    *PROCESS_START.get_or_init(Utc::now)
}

/// Get cached numeric thread ID, computing and caching it on first access
fn get_thread_id() -> u64 {
    THREAD_ID_CACHE.with(|cache| {
        *cache.borrow_mut().get_or_insert_with(|| {
            // `ThreadId` only exposes its counter through Debug: "ThreadId(7)"
            format!("{:?}", std::thread::current().id())
                .chars()
                .filter(char::is_ascii_digit)
                .collect::<String>()
                .parse()
                .unwrap_or(0)
        })
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Name of the logger that produced the record
    pub name: String,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub module_path: Option<String>,
    pub thread_id: u64,
    pub thread_name: Option<String>,
    pub process_id: u32,
    /// Free-form attributes supplied by the caller
    #[serde(default, skip_serializing_if = "LogContext::is_empty")]
    pub extra: LogContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorContext>,
    /// Set by exception logging; console formatters highlight the message
    #[serde(default)]
    pub emphasis: bool,
}

impl LogRecord {
    pub fn new(name: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level,
            message: message.into(),
            timestamp: Utc::now(),
            file: None,
            line: None,
            module_path: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            process_id: std::process::id(),
            extra: LogContext::new(),
            error: None,
            emphasis: false,
        }
    }

    pub fn with_location(mut self, file: &str, line: u32, module_path: &str) -> Self {
        self.file = Some(file.to_string());
        self.line = Some(line);
        self.module_path = Some(module_path.to_string());
        self
    }

    pub fn with_extra(mut self, extra: LogContext) -> Self {
        self.extra = extra;
        self
    }

    pub fn with_error(mut self, error: ErrorContext) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_emphasis(mut self, emphasis: bool) -> Self {
        self.emphasis = emphasis;
        self
    }

    /// Creation time as seconds since the epoch
    pub fn created(&self) -> f64 {
        self.timestamp.timestamp_micros() as f64 / 1_000_000.0
    }

    /// Millisecond part of the creation time
    pub fn msecs(&self) -> f64 {
        f64::from(self.timestamp.timestamp_subsec_micros()) / 1000.0
    }

    /// Milliseconds between [`process_start`] and the creation time
    pub fn relative_created(&self) -> f64 {
        (self.timestamp - process_start()).num_microseconds().unwrap_or(0) as f64 / 1000.0
    }

    /// File name component of the source location
    pub fn filename(&self) -> Option<&str> {
        self.file
            .as_deref()
            .map(|f| f.rsplit(['/', '\\']).next().unwrap_or(f))
    }

    /// Last segment of the module path
    pub fn module(&self) -> Option<&str> {
        self.module_path
            .as_deref()
            .map(|m| m.rsplit("::").next().unwrap_or(m))
    }
}
