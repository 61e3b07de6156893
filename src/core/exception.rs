//! Explicit error context for exception records
//!
//! Records carry the error that caused them as plain data (kind, message,
//! cause chain and an optional backtrace) instead of looking up an ambient
//! "current exception".

use serde::{Deserialize, Serialize};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Short type name of the error, e.g. `ParseIntError`
    pub kind: String,
    pub message: String,
    /// Messages of `source()` errors, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<String>,
}

impl ErrorContext {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            causes: Vec::new(),
            backtrace: None,
        }
    }

    /// Build a context from any error, walking its `source()` chain.
    ///
    /// ```
    /// use tomlog::ErrorContext;
    ///
    /// let err = "x".parse::<i32>().unwrap_err();
    /// let ctx = ErrorContext::from_error(&err);
    /// assert_eq!(ctx.kind, "ParseIntError");
    /// ```
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            kind: short_type_name(std::any::type_name::<E>()).to_string(),
            message: err.to_string(),
            causes,
            backtrace: None,
        }
    }

    /// Attach a backtrace rendered by the caller
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }

    /// Capture the current stack when `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE` allow it
    #[must_use]
    pub fn capture_backtrace(self) -> Self {
        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            self.with_backtrace(backtrace.to_string())
        } else {
            self
        }
    }

    /// Multi-line rendering appended below the record line, traceback style
    pub fn render(&self) -> String {
        let mut out = format!("{}: {}", self.kind, self.message);
        for cause in &self.causes {
            out.push_str("\nCaused by: ");
            out.push_str(cause);
        }
        if let Some(ref backtrace) = self.backtrace {
            out.push_str("\nStack backtrace:\n");
            out.push_str(backtrace.trim_end());
        }
        out
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

fn short_type_name(full: &str) -> &str {
    // Generic parameters may themselves contain `::`
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
