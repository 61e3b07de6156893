//! Plain text formatter with timezone-aware `asctime`

use super::append_exception;
use super::template::{Field, FieldData, Template, TemplateStyle};
use crate::core::error::Result;
use crate::core::log_record::LogRecord;
use crate::core::timestamp::ZonedTimestamp;

/// Marker prefixed to emphasised messages on the console
pub const EMPHASIS_MARKER: &str = "❌";

/// Renders records through a template, with `asctime` in a fixed timezone.
///
/// # Examples
///
/// ```
/// use tomlog::formatters::TimestampFormatter;
/// use tomlog::{LogLevel, LogRecord};
/// use chrono::{TimeZone, Utc};
///
/// let formatter = TimestampFormatter::new(
///     "{asctime} [{levelname}] {message}",
///     Some("%Y-%m-%d %H:%M:%S"),
///     "{",
///     "Asia/Shanghai",
/// )
/// .unwrap();
///
/// let record = LogRecord::new("root", LogLevel::Info, "ready")
///     .with_timestamp(Utc.with_ymd_and_hms(2025, 1, 8, 22, 30, 45).unwrap());
/// assert_eq!(formatter.format(&record), "2025-01-09 06:30:45 [INFO] ready");
/// ```
#[derive(Debug, Clone)]
pub struct TimestampFormatter {
    template: Template,
    timestamp: ZonedTimestamp,
    console_marker: bool,
}

impl TimestampFormatter {
    /// # Errors
    ///
    /// [`LoggerError::InvalidTimezone`](crate::LoggerError::InvalidTimezone)
    /// for an unknown zone; [`LoggerError::FormatterConfig`](crate::LoggerError::FormatterConfig)
    /// for a bad template, style or date pattern.
    pub fn new(format: &str, datefmt: Option<&str>, style: &str, timezone: &str) -> Result<Self> {
        let style: TemplateStyle = style.parse()?;
        let template = Template::parse(format, style)?;
        let timestamp = ZonedTimestamp::new(timezone, datefmt)?;
        Ok(Self::from_parts(template, timestamp))
    }

    pub fn from_parts(template: Template, timestamp: ZonedTimestamp) -> Self {
        Self {
            template,
            timestamp,
            console_marker: false,
        }
    }

    /// Prefix emphasised messages with [`EMPHASIS_MARKER`]
    #[must_use]
    pub fn with_console_marker(mut self, enabled: bool) -> Self {
        self.console_marker = enabled;
        self
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn timestamp(&self) -> &ZonedTimestamp {
        &self.timestamp
    }

    /// `asctime` for a record
    pub fn format_time(&self, record: &LogRecord) -> String {
        self.timestamp.format(&record.timestamp)
    }

    pub fn format(&self, record: &LogRecord) -> String {
        let mut out = self.template.render_with(|field| match field {
            Field::Asctime => FieldData::Str(self.format_time(record)),
            Field::Message if record.emphasis && self.console_marker => {
                FieldData::Str(format!("{} {}", EMPHASIS_MARKER, record.message))
            }
            Field::LogColor | Field::Reset => FieldData::Str(String::new()),
            other => FieldData::from_record(other, record),
        });
        append_exception(&mut out, record);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorContext, LogContext, LogLevel, LoggerError};
    use chrono::{TimeZone, Utc};

    fn record(level: LogLevel, message: &str) -> LogRecord {
        LogRecord::new("app", level, message)
            .with_timestamp(Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap())
    }

    #[test]
    fn test_scenario_line() {
        let f = TimestampFormatter::new("{levelname} {message}", None, "{", "UTC").unwrap();
        assert_eq!(f.format(&record(LogLevel::Warning, "disk low")), "WARNING disk low");
    }

    #[test]
    fn test_iso_asctime_without_datefmt() {
        let f = TimestampFormatter::new("{asctime}", None, "{", "Asia/Shanghai").unwrap();
        assert_eq!(
            f.format(&record(LogLevel::Info, "x")),
            "2025-01-08T18:30:45.000000+08:00"
        );
    }

    #[test]
    fn test_percent_style() {
        let f = TimestampFormatter::new(
            "%(asctime)s %(name)s %(levelname)-7s %(message)s",
            Some("%H:%M:%S"),
            "%",
            "Europe/London",
        )
        .unwrap();
        assert_eq!(f.format(&record(LogLevel::Info, "hi")), "10:30:45 app INFO    hi");
    }

    #[test]
    fn test_color_fields_render_empty() {
        let f = TimestampFormatter::new("{log_color}{levelname}{reset}", None, "{", "UTC").unwrap();
        assert_eq!(f.format(&record(LogLevel::Error, "x")), "ERROR");
    }

    #[test]
    fn test_console_marker_only_when_enabled() {
        let emphasised = record(LogLevel::Error, "boom").with_emphasis(true);

        let file = TimestampFormatter::new("{message}", None, "{", "UTC").unwrap();
        assert_eq!(file.format(&emphasised), "boom");

        let console = file.clone().with_console_marker(true);
        assert_eq!(console.format(&emphasised), "❌ boom");
        assert_eq!(console.format(&record(LogLevel::Error, "plain")), "plain");
    }

    #[test]
    fn test_exception_section_follows_line() {
        let f = TimestampFormatter::new("{levelname} {message}", None, "{", "UTC").unwrap();
        let rec = record(LogLevel::Error, "calc failed")
            .with_error(ErrorContext::new("ZeroDivisionError", "division by zero"));

        assert_eq!(
            f.format(&rec),
            "ERROR calc failed\nZeroDivisionError: division by zero"
        );
    }

    #[test]
    fn test_extra_fields_in_template() {
        let f = TimestampFormatter::new("{message} [{device}]", None, "{", "UTC").unwrap();
        let rec = record(LogLevel::Info, "connected")
            .with_extra(LogContext::new().with_field("device", "emulator-5554"));
        assert_eq!(f.format(&rec), "connected [emulator-5554]");
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            TimestampFormatter::new("{message}", None, "{", "Not/AZone"),
            Err(LoggerError::InvalidTimezone { .. })
        ));
        assert!(matches!(
            TimestampFormatter::new("{message", None, "{", "UTC"),
            Err(LoggerError::FormatterConfig { .. })
        ));
        assert!(matches!(
            TimestampFormatter::new("{message}", Some("%Q"), "{", "UTC"),
            Err(LoggerError::FormatterConfig { .. })
        ));
        assert!(matches!(
            TimestampFormatter::new("{asctime} {message}", Some("%#z"), "{", "UTC"),
            Err(LoggerError::FormatterConfig { .. })
        ));
        assert!(matches!(
            TimestampFormatter::new("{message}", None, "#", "UTC"),
            Err(LoggerError::FormatterConfig { .. })
        ));
    }
}
