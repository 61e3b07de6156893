//! Timezone-aware timestamp rendering
//!
//! Timestamps are converted into a configured IANA zone and rendered with a
//! strftime pattern, or ISO 8601 when no pattern is configured. The host's
//! local timezone is never consulted.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::Write;

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Resolve an IANA zone name such as `Asia/Shanghai`.
///
/// # Errors
///
/// Returns [`LoggerError::InvalidTimezone`] when the name is unknown.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| LoggerError::invalid_timezone(name, e.to_string()))
}

/// Renders record timestamps in a fixed timezone
///
/// # Examples
///
/// ```
/// use tomlog::core::ZonedTimestamp;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2025, 1, 8, 22, 30, 45).unwrap();
/// let shanghai = ZonedTimestamp::new("Asia/Shanghai", Some("%Y-%m-%d %H:%M:%S")).unwrap();
/// assert_eq!(shanghai.format(&ts), "2025-01-09 06:30:45");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ZonedTimestamp {
    timezone: Tz,
    datefmt: Option<String>,
}

impl ZonedTimestamp {
    /// Create a renderer for `timezone` using an optional strftime `datefmt`
    ///
    /// # Errors
    ///
    /// Unknown zones fail with [`LoggerError::InvalidTimezone`]; patterns
    /// chrono cannot render fail with [`LoggerError::FormatterConfig`].
    pub fn new(timezone: &str, datefmt: Option<&str>) -> Result<Self> {
        let timezone = parse_timezone(timezone)?;
        let datefmt = datefmt.map(normalize_datefmt).transpose()?;
        Ok(Self { timezone, datefmt })
    }

    pub fn with_zone(timezone: Tz, datefmt: Option<&str>) -> Result<Self> {
        let datefmt = datefmt.map(normalize_datefmt).transpose()?;
        Ok(Self { timezone, datefmt })
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    #[must_use]
    pub fn datefmt(&self) -> Option<&str> {
        self.datefmt.as_deref()
    }

    /// Convert a UTC instant into the configured zone
    #[must_use]
    pub fn localize(&self, timestamp: &DateTime<Utc>) -> DateTime<Tz> {
        timestamp.with_timezone(&self.timezone)
    }

    /// Render the instant with `datefmt`, or as ISO 8601 with offset
    #[must_use]
    pub fn format(&self, timestamp: &DateTime<Utc>) -> String {
        let local = self.localize(timestamp);
        match self.datefmt {
            Some(ref pattern) => local.format(pattern).to_string(),
            None => local.to_rfc3339_opts(SecondsFormat::Micros, false),
        }
    }
}

/// Validate a strftime pattern up front.
///
/// chrono panics while displaying an invalid pattern, so errors must surface
/// here. A bare `%f` is read as microseconds, matching common log configs.
fn normalize_datefmt(pattern: &str) -> Result<String> {
    let mut normalized = String::with_capacity(pattern.len() + 2);
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        normalized.push(c);
        if c == '%' {
            match chars.next() {
                Some('f') => normalized.push_str("6f"),
                Some(next) => normalized.push(next),
                None => {}
            }
        }
    }

    let invalid = || {
        LoggerError::formatter_config(
            "datefmt",
            format!("invalid date/time pattern '{}'", pattern),
        )
    };
    if StrftimeItems::new(&normalized).any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }

    // Parse-only specifiers such as `%#z` pass the scan but fail to render
    let sample = chrono_tz::UTC.timestamp_opt(0, 0).single().ok_or_else(invalid)?;
    let mut rendered = String::new();
    write!(rendered, "{}", sample.format(&normalized)).map_err(|_| invalid())?;
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_iso8601_default_utc() {
        let ts = ZonedTimestamp::new("UTC", None).unwrap();
        assert_eq!(ts.format(&fixed_datetime()), "2025-01-08T10:30:45.123456+00:00");
    }

    #[test]
    fn test_iso8601_in_zone() {
        let ts = ZonedTimestamp::new("Asia/Shanghai", None).unwrap();
        assert_eq!(ts.format(&fixed_datetime()), "2025-01-08T18:30:45.123456+08:00");
    }

    #[test]
    fn test_custom_pattern_in_zone() {
        let ts = ZonedTimestamp::new("America/New_York", Some("%Y/%m/%d %H:%M %Z")).unwrap();
        assert_eq!(ts.format(&fixed_datetime()), "2025/01/08 05:30 EST");
    }

    #[test]
    fn test_bare_percent_f_is_microseconds() {
        let ts = ZonedTimestamp::new("UTC", Some("%H:%M:%S.%f")).unwrap();
        assert_eq!(ts.format(&fixed_datetime()), "10:30:45.123456");
        assert_eq!(ts.datefmt(), Some("%H:%M:%S.%6f"));
    }

    #[test]
    fn test_escaped_percent_kept() {
        let ts = ZonedTimestamp::new("UTC", Some("%%f %Y")).unwrap();
        assert_eq!(ts.format(&fixed_datetime()), "%f 2025");
    }

    #[test]
    fn test_invalid_timezone() {
        let err = ZonedTimestamp::new("Mars/Olympus_Mons", None).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidTimezone { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = ZonedTimestamp::new("UTC", Some("%Y-%Q")).unwrap_err();
        assert!(matches!(err, LoggerError::FormatterConfig { .. }));
    }

    #[test]
    fn test_parse_only_specifier_rejected() {
        let err = ZonedTimestamp::new("UTC", Some("%H:%M %#z")).unwrap_err();
        assert!(matches!(err, LoggerError::FormatterConfig { .. }));
        assert!(ZonedTimestamp::new("UTC", Some("%H:%M %z")).is_ok());
    }

    #[test]
    fn test_dst_offset_changes() {
        let ts = ZonedTimestamp::new("Europe/Berlin", Some("%H:%M %z")).unwrap();
        let winter = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap();
        assert_eq!(ts.format(&winter), "13:00 +0100");
        assert_eq!(ts.format(&summer), "14:00 +0200");
    }
}
