//! Colored console formatter
//!
//! Color specs use the usual log-color vocabulary: comma separated names such
//! as `red`, `bold_red`, `thin_white`, `light_blue` or `bg_yellow`, with
//! `purple` as an alias of magenta.
//!
//! Escape sequences are always emitted. Whether the console supports them is
//! decided once by [`Capabilities`](super::Capabilities), not per record.

use super::append_exception;
use super::template::{Field, FieldData, Template, TemplateStyle};
use super::text::EMPHASIS_MARKER;
use crate::core::config::ColoredFormatterSection;
use crate::core::error::{LoggerError, Result};
use crate::core::log_level::LogLevel;
use crate::core::log_record::LogRecord;
use crate::core::timestamp::ZonedTimestamp;
use ::colored::Color;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

pub const RESET: &str = "\x1b[0m";

/// Built-in severity colors; configured entries replace them one by one
pub const DEFAULT_COLORS: [(LogLevel, &str); 5] = [
    (LogLevel::Debug, "cyan"),
    (LogLevel::Info, "green"),
    (LogLevel::Warning, "yellow"),
    (LogLevel::Error, "red"),
    (LogLevel::Critical, "bold_red"),
];

/// Translate a color spec into one ANSI escape sequence
///
/// ```
/// use tomlog::formatters::colored::escape_sequence;
///
/// assert_eq!(escape_sequence("bold_red").unwrap(), "\x1b[1;31m");
/// assert_eq!(escape_sequence("green,bg_white").unwrap(), "\x1b[32;47m");
/// assert!(escape_sequence("chartreuse").is_err());
/// ```
pub fn escape_sequence(spec: &str) -> Result<String> {
    let mut codes = Vec::new();
    for name in spec.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        codes.push(spec_codes(name).ok_or_else(|| {
            LoggerError::formatter_config(
                "formatters.colored.colors",
                format!("unknown color '{}'", name),
            )
        })?);
    }
    if codes.is_empty() {
        return Err(LoggerError::formatter_config(
            "formatters.colored.colors",
            "empty color spec",
        ));
    }
    Ok(format!("\x1b[{}m", codes.join(";")))
}

fn spec_codes(name: &str) -> Option<String> {
    let name = name.to_ascii_lowercase();
    match name.as_str() {
        "reset" => return Some("0".to_string()),
        "bold" => return Some("1".to_string()),
        "thin" => return Some("2".to_string()),
        _ => {}
    }

    if let Some(rest) = name.strip_prefix("bold_") {
        return foreground(rest).map(|fg| format!("1;{}", fg));
    }
    if let Some(rest) = name.strip_prefix("thin_") {
        return foreground(rest).map(|fg| format!("2;{}", fg));
    }
    if let Some(rest) = name.strip_prefix("bg_") {
        return lookup(rest).map(|c| c.to_bg_str().into_owned());
    }
    foreground(&name)
}

fn foreground(name: &str) -> Option<String> {
    lookup(name).map(|c| c.to_fg_str().into_owned())
}

fn lookup(name: &str) -> Option<Color> {
    let (bright, base) = match name
        .strip_prefix("light_")
        .or_else(|| name.strip_prefix("bright_"))
    {
        Some(base) => (true, base),
        None => (false, name),
    };
    let base = if base == "purple" { "magenta" } else { base };
    if !matches!(
        base,
        "black" | "red" | "green" | "yellow" | "blue" | "magenta" | "cyan" | "white"
    ) {
        return None;
    }
    let full = if bright {
        format!("bright {}", base)
    } else {
        base.to_string()
    };
    Color::from_str(&full).ok()
}

/// Severity-colored template formatter for the console
#[derive(Debug, Clone)]
pub struct ColoredFormatter {
    template: Template,
    timestamp: ZonedTimestamp,
    colors: HashMap<LogLevel, String>,
    emphasis: String,
}

impl ColoredFormatter {
    /// # Errors
    ///
    /// [`LoggerError::FormatterConfig`] for a bad template, date pattern,
    /// severity name or color; [`LoggerError::InvalidTimezone`] for an
    /// unknown zone.
    pub fn new(
        format: &str,
        datefmt: Option<&str>,
        style: &str,
        timezone: &str,
        colors: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let style: TemplateStyle = style.parse()?;
        let template = Template::parse(format, style)?;
        let timestamp = ZonedTimestamp::new(timezone, datefmt)?;

        let mut resolved = HashMap::with_capacity(DEFAULT_COLORS.len());
        for (level, spec) in DEFAULT_COLORS {
            resolved.insert(level, escape_sequence(spec)?);
        }
        for (name, spec) in colors {
            let level: LogLevel = name.parse().map_err(|e: String| {
                LoggerError::formatter_config("formatters.colored.colors", e)
            })?;
            resolved.insert(level, escape_sequence(spec)?);
        }

        Ok(Self {
            template,
            timestamp,
            colors: resolved,
            emphasis: escape_sequence("bold_red")?,
        })
    }

    pub fn from_section(section: &ColoredFormatterSection, timezone: &str) -> Result<Self> {
        Self::new(
            &section.format,
            section.datefmt.as_deref(),
            &section.style,
            timezone,
            &section.colors,
        )
    }

    /// Escape sequence used for `level`
    pub fn color_for(&self, level: LogLevel) -> &str {
        self.colors.get(&level).map_or("", String::as_str)
    }

    pub fn format(&self, record: &LogRecord) -> String {
        let mut out = self.template.render_with(|field| match field {
            Field::Asctime => FieldData::Str(self.timestamp.format(&record.timestamp)),
            Field::LogColor => FieldData::Str(self.color_for(record.level).to_string()),
            Field::Reset => FieldData::Str(RESET.to_string()),
            Field::Message if record.emphasis => FieldData::Str(format!(
                "{}{} {}{}",
                self.emphasis, EMPHASIS_MARKER, record.message, RESET
            )),
            other => FieldData::from_record(other, record),
        });
        if !out.ends_with(RESET) {
            out.push_str(RESET);
        }
        append_exception(&mut out, record);
        out
    }
}
