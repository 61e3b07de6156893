//! Formatter selection with capability degradation
//!
//! Selection order for one sink:
//!
//! 1. file sink with `use_json`: the structured formatter
//! 2. console sink with a `[log.formatters.colored]` table: the colored formatter
//! 3. otherwise the plain formatter from `[log.formatters.default]`
//!
//! A renderer that is unavailable is never an error: a warning goes to
//! stderr and selection continues with the next step.

use super::text::TimestampFormatter;
use super::Formatter;
use crate::core::config::{
    ColoredFormatterSection, DefaultFormatterSection, JsonFormatterSection, LogConfig,
};
use crate::core::error::{LoggerError, Result};

/// Which sink a formatter is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Console,
    File,
}

/// Optional renderers available to this process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub structured: bool,
    pub colored: bool,
}

impl Capabilities {
    /// Renderers compiled into this build
    #[must_use]
    pub fn detect() -> Self {
        Self {
            structured: cfg!(feature = "json"),
            colored: cfg!(feature = "color"),
        }
    }

    /// No optional renderer; every sink gets the plain formatter
    #[must_use]
    pub fn none() -> Self {
        Self {
            structured: false,
            colored: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormatterFactory {
    capabilities: Capabilities,
}

impl OutputFormatterFactory {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Build the formatter for `target`. The configuration is never modified.
    ///
    /// # Errors
    ///
    /// [`LoggerError::FormatterConfig`] when `formatters.default` is needed
    /// but missing or malformed, or when a present optional section is
    /// malformed; [`LoggerError::InvalidTimezone`] for an unknown zone.
    pub fn create(&self, target: Target, config: &LogConfig) -> Result<Formatter> {
        if target == Target::File && config.use_json {
            let section: JsonFormatterSection =
                config.formatter_section("json")?.unwrap_or_default();
            if self.capabilities.structured {
                if let Some(formatter) = structured(&section, &config.timezone)? {
                    return Ok(formatter);
                }
            }
            warn_degraded("structured (JSON) output is unavailable; using plain text for the file");
        }

        if target == Target::Console {
            if let Some(section) = config.formatter_section::<ColoredFormatterSection>("colored")? {
                if self.capabilities.colored {
                    if let Some(formatter) = colored(&section, &config.timezone)? {
                        return Ok(formatter);
                    }
                }
                warn_degraded("colored output is unavailable; using plain console output");
            }
        }

        self.plain(target, config)
    }

    fn plain(&self, target: Target, config: &LogConfig) -> Result<Formatter> {
        let section: DefaultFormatterSection = config
            .formatter_section("default")?
            .ok_or_else(|| LoggerError::formatter_config("formatters.default", "section is missing"))?;

        let formatter = TimestampFormatter::new(
            &section.format,
            section.datefmt.as_deref(),
            &section.style,
            &config.timezone,
        )?
        .with_console_marker(target == Target::Console);
        Ok(Formatter::Plain(formatter))
    }
}

#[cfg(feature = "json")]
fn structured(section: &JsonFormatterSection, timezone: &str) -> Result<Option<Formatter>> {
    let formatter = super::json::JsonFormatter::from_section(section, timezone)?;
    Ok(Some(Formatter::Structured(formatter)))
}

#[cfg(not(feature = "json"))]
fn structured(_section: &JsonFormatterSection, _timezone: &str) -> Result<Option<Formatter>> {
    Ok(None)
}

#[cfg(feature = "color")]
fn colored(section: &ColoredFormatterSection, timezone: &str) -> Result<Option<Formatter>> {
    let formatter = super::colored::ColoredFormatter::from_section(section, timezone)?;
    Ok(Some(Formatter::Colored(formatter)))
}

#[cfg(not(feature = "color"))]
fn colored(_section: &ColoredFormatterSection, _timezone: &str) -> Result<Option<Formatter>> {
    Ok(None)
}

fn warn_degraded(message: &str) {
    eprintln!("[LOGGER WARNING] {}", message);
}
