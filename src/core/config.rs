//! Logging configuration document
//!
//! The configuration lives in the `[log]` table of a TOML file:
//!
//! ```toml
//! [log]
//! level = "INFO"
//! log_dir = "logs"
//! backup_count = 7
//! timezone = "Asia/Shanghai"
//! use_json = false
//!
//! [log.handlers.console]
//! level = "DEBUG"
//!
//! [log.handlers.file]
//! when = "midnight"
//! interval = 1
//! encoding = "utf-8"
//!
//! [log.formatters.default]
//! format = "{asctime} [{levelname}] {name}: {message}"
//! datefmt = "%Y-%m-%d %H:%M:%S"
//! ```
//!
//! Formatter sections are kept as raw TOML and decoded on demand by the
//! formatter factory, so a broken `formatters.*` table is reported as a
//! formatter error when that formatter is actually needed.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::timestamp::DEFAULT_TIMEZONE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_FILE: &str = "app.log";

#[derive(Debug, Deserialize)]
struct ConfigFile {
    log: Option<LogConfig>,
}

/// The parsed `[log]` table; immutable after load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Overall minimum severity name (unrecognized names mean INFO)
    pub level: String,
    pub log_dir: PathBuf,
    /// Number of rotated files to keep; `0` keeps all of them
    pub backup_count: u32,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub use_json: bool,
    #[serde(default)]
    pub handlers: HandlersConfig,
    #[serde(default)]
    pub formatters: toml::Table,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlersConfig {
    /// Console output is enabled only when this table is present
    pub console: Option<ConsoleHandlerConfig>,
    #[serde(default)]
    pub file: FileHandlerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleHandlerConfig {
    #[serde(default = "default_console_level")]
    pub level: String,
}

impl Default for ConsoleHandlerConfig {
    fn default() -> Self {
        Self {
            level: default_console_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHandlerConfig {
    #[serde(default = "default_when")]
    pub when: String,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_filename")]
    pub filename: String,
    /// Gzip rotated backups
    #[serde(default)]
    pub compress: bool,
    #[serde(default = "default_file_level")]
    pub level: String,
}

impl Default for FileHandlerConfig {
    fn default() -> Self {
        Self {
            when: default_when(),
            interval: default_interval(),
            encoding: default_encoding(),
            filename: default_filename(),
            compress: false,
            level: default_file_level(),
        }
    }
}

/// `[log.formatters.default]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DefaultFormatterSection {
    pub format: String,
    pub datefmt: Option<String>,
    #[serde(default = "default_brace_style")]
    pub style: String,
}

/// `[log.formatters.colored]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColoredFormatterSection {
    pub format: String,
    pub datefmt: Option<String>,
    #[serde(default = "default_brace_style")]
    pub style: String,
    /// Severity name to color spec; entries override the defaults one by one
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
}

/// `[log.formatters.json]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonFormatterSection {
    #[serde(default = "default_json_format")]
    pub format: String,
    #[serde(default = "default_percent_style")]
    pub style: String,
}

impl Default for JsonFormatterSection {
    fn default() -> Self {
        Self {
            format: default_json_format(),
            style: default_percent_style(),
        }
    }
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_console_level() -> String {
    "INFO".to_string()
}

fn default_file_level() -> String {
    "DEBUG".to_string()
}

fn default_when() -> String {
    "midnight".to_string()
}

fn default_interval() -> u32 {
    1
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_filename() -> String {
    DEFAULT_LOG_FILE.to_string()
}

fn default_brace_style() -> String {
    "{".to_string()
}

fn default_percent_style() -> String {
    "%".to_string()
}

fn default_json_format() -> String {
    "%(message)s".to_string()
}

impl LogConfig {
    /// Load the `[log]` table from a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::ConfigLoad`] if the file cannot be read, is not
    /// valid TOML, has no `[log]` table or misses a required field.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LoggerError::config_load(path, format!("cannot read file: {}", e), Some(Box::new(e)))
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Parse configuration text; `origin` is only used in error messages
    ///
    /// # Errors
    ///
    /// Same as [`LogConfig::load`], minus the read.
    pub fn from_toml_str(content: &str, origin: impl AsRef<Path>) -> Result<Self> {
        let origin = origin.as_ref();
        let file: ConfigFile = toml::from_str(content).map_err(|e| {
            LoggerError::config_load(origin, e.message().to_string(), Some(Box::new(e)))
        })?;
        file.log
            .ok_or_else(|| LoggerError::config_load(origin, "missing [log] table", None))
    }

    /// Overall minimum severity
    #[must_use]
    pub fn root_level(&self) -> LogLevel {
        LogLevel::from_name_or_default(&self.level)
    }

    /// Console threshold, if the console handler is configured
    #[must_use]
    pub fn console_level(&self) -> Option<LogLevel> {
        self.handlers
            .console
            .as_ref()
            .map(|console| LogLevel::from_name_or_default(&console.level))
    }

    #[must_use]
    pub fn file_level(&self) -> LogLevel {
        LogLevel::from_name_or_default(&self.handlers.file.level)
    }

    /// `log_dir`, joined onto `base` when it is relative
    #[must_use]
    pub fn resolve_log_dir(&self, base: Option<&Path>) -> PathBuf {
        match base {
            Some(base) if self.log_dir.is_relative() => base.join(&self.log_dir),
            _ => self.log_dir.clone(),
        }
    }

    /// Path of the live log file
    #[must_use]
    pub fn log_file_path(&self, base: Option<&Path>) -> PathBuf {
        self.resolve_log_dir(base).join(&self.handlers.file.filename)
    }

    #[must_use]
    pub fn has_formatter(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Decode `[log.formatters.<name>]`; `Ok(None)` when the table is absent
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::FormatterConfig`] when the table exists but does
    /// not match `T`.
    pub fn formatter_section<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.formatters.get(name) {
            None => Ok(None),
            Some(value) => value.clone().try_into::<T>().map(Some).map_err(|e| {
                LoggerError::formatter_config(format!("formatters.{}", name), e.message())
            }),
        }
    }
}
