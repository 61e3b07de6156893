//! Pipeline assembly
//!
//! Turns a [`LogConfig`] into sinks attached to a [`RootLogger`]:
//!
//! 1. root level from `level` (unrecognized names mean INFO)
//! 2. the log directory is created
//! 3. an optional console sink and the always-present rotating file sink are
//!    built, each with its own formatter and threshold
//! 4. the new sinks replace whatever the root had before
//!
//! Every sink is built before anything on the root changes, so a bad
//! configuration leaves the previous pipeline in place.

use crate::appenders::{
    resolve_encoding, ConsoleAppender, ConsoleTarget, RotationSchedule, TimedRotatingFileAppender,
};
use crate::core::{parse_timezone, Appender, LogConfig, LoggerError, Result, RootLogger};
use crate::formatters::{Capabilities, OutputFormatterFactory, Target};
use parking_lot::Mutex;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct LogPipelineBuilder<'a> {
    config: &'a LogConfig,
    capabilities: Capabilities,
    console: ConsoleTarget,
    base_dir: Option<PathBuf>,
}

impl<'a> LogPipelineBuilder<'a> {
    pub fn new(config: &'a LogConfig) -> Self {
        Self {
            config,
            capabilities: Capabilities::detect(),
            console: ConsoleTarget::Stdout,
            base_dir: None,
        }
    }

    /// Override the detected renderer capabilities
    #[must_use]
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Send console output to `writer` instead of stdout
    #[must_use]
    pub fn console_writer(mut self, writer: Arc<Mutex<dyn Write + Send>>) -> Self {
        self.console = ConsoleTarget::Writer(writer);
        self
    }

    /// Directory a relative `log_dir` is resolved against
    #[must_use]
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &'a LogConfig {
        self.config
    }

    pub fn log_dir(&self) -> PathBuf {
        self.config.resolve_log_dir(self.base_dir.as_deref())
    }

    /// Build a fresh root logger
    ///
    /// # Errors
    ///
    /// See [`LogPipelineBuilder::configure`].
    pub fn build(&self) -> Result<Arc<RootLogger>> {
        let root = RootLogger::new(self.config.root_level());
        self.configure(&root)?;
        Ok(Arc::new(root))
    }

    /// (Re)configure an existing root, replacing all of its sinks
    ///
    /// # Errors
    ///
    /// [`LoggerError::LogDirectory`] when the directory cannot be created,
    /// [`LoggerError::InvalidTimezone`] / [`LoggerError::FormatterConfig`]
    /// from the formatters, and [`LoggerError::InvalidConfiguration`] for an
    /// unsupported encoding, `when` or interval.
    pub fn configure(&self, root: &RootLogger) -> Result<()> {
        let level = self.config.root_level();
        let log_dir = self.log_dir();
        ensure_log_dir(&log_dir)?;

        let appenders = self.build_appenders(&log_dir)?;
        root.set_level(level);
        let previous = root.replace_appenders(appenders);
        drop(previous);
        Ok(())
    }

    fn build_appenders(&self, log_dir: &Path) -> Result<Vec<Box<dyn Appender>>> {
        let config = self.config;
        let factory = OutputFormatterFactory::new(self.capabilities);
        let mut appenders: Vec<Box<dyn Appender>> = Vec::with_capacity(2);

        if let Some(level) = config.console_level() {
            let formatter = factory.create(Target::Console, config)?;
            let console = ConsoleAppender::new(formatter, level).with_target(self.console.clone());
            appenders.push(Box::new(console));
        }

        let file_config = &config.handlers.file;
        let formatter = factory.create(Target::File, config)?;
        let encoding = resolve_encoding(&file_config.encoding)?;
        let schedule = RotationSchedule::new(
            &file_config.when,
            file_config.interval,
            parse_timezone(&config.timezone)?,
        )?;
        let file = TimedRotatingFileAppender::new(
            log_dir.join(&file_config.filename),
            formatter,
            schedule,
        )?
        .with_min_level(config.file_level())
        .with_backup_count(config.backup_count as usize)
        .with_encoding(encoding)
        .with_compression(file_config.compress);
        appenders.push(Box::new(file));

        Ok(appenders)
    }
}

fn ensure_log_dir(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(LoggerError::log_directory(
            dir,
            io::Error::new(io::ErrorKind::AlreadyExists, "path exists and is not a directory"),
        ));
    }
    fs::create_dir_all(dir).map_err(|e| LoggerError::log_directory(dir, e))
}
