//! Process-wide logging entry point
//!
//! [`LoggingFacade::init`] builds the pipeline exactly once per process, no
//! matter how many threads race to use it first. Tests and embedders that want
//! their own pipeline use [`LoggingFacade::from_config`] instead.
//!
//! # Example
//!
//! ```no_run
//! use tomlog::{LogContext, LogLevel, LoggingFacade};
//!
//! let facade = LoggingFacade::init("config/logger_config.toml").unwrap();
//! facade.emit(LogLevel::Info, "service started", LogContext::new().with_field("port", 8080));
//!
//! let devices = facade.get_logger("app.devices");
//! devices.warning("no device attached");
//! ```

use crate::core::{
    ErrorContext, LogConfig, LogContext, LogLevel, NamedLogger, Result, RootLogger,
    ROOT_LOGGER_NAME,
};
use crate::paths::ProjectPaths;
use crate::pipeline::LogPipelineBuilder;
use parking_lot::{const_mutex, Mutex};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<LoggingFacade> = OnceLock::new();
static INIT_GUARD: Mutex<()> = const_mutex(());
static INIT_FAILURE_REPORTED: AtomicBool = AtomicBool::new(false);

pub struct LoggingFacade {
    config: LogConfig,
    root: Arc<RootLogger>,
    root_logger: NamedLogger,
}

impl LoggingFacade {
    /// Initialize the process-wide facade from `config_path`.
    ///
    /// Later calls return the existing instance and ignore their argument.
    /// A relative `log_dir` is resolved against [`ProjectPaths::discover`].
    ///
    /// # Errors
    ///
    /// Any startup error from loading the file or building the pipeline; the
    /// facade stays uninitialized and a later call may retry.
    pub fn init<P: AsRef<Path>>(config_path: P) -> Result<&'static LoggingFacade> {
        if let Some(facade) = GLOBAL.get() {
            return Ok(facade);
        }

        let _guard = INIT_GUARD.lock();
        if let Some(facade) = GLOBAL.get() {
            return Ok(facade);
        }

        let config = LogConfig::load(config_path)?;
        let paths = ProjectPaths::discover();
        let facade = Self::from_builder(LogPipelineBuilder::new(&config).base_dir(paths.root()))?;
        Ok(GLOBAL.get_or_init(|| facade))
    }

    /// The process-wide facade, initialized from the default config location
    pub fn global() -> Result<&'static LoggingFacade> {
        match GLOBAL.get() {
            Some(facade) => Ok(facade),
            None => Self::init(ProjectPaths::discover().logger_config()),
        }
    }

    /// The process-wide facade if it has been initialized
    pub fn try_global() -> Option<&'static LoggingFacade> {
        GLOBAL.get()
    }

    /// A standalone facade, independent of the process-wide one
    pub fn from_config(config: LogConfig) -> Result<Self> {
        Self::from_builder(LogPipelineBuilder::new(&config))
    }

    /// A standalone facade from a customized builder
    ///
    /// ```no_run
    /// use tomlog::formatters::Capabilities;
    /// use tomlog::{LogConfig, LogPipelineBuilder, LoggingFacade};
    ///
    /// let config = LogConfig::load("config/logger_config.toml").unwrap();
    /// let facade = LoggingFacade::from_builder(
    ///     LogPipelineBuilder::new(&config).capabilities(Capabilities::none()),
    /// )
    /// .unwrap();
    /// ```
    pub fn from_builder(builder: LogPipelineBuilder<'_>) -> Result<Self> {
        let root = builder.build()?;
        Ok(Self {
            config: builder.config().clone(),
            root_logger: NamedLogger::new(ROOT_LOGGER_NAME, Arc::clone(&root)),
            root,
        })
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub fn root(&self) -> &Arc<RootLogger> {
        &self.root
    }

    /// A logger sharing this facade's sinks and levels
    pub fn get_logger(&self, name: &str) -> NamedLogger {
        NamedLogger::new(name, Arc::clone(&self.root))
    }

    /// Log through the root logger
    pub fn emit(&self, level: LogLevel, message: impl Into<String>, extra: LogContext) {
        self.root_logger.log_with(level, message, extra);
    }

    /// ERROR record through `logger`, highlighted on the console, with the
    /// error section when `error` is given. Never fails.
    pub fn log_exception(
        &self,
        logger: &NamedLogger,
        message: impl Into<String>,
        error: Option<&ErrorContext>,
        extra: LogContext,
    ) {
        logger.exception_with(message, error, extra);
    }

    pub fn flush(&self) -> Result<()> {
        self.root.flush()
    }
}

impl std::fmt::Debug for LoggingFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingFacade")
            .field("root", &self.root)
            .finish()
    }
}

fn with_global(f: impl FnOnce(&LoggingFacade)) {
    match LoggingFacade::global() {
        Ok(facade) => f(facade),
        Err(e) => {
            if !INIT_FAILURE_REPORTED.swap(true, Ordering::Relaxed) {
                eprintln!("[LOGGER ERROR] Logging is not initialized: {}", e);
            }
        }
    }
}

/// DEBUG through the process-wide facade
pub fn debug(message: impl Into<String>) {
    debug_with(message, LogContext::new());
}

/// DEBUG with extra attributes for the formatters
pub fn debug_with(message: impl Into<String>, extra: LogContext) {
    with_global(|f| f.emit(LogLevel::Debug, message, extra));
}

/// INFO through the process-wide facade
pub fn info(message: impl Into<String>) {
    info_with(message, LogContext::new());
}

pub fn info_with(message: impl Into<String>, extra: LogContext) {
    with_global(|f| f.emit(LogLevel::Info, message, extra));
}

/// WARNING through the process-wide facade
pub fn warning(message: impl Into<String>) {
    warning_with(message, LogContext::new());
}

pub fn warning_with(message: impl Into<String>, extra: LogContext) {
    with_global(|f| f.emit(LogLevel::Warning, message, extra));
}

/// ERROR through the process-wide facade
pub fn error(message: impl Into<String>) {
    error_with(message, LogContext::new());
}

pub fn error_with(message: impl Into<String>, extra: LogContext) {
    with_global(|f| f.emit(LogLevel::Error, message, extra));
}

/// CRITICAL through the process-wide facade
pub fn critical(message: impl Into<String>) {
    critical_with(message, LogContext::new());
}

pub fn critical_with(message: impl Into<String>, extra: LogContext) {
    with_global(|f| f.emit(LogLevel::Critical, message, extra));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config(dir: &Path, console: bool) -> LogConfig {
        let mut text = format!(
            "[log]\nlevel = \"INFO\"\nlog_dir = {:?}\nbackup_count = 1\n\
             [log.formatters.default]\nformat = \"{{levelname}} {{name}} {{message}}\"\n",
            dir.to_string_lossy()
        );
        if console {
            text.push_str("[log.handlers.console]\nlevel = \"ERROR\"\n");
        }
        LogConfig::from_toml_str(&text, "inline").unwrap()
    }

    fn log_lines(dir: &Path) -> Vec<String> {
        std::fs::read_to_string(dir.join("app.log"))
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_emit_writes_root_record() {
        let dir = tempfile::tempdir().unwrap();
        let facade = LoggingFacade::from_config(config(dir.path(), false)).unwrap();

        facade.emit(LogLevel::Info, "started", LogContext::new());
        facade.emit(LogLevel::Debug, "hidden", LogContext::new());

        assert_eq!(log_lines(dir.path()), vec!["INFO root started"]);
    }

    #[test]
    fn test_named_loggers_share_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let facade = LoggingFacade::from_config(config(dir.path(), false)).unwrap();

        facade.get_logger("app.devices").warning("disk low");
        facade.get_logger("app.net").error("timeout");

        assert_eq!(
            log_lines(dir.path()),
            vec!["WARNING app.devices disk low", "ERROR app.net timeout"]
        );
    }

    #[test]
    fn test_log_exception_console_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), true);
        let console = Arc::new(Mutex::new(Vec::<u8>::new()));
        let facade = LoggingFacade::from_builder(
            LogPipelineBuilder::new(&cfg).console_writer(console.clone()),
        )
        .unwrap();

        let logger = facade.get_logger("calc");
        let err = ErrorContext::new("ZeroDivisionError", "division by zero");
        facade.log_exception(&logger, "calc failed", Some(&err), LogContext::new());
        facade.log_exception(&logger, "no details", None, LogContext::new());
        facade.flush().unwrap();

        assert_eq!(
            log_lines(dir.path()),
            vec![
                "ERROR calc calc failed",
                "ZeroDivisionError: division by zero",
                "ERROR calc no details",
            ]
        );
        let printed = String::from_utf8(console.lock().clone()).unwrap();
        assert!(printed.starts_with("ERROR calc ❌ calc failed\n"));
        assert!(printed.ends_with("ERROR calc ❌ no details\n"));
    }

    #[test]
    fn test_console_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), true);
        let console = Arc::new(Mutex::new(Vec::<u8>::new()));
        let facade =
            LoggingFacade::from_builder(LogPipelineBuilder::new(&cfg).console_writer(console.clone()))
                .unwrap();

        facade.emit(LogLevel::Warning, "file only", LogContext::new());
        facade.emit(LogLevel::Critical, "everywhere", LogContext::new());

        console.lock().flush().unwrap();
        assert_eq!(
            String::from_utf8(console.lock().clone()).unwrap(),
            "CRITICAL root everywhere\n"
        );
        assert_eq!(log_lines(dir.path()).len(), 2);
    }
}
