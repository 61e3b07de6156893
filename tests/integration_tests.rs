//! Integration tests for the logging pipeline
//!
//! These tests verify:
//! - Configuration loading and startup errors
//! - One line per sink per record, with per-sink thresholds
//! - Formatter selection and capability degradation
//! - Exception logging with and without error details
//! - JSON lines with caller attributes
//! - Reconfiguration without duplicated sinks

use parking_lot::Mutex;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tomlog::formatters::{Capabilities, OutputFormatterFactory, Target};
use tomlog::{
    ErrorContext, LogConfig, LogContext, LogLevel, LogPipelineBuilder, LoggerError, LoggingFacade,
    RootLogger,
};

type Buffer = Arc<Mutex<Vec<u8>>>;

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("logger_config.toml");
    fs::write(&path, body).expect("Failed to write config");
    path
}

fn base_config(log_dir: &Path) -> String {
    format!(
        "[log]\nlevel = \"INFO\"\nlog_dir = {:?}\nbackup_count = 3\ntimezone = \"UTC\"\n\
         [log.handlers.file]\nwhen = \"midnight\"\ninterval = 1\nencoding = \"utf-8\"\n\
         [log.formatters.default]\nformat = \"{{levelname}} {{message}}\"\n",
        log_dir.to_string_lossy()
    )
}

fn facade_with_console(config: &LogConfig) -> (LoggingFacade, Buffer) {
    let console: Buffer = Arc::new(Mutex::new(Vec::new()));
    let facade = LoggingFacade::from_builder(
        LogPipelineBuilder::new(config).console_writer(console.clone()),
    )
    .expect("Failed to build pipeline");
    (facade, console)
}

fn console_text(console: &Buffer) -> String {
    String::from_utf8(console.lock().clone()).expect("console output is not UTF-8")
}

fn file_lines(log_dir: &Path) -> Vec<String> {
    fs::read_to_string(log_dir.join("app.log"))
        .expect("Failed to read log file")
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn test_warning_reaches_file_without_console() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_dir = temp_dir.path().join("x");
    let path = write_config(temp_dir.path(), &base_config(&log_dir));

    let config = LogConfig::load(&path).expect("Failed to load config");
    let (facade, console) = facade_with_console(&config);
    facade.emit(LogLevel::Warning, "disk low", LogContext::new());
    facade.flush().expect("Failed to flush");

    let lines = file_lines(&log_dir);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("WARNING disk low"));
    assert!(console_text(&console).is_empty());
}

#[test]
fn test_exception_without_error_context() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = LogConfig::from_toml_str(&base_config(temp_dir.path()), "inline")
        .expect("Failed to parse config");
    let facade = LoggingFacade::from_config(config).expect("Failed to build pipeline");

    let logger = facade.get_logger("worker");
    facade.log_exception(&logger, "job aborted", None, LogContext::new());

    assert_eq!(file_lines(temp_dir.path()), vec!["ERROR job aborted"]);
}

#[test]
fn test_exception_with_error_context() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = LogConfig::from_toml_str(&base_config(temp_dir.path()), "inline")
        .expect("Failed to parse config");
    let facade = LoggingFacade::from_config(config).expect("Failed to build pipeline");

    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "device.cfg missing");
    let error = ErrorContext::from_error(&io_error).with_backtrace("at load_device\nat main");
    facade.log_exception(&facade.get_logger("devices"), "load failed", Some(&error), LogContext::new());

    let content = fs::read_to_string(temp_dir.path().join("app.log")).expect("Failed to read log");
    assert!(content.starts_with("ERROR load failed\n"));
    assert!(content.contains("device.cfg missing"));
    assert!(content.contains("at load_device"));
}

#[test]
fn test_one_line_per_sink() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = format!("{}[log.handlers.console]\nlevel = \"INFO\"\n", base_config(temp_dir.path()));
    let config = LogConfig::from_toml_str(&body, "inline").expect("Failed to parse config");
    let (facade, console) = facade_with_console(&config);

    let logger = facade.get_logger("app");
    logger.info("first");
    logger.error("second");

    assert_eq!(file_lines(temp_dir.path()), vec!["INFO first", "ERROR second"]);
    assert_eq!(console_text(&console), "INFO first\nERROR second\n");
}

#[test]
fn test_console_threshold() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = format!(
        "{}[log.handlers.console]\nlevel = \"WARNING\"\n",
        base_config(temp_dir.path()).replace("level = \"INFO\"", "level = \"DEBUG\"")
    );
    let config = LogConfig::from_toml_str(&body, "inline").expect("Failed to parse config");
    let (facade, console) = facade_with_console(&config);

    for level in LogLevel::ALL {
        facade.emit(level, "msg", LogContext::new());
    }

    let printed = console_text(&console);
    assert_eq!(printed.lines().count(), 3);
    assert!(!printed.contains("DEBUG"));
    assert!(!printed.contains("INFO"));
    assert_eq!(file_lines(temp_dir.path()).len(), 5);
}

#[test]
fn test_template_extra_attributes() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = base_config(temp_dir.path()).replace("{levelname} {message}", "{levelname} [{request_id}] {message}");
    let config = LogConfig::from_toml_str(&body, "inline").expect("Failed to parse config");
    let facade = LoggingFacade::from_config(config).expect("Failed to build pipeline");

    facade.emit(
        LogLevel::Info,
        "handled",
        LogContext::new().with_field("request_id", "r-42"),
    );

    assert_eq!(file_lines(temp_dir.path()), vec!["INFO [r-42] handled"]);
}

#[test]
fn test_control_characters_reach_file_unchanged() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = LogConfig::from_toml_str(&base_config(temp_dir.path()), "inline")
        .expect("Failed to parse config");
    let facade = LoggingFacade::from_config(config).expect("Failed to build pipeline");

    facade.emit(LogLevel::Info, "col1\tcol2", LogContext::new());
    facade.emit(LogLevel::Info, "first\nsecond", LogContext::new());
    facade.flush().expect("Failed to flush");

    let content = fs::read_to_string(temp_dir.path().join("app.log")).expect("Failed to read log");
    assert_eq!(content, "INFO col1\tcol2\nINFO first\nsecond\n");
}

#[cfg(feature = "json")]
#[test]
fn test_json_lines_with_extra() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = format!(
        "{}[log.formatters.json]\nformat = \"%(asctime)s %(levelname)s %(name)s %(message)s\"\n",
        base_config(temp_dir.path()).replace(
            "timezone = \"UTC\"\n",
            "timezone = \"UTC\"\nuse_json = true\n"
        )
    );
    let config = LogConfig::from_toml_str(&body, "inline").expect("Failed to parse config");
    let facade = LoggingFacade::from_config(config).expect("Failed to build pipeline");

    facade.get_logger("api").log_with(
        LogLevel::Info,
        "user login",
        LogContext::new().with_field("k", "v").with_field("attempt", 2),
    );

    let lines = file_lines(temp_dir.path());
    assert_eq!(lines.len(), 1);
    let value: serde_json::Value = serde_json::from_str(&lines[0]).expect("line is not JSON");
    assert_eq!(value["k"], "v");
    assert_eq!(value["attempt"], 2);
    assert_eq!(value["levelname"], "INFO");
    assert_eq!(value["name"], "api");
    assert_eq!(value["message"], "user login");
    assert!(value["asctime"].is_string());
}

#[test]
fn test_structured_unavailable_falls_back() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = base_config(temp_dir.path())
        .replace("timezone = \"UTC\"\n", "timezone = \"UTC\"\nuse_json = true\n");
    let config = LogConfig::from_toml_str(&body, "inline").expect("Failed to parse config");

    let factory = OutputFormatterFactory::new(Capabilities::none());
    let formatter = factory.create(Target::File, &config).expect("fallback must not fail");
    assert_eq!(formatter.kind(), "plain");

    let facade = LoggingFacade::from_builder(
        LogPipelineBuilder::new(&config).capabilities(Capabilities::none()),
    )
    .expect("Failed to build pipeline");
    facade.emit(LogLevel::Info, "plain text", LogContext::new());
    assert_eq!(file_lines(temp_dir.path()), vec!["INFO plain text"]);
}

#[cfg(feature = "color")]
#[test]
fn test_colored_console_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = format!(
        "{}[log.handlers.console]\n[log.formatters.colored]\nformat = \"{{log_color}}{{levelname}}: {{message}}\"\n\
         [log.formatters.colored.colors]\nWARNING = \"bold_yellow\"\n",
        base_config(temp_dir.path())
    );
    let config = LogConfig::from_toml_str(&body, "inline").expect("Failed to parse config");
    let (facade, console) = facade_with_console(&config);

    facade.emit(LogLevel::Info, "ready", LogContext::new());
    facade.emit(LogLevel::Warning, "slow", LogContext::new());

    let printed = console_text(&console);
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines[0], "\x1b[32mINFO: ready\x1b[0m");
    assert_eq!(lines[1], "\x1b[1;33mWARNING: slow\x1b[0m");
    // The file sink keeps the plain formatter
    assert_eq!(file_lines(temp_dir.path()), vec!["INFO ready", "WARNING slow"]);
}

#[test]
fn test_missing_config_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let err = LogConfig::load(temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, LoggerError::ConfigLoad { .. }));
    assert!(err.is_startup_error());
}

#[test]
fn test_config_without_log_table() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_config(temp_dir.path(), "[server]\nport = 80\n");
    let err = LogConfig::load(&path).unwrap_err();
    assert!(matches!(err, LoggerError::ConfigLoad { .. }));
}

#[test]
fn test_invalid_timezone_is_fatal() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = base_config(temp_dir.path()).replace("\"UTC\"", "\"Mars/Olympus_Mons\"");
    let config = LogConfig::from_toml_str(&body, "inline").expect("Failed to parse config");
    let err = LoggingFacade::from_config(config).unwrap_err();
    assert!(matches!(err, LoggerError::InvalidTimezone { .. }));
}

#[test]
fn test_reconfigure_does_not_duplicate_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = format!("{}[log.handlers.console]\n", base_config(temp_dir.path()));
    let config = LogConfig::from_toml_str(&body, "inline").expect("Failed to parse config");
    let console: Buffer = Arc::new(Mutex::new(Vec::new()));
    let builder = LogPipelineBuilder::new(&config).console_writer(console.clone());

    let root = Arc::new(RootLogger::new(LogLevel::Debug));
    builder.configure(&root).expect("first configure");
    builder.configure(&root).expect("second configure");
    assert_eq!(root.appender_count(), 2);

    tomlog::NamedLogger::new("app", root.clone()).info("once");
    assert_eq!(console_text(&console), "INFO once\n");
    assert_eq!(root.metrics().total_logged(), 1);
}
