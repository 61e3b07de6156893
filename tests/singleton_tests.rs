//! Process-wide facade initialization
//!
//! Lives in its own test binary so the global facade starts uninitialized.

use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;
use tomlog::{LogContext, LogLevel, LoggingFacade};

#[test]
fn test_concurrent_first_use_builds_once() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_dir = temp_dir.path().join("logs");
    let config_path = temp_dir.path().join("logger_config.toml");
    fs::write(
        &config_path,
        format!(
            "[log]\nlevel = \"INFO\"\nlog_dir = {:?}\nbackup_count = 3\n\
             [log.formatters.default]\nformat = \"{{levelname}} {{name}} [{{user}}] {{message}}\"\n",
            log_dir.to_string_lossy()
        ),
    )
    .expect("Failed to write config");

    assert!(LoggingFacade::try_global().is_none());

    const THREADS: usize = 8;
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let path = config_path.clone();
            thread::spawn(move || {
                barrier.wait();
                LoggingFacade::init(&path).expect("init failed") as *const LoggingFacade as usize
            })
        })
        .collect();

    let addresses: Vec<usize> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .collect();
    assert!(addresses.windows(2).all(|w| w[0] == w[1]));

    let facade = LoggingFacade::global().expect("global facade");
    assert!(std::ptr::eq(facade, LoggingFacade::try_global().expect("initialized")));
    assert_eq!(facade.root().appender_count(), 1);

    // Later init calls ignore their argument
    let again = LoggingFacade::init(temp_dir.path().join("does-not-exist.toml")).expect("cached");
    assert!(std::ptr::eq(facade, again));

    facade.emit(LogLevel::Info, "one line", LogContext::new());
    tomlog::facade::warning("via free function");
    tomlog::facade::info_with("login", LogContext::new().with_field("user", "alice"));
    tomlog::facade::debug_with("below threshold", LogContext::new().with_field("user", "bob"));

    let content = fs::read_to_string(log_dir.join("app.log")).expect("Failed to read log");
    assert_eq!(
        content.lines().collect::<Vec<_>>(),
        vec![
            "INFO root [] one line",
            "WARNING root [] via free function",
            "INFO root [alice] login",
        ]
    );
}
