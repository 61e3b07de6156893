//! Console appender implementation

use crate::core::{Appender, LogLevel, LogRecord, LoggerError, Result};
use crate::formatters::Formatter;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Where console output goes
#[derive(Clone, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    /// Shared writer, for embedding and tests
    Writer(Arc<Mutex<dyn Write + Send>>),
}

impl std::fmt::Debug for ConsoleTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsoleTarget::Stdout => f.write_str("Stdout"),
            ConsoleTarget::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// Writes one rendered record per line to standard output
pub struct ConsoleAppender {
    formatter: Formatter,
    min_level: LogLevel,
    target: ConsoleTarget,
}

impl ConsoleAppender {
    pub fn new(formatter: Formatter, min_level: LogLevel) -> Self {
        Self {
            formatter,
            min_level,
            target: ConsoleTarget::Stdout,
        }
    }

    /// Redirect output to a shared writer
    ///
    /// # Example
    ///
    /// ```
    /// use tomlog::appenders::{ConsoleAppender, ConsoleTarget};
    /// use tomlog::formatters::{Formatter, TimestampFormatter};
    /// use tomlog::{Appender, LogLevel, LogRecord};
    /// use parking_lot::Mutex;
    /// use std::sync::Arc;
    ///
    /// let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
    /// let formatter = TimestampFormatter::new("{levelname} {message}", None, "{", "UTC").unwrap();
    /// let mut console = ConsoleAppender::new(Formatter::Plain(formatter), LogLevel::Info)
    ///     .with_target(ConsoleTarget::Writer(buffer.clone()));
    ///
    /// console.append(&LogRecord::new("root", LogLevel::Info, "ready")).unwrap();
    /// assert_eq!(String::from_utf8(buffer.lock().clone()).unwrap(), "INFO ready\n");
    /// ```
    #[must_use]
    pub fn with_target(mut self, target: ConsoleTarget) -> Self {
        self.target = target;
        self
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        match &self.target {
            ConsoleTarget::Stdout => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                writeln!(handle, "{}", line)?;
                handle.flush()
            }
            ConsoleTarget::Writer(writer) => {
                let mut writer = writer.lock();
                writeln!(writer, "{}", line)?;
                writer.flush()
            }
        }
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let line = self.formatter.format(record);
        self.write_line(&line)
            .map_err(|e| LoggerError::writer(format!("console write failed: {}", e)))
    }

    fn flush(&mut self) -> Result<()> {
        match &self.target {
            ConsoleTarget::Stdout => io::stdout().flush()?,
            ConsoleTarget::Writer(writer) => writer.lock().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }

    fn is_console(&self) -> bool {
        true
    }
}
