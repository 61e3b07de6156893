//! Timed rotating file appender
//!
//! The live file is closed and renamed with a date suffix whenever a record
//! crosses the next rollover boundary. Boundaries follow a [`RotationSchedule`]
//! computed in the configured timezone; backups beyond the retention count are
//! deleted after each rollover.

use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use crate::core::log_level::LogLevel;
use crate::core::log_record::LogRecord;
use crate::formatters::Formatter;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// When the live file rolls over
///
/// # Examples
///
/// ```
/// use tomlog::appenders::When;
///
/// assert_eq!("midnight".parse::<When>().unwrap(), When::Midnight);
/// assert_eq!("h".parse::<When>().unwrap(), When::Hours);
/// assert_eq!("W6".parse::<When>().unwrap(), When::Weekday(6));
/// assert!("W7".parse::<When>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    Seconds,
    Minutes,
    Hours,
    Days,
    /// Local midnight
    Midnight,
    /// Midnight closing the given weekday, Monday = 0
    Weekday(u8),
}

impl FromStr for When {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "S" => Ok(When::Seconds),
            "M" => Ok(When::Minutes),
            "H" => Ok(When::Hours),
            "D" => Ok(When::Days),
            "MIDNIGHT" => Ok(When::Midnight),
            w if w.len() == 2 && w.starts_with('W') => match w.as_bytes()[1] {
                day @ b'0'..=b'6' => Ok(When::Weekday(day - b'0')),
                _ => Err(invalid_when(s)),
            },
            _ => Err(invalid_when(s)),
        }
    }
}

fn invalid_when(value: &str) -> LoggerError {
    LoggerError::config(
        "handlers.file.when",
        format!(
            "unsupported rotation '{}' (expected S, M, H, D, midnight or W0-W6)",
            value
        ),
    )
}

impl When {
    /// strftime pattern of the backup suffix
    pub fn suffix_format(&self) -> &'static str {
        match self {
            When::Seconds => "%Y-%m-%d_%H-%M-%S",
            When::Minutes => "%Y-%m-%d_%H-%M",
            When::Hours => "%Y-%m-%d_%H",
            When::Days | When::Midnight | When::Weekday(_) => "%Y-%m-%d",
        }
    }

    /// Shape of a rendered suffix; `0` marks a digit
    fn suffix_shape(&self) -> &'static str {
        match self {
            When::Seconds => "0000-00-00_00-00-00",
            When::Minutes => "0000-00-00_00-00",
            When::Hours => "0000-00-00_00",
            When::Days | When::Midnight | When::Weekday(_) => "0000-00-00",
        }
    }
}

/// Rollover boundaries for a `when`/`interval` pair in one timezone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationSchedule {
    when: When,
    interval: u32,
    timezone: Tz,
}

impl RotationSchedule {
    /// # Errors
    ///
    /// [`LoggerError::InvalidConfiguration`] for an unknown `when` or a zero
    /// interval.
    pub fn new(when: &str, interval: u32, timezone: Tz) -> Result<Self> {
        let when = when.parse()?;
        if interval == 0 {
            return Err(LoggerError::config(
                "handlers.file.interval",
                "interval must be at least 1",
            ));
        }
        Ok(Self {
            when,
            interval,
            timezone,
        })
    }

    pub fn when(&self) -> When {
        self.when
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// First boundary strictly after `from`
    ///
    /// ```
    /// use tomlog::appenders::RotationSchedule;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let schedule = RotationSchedule::new("midnight", 1, chrono_tz::Asia::Shanghai).unwrap();
    /// let opened = Utc.with_ymd_and_hms(2025, 1, 8, 10, 0, 0).unwrap(); // 18:00 in Shanghai
    /// assert_eq!(
    ///     schedule.next_rollover(opened),
    ///     Utc.with_ymd_and_hms(2025, 1, 8, 16, 0, 0).unwrap()
    /// );
    /// ```
    pub fn next_rollover(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        let n = i64::from(self.interval);
        match self.when {
            When::Seconds => from + Duration::seconds(n),
            When::Minutes => from + Duration::minutes(n),
            When::Hours => from + Duration::hours(n),
            When::Days => from + Duration::days(n),
            When::Midnight => {
                let today = from.with_timezone(&self.timezone).date_naive();
                self.local_midnight(today + Duration::days(n))
            }
            When::Weekday(day) => {
                let today = from.with_timezone(&self.timezone).date_naive();
                let current = today.weekday().num_days_from_monday() as i64;
                // Roll at the midnight that ends `day`
                let wait = (i64::from(day) - current).rem_euclid(7) + 1;
                self.local_midnight(today + Duration::days(wait + 7 * (n - 1)))
            }
        }
    }

    /// Suffix of the backup closed at `rollover_at`: the start of the period
    /// that just ended, rendered in the schedule's timezone
    pub fn suffix(&self, rollover_at: DateTime<Utc>) -> String {
        let n = i64::from(self.interval);
        let local_day = |days: i64| {
            (rollover_at.with_timezone(&self.timezone).date_naive() - Duration::days(days))
                .format(self.when.suffix_format())
                .to_string()
        };
        let start = match self.when {
            When::Midnight => return local_day(n),
            When::Weekday(_) => return local_day(7 * n),
            When::Seconds => rollover_at - Duration::seconds(n),
            When::Minutes => rollover_at - Duration::minutes(n),
            When::Hours => rollover_at - Duration::hours(n),
            When::Days => rollover_at - Duration::days(n),
        };
        start
            .with_timezone(&self.timezone)
            .format(self.when.suffix_format())
            .to_string()
    }

    fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let naive = date.and_time(NaiveTime::MIN);
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            // Midnight skipped by a DST jump
            .or_else(|| {
                self.timezone
                    .from_local_datetime(&(naive + Duration::hours(1)))
                    .earliest()
            })
            .unwrap_or_else(|| self.timezone.from_utc_datetime(&naive))
            .with_timezone(&Utc)
    }
}

/// Resolve an output encoding label such as `utf-8`, `latin1` or `gbk`
///
/// # Errors
///
/// [`LoggerError::InvalidConfiguration`] when the label is unknown.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        LoggerError::config(
            "handlers.file.encoding",
            format!("unsupported encoding '{}'", label),
        )
    })
}

/// File sink with time based rotation
///
/// # Examples
///
/// ```no_run
/// use tomlog::appenders::{RotationSchedule, TimedRotatingFileAppender};
/// use tomlog::formatters::{Formatter, TimestampFormatter};
///
/// let formatter = TimestampFormatter::new("{asctime} {levelname} {message}", None, "{", "UTC").unwrap();
/// let schedule = RotationSchedule::new("midnight", 1, chrono_tz::UTC).unwrap();
/// let appender = TimedRotatingFileAppender::new("/var/log/app.log", Formatter::Plain(formatter), schedule)
///     .unwrap()
///     .with_backup_count(7)
///     .with_compression(true);
/// ```
pub struct TimedRotatingFileAppender {
    path: PathBuf,
    formatter: Formatter,
    min_level: LogLevel,
    schedule: RotationSchedule,
    /// Backups to keep; `0` keeps all of them
    backup_count: usize,
    encoding: &'static Encoding,
    compress: bool,
    writer: Option<BufWriter<File>>,
    rollover_at: DateTime<Utc>,
}

impl TimedRotatingFileAppender {
    /// Open (or create) the live file in append mode.
    ///
    /// The first boundary is computed from the file's modification time when
    /// it already exists, so a stale file rolls over on the first record.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::FileAppenderError`] if the file cannot be opened.
    pub fn new<P: AsRef<Path>>(
        path: P,
        formatter: Formatter,
        schedule: RotationSchedule,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = Self::open(&path)?;

        let opened_at = file
            .metadata()
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Self {
            path,
            formatter,
            min_level: LogLevel::Debug,
            schedule,
            backup_count: 0,
            encoding: UTF_8,
            compress: false,
            writer: Some(BufWriter::new(file)),
            rollover_at: schedule.next_rollover(opened_at),
        })
    }

    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn with_backup_count(mut self, count: usize) -> Self {
        self.backup_count = count;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Gzip each backup after rollover
    #[must_use]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Recompute the first boundary as if the file had been opened at `opened_at`
    #[must_use]
    pub fn starting_at(mut self, opened_at: DateTime<Utc>) -> Self {
        self.rollover_at = self.schedule.next_rollover(opened_at);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rollover_at(&self) -> DateTime<Utc> {
        self.rollover_at
    }

    pub fn schedule(&self) -> &RotationSchedule {
        &self.schedule
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    fn open(path: &Path) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
            })?;
        lock_exclusive(&file, path);
        Ok(file)
    }

    /// Rotated files of this sink, oldest first
    ///
    /// Ordered by period stamp, then by collision number; an unnumbered
    /// backup predates the numbered ones sharing its stamp.
    pub fn backups(&self) -> Result<Vec<PathBuf>> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut backups: Vec<((String, u64), PathBuf)> = fs::read_dir(&dir)
            .map_err(|e| {
                LoggerError::io_operation(
                    "listing backups",
                    format!("cannot read '{}'", dir.display()),
                    e,
                )
            })?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let key = entry.file_name().to_str().and_then(|name| self.backup_key(name))?;
                Some((key, entry.path()))
            })
            .collect();
        backups.sort();
        Ok(backups.into_iter().map(|(_, path)| path).collect())
    }

    /// Sort key of `<file>.<suffix>[.<n>][.gz]`, `None` for anything else
    fn backup_key(&self, name: &str) -> Option<(String, u64)> {
        let file_name = self.path.file_name().and_then(|n| n.to_str())?;
        let rest = name.strip_prefix(file_name)?.strip_prefix('.')?;
        let rest = rest.strip_suffix(".gz").unwrap_or(rest);

        let shape = self.schedule.when.suffix_shape();
        if rest.len() < shape.len() || !rest.is_char_boundary(shape.len()) {
            return None;
        }
        let (stamp, tail) = rest.split_at(shape.len());
        let stamp_ok = stamp
            .bytes()
            .zip(shape.bytes())
            .all(|(c, s)| if s == b'0' { c.is_ascii_digit() } else { c == s });
        if !stamp_ok {
            return None;
        }
        let index = if tail.is_empty() {
            0
        } else {
            let n = tail.strip_prefix('.')?;
            if n.is_empty() || !n.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            n.parse().ok()?
        };
        Some((stamp.to_string(), index))
    }

    /// Free backup name for `suffix`, numbered when the plain one is taken
    fn backup_path(&self, suffix: &str) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log");
        let taken = |p: &Path| p.exists() || gz_path(p).exists();

        let candidate = self.path.with_file_name(format!("{}.{}", file_name, suffix));
        if !taken(&candidate) {
            return candidate;
        }
        (1..)
            .map(|n| self.path.with_file_name(format!("{}.{}.{}", file_name, suffix, n)))
            .find(|p| !taken(p))
            .unwrap_or(candidate)
    }

    /// Close, rename and reopen the live file; `now` is the triggering record's time
    fn rollover(&mut self, now: DateTime<Utc>) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let suffix = self.schedule.suffix(self.rollover_at);
        self.rollover_at = self.schedule.next_rollover(now);

        let result = self.rename_live_file(&suffix);

        let file = Self::open(&self.path).map_err(|e| {
            LoggerError::file_rotation(
                self.path.display().to_string(),
                format!("Failed to create new log file: {}", e),
            )
        })?;
        self.writer = Some(BufWriter::new(file));
        result?;

        self.prune_backups();
        Ok(())
    }

    fn rename_live_file(&self, suffix: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let backup = self.backup_path(suffix);
        fs::rename(&self.path, &backup).map_err(|e| {
            LoggerError::file_rotation(
                self.path.display().to_string(),
                format!("Failed to rotate current log file: {}", e),
            )
        })?;
        if self.compress {
            compress_file(&backup)?;
        }
        Ok(())
    }

    /// Delete the oldest backups beyond `backup_count`
    fn prune_backups(&self) {
        if self.backup_count == 0 {
            return;
        }
        let backups = match self.backups() {
            Ok(backups) => backups,
            Err(e) => {
                eprintln!("[LOGGER WARNING] Cannot list log backups: {}", e);
                return;
            }
        };
        let excess = backups.len().saturating_sub(self.backup_count);
        for old in &backups[..excess] {
            if let Err(e) = fs::remove_file(old) {
                eprintln!(
                    "[LOGGER WARNING] Failed to remove old backup {}: {}",
                    old.display(),
                    e
                );
            }
        }
    }

    fn encode(&self, line: &str) -> Vec<u8> {
        if self.encoding == UTF_16LE {
            line.encode_utf16().flat_map(u16::to_le_bytes).collect()
        } else if self.encoding == UTF_16BE {
            line.encode_utf16().flat_map(u16::to_be_bytes).collect()
        } else {
            // Unmappable characters become numeric character references
            let (bytes, _, _) = self.encoding.encode(line);
            bytes.into_owned()
        }
    }
}

impl Appender for TimedRotatingFileAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        if record.timestamp >= self.rollover_at {
            if let Err(e) = self.rollover(record.timestamp) {
                // Keep logging into whatever file is open
                eprintln!(
                    "[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.",
                    e
                );
                if self.writer.is_none() {
                    let file = Self::open(&self.path)?;
                    self.writer = Some(BufWriter::new(file));
                }
            }
        }

        let mut line = self.formatter.format(record);
        line.push('\n');
        let bytes = self.encode(&line);

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        writer
            .write_all(&bytes)
            .and_then(|()| writer.flush())
            .map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to write log record: {}", e),
                )
            })
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

impl Drop for TimedRotatingFileAppender {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

#[cfg(feature = "file-lock")]
fn lock_exclusive(file: &File, path: &Path) {
    use fs2::FileExt;
    if let Err(e) = file.try_lock_exclusive() {
        eprintln!(
            "[LOGGER WARNING] Could not lock {}: {}. Another process may be writing to it.",
            path.display(),
            e
        );
    }
}

#[cfg(not(feature = "file-lock"))]
fn lock_exclusive(_file: &File, _path: &Path) {}

/// Gzip `path` into `<path>.gz`, removing the original only on success
fn compress_file(path: &Path) -> Result<()> {
    let gz = gz_path(path);
    let mut tmp = gz.clone().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let compress = || -> std::io::Result<()> {
        let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
        let output = BufWriter::with_capacity(64 * 1024, File::create(&tmp)?);
        let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
        std::io::copy(&mut reader, &mut encoder)?;
        encoder.finish()?.flush()?;
        fs::rename(&tmp, &gz)
    };

    if let Err(e) = compress() {
        let _ = fs::remove_file(&tmp);
        return Err(LoggerError::io_operation(
            "compressing log backup",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }
    Ok(())
}
