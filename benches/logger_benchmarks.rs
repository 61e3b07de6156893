//! Criterion benchmarks for tomlog

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use tomlog::appenders::{RotationSchedule, TimedRotatingFileAppender};
use tomlog::formatters::{Formatter, TimestampFormatter};
use tomlog::prelude::*;

fn sample_record() -> LogRecord {
    LogRecord::new("bench.module", LogLevel::Info, "Processing request for user 42")
        .with_location(file!(), line!(), module_path!())
        .with_extra(
            LogContext::new()
                .with_field("request_id", "abc-123")
                .with_field("latency_ms", 17),
        )
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatters(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatters");
    group.throughput(Throughput::Elements(1));
    let record = sample_record();

    let brace = TimestampFormatter::new(
        "{asctime} | {levelname:<8} | {name}:{lineno} | {message}",
        Some("%Y-%m-%d %H:%M:%S"),
        "{",
        "Asia/Shanghai",
    )
    .unwrap();
    group.bench_function("plain_brace", |b| {
        b.iter(|| black_box(brace.format(black_box(&record))));
    });

    let percent = TimestampFormatter::new(
        "%(asctime)s %(levelname)-8s %(name)s %(message)s",
        None,
        "%",
        "UTC",
    )
    .unwrap();
    group.bench_function("plain_percent", |b| {
        b.iter(|| black_box(percent.format(black_box(&record))));
    });

    #[cfg(feature = "color")]
    {
        let colored = tomlog::formatters::ColoredFormatter::new(
            "{log_color}{asctime} {levelname:<8}{reset} {message}",
            Some("%H:%M:%S"),
            "{",
            "UTC",
            &Default::default(),
        )
        .unwrap();
        group.bench_function("colored", |b| {
            b.iter(|| black_box(colored.format(black_box(&record))));
        });
    }

    #[cfg(feature = "json")]
    {
        let json = tomlog::formatters::JsonFormatter::new(
            "%(asctime)s %(levelname)s %(name)s %(message)s",
            "%",
            "UTC",
        )
        .unwrap();
        group.bench_function("json", |b| {
            b.iter(|| black_box(json.format(black_box(&record))));
        });
    }

    group.finish();
}

// ============================================================================
// Emission Benchmarks
// ============================================================================

fn bench_emission(c: &mut Criterion) {
    let mut group = c.benchmark_group("emission");
    group.throughput(Throughput::Elements(1));

    let filtered = NamedLogger::new("bench", Arc::new(RootLogger::new(LogLevel::Error)));
    group.bench_function("below_threshold", |b| {
        b.iter(|| filtered.info(black_box("dropped")));
    });

    let temp_dir = tempfile::tempdir().unwrap();
    let formatter = Formatter::Plain(
        TimestampFormatter::new("{asctime} {levelname} {message}", None, "{", "UTC").unwrap(),
    );
    let schedule = RotationSchedule::new("midnight", 1, chrono_tz::UTC).unwrap();
    let appender =
        TimedRotatingFileAppender::new(temp_dir.path().join("bench.log"), formatter, schedule)
            .unwrap();
    let root = Arc::new(RootLogger::new(LogLevel::Debug));
    root.add_appender(Box::new(appender));
    let logger = NamedLogger::new("bench", root);

    group.bench_function("file_sink", |b| {
        b.iter(|| logger.info(black_box("Benchmark message written to file")));
    });

    group.bench_function("file_sink_with_extra", |b| {
        b.iter(|| {
            logger.log_with(
                LogLevel::Info,
                black_box("with attributes"),
                LogContext::new().with_field("iteration", 1),
            )
        });
    });

    group.finish();
}

criterion_group!(benches, bench_formatters, bench_emission);
criterion_main!(benches);
