use std::hint::black_box;
use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};

use tintlog::header::{format_header, itoa, Caller, Flags};
use tintlog::{Destination, FixedClock, Level, Logger};

fn bench_itoa_padded(c: &mut Criterion) {
    let mut buf = Vec::with_capacity(32);
    c.bench_function("itoa_padded", |b| {
        b.iter(|| {
            buf.clear();
            itoa(&mut buf, black_box(123), black_box(6));
        });
    });
}

fn bench_header_std(c: &mut Criterion) {
    let now = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_micro_opt(3, 4, 5, 678_901)
        .unwrap();
    let mut buf = Vec::with_capacity(64);
    c.bench_function("header_std", |b| {
        b.iter(|| {
            buf.clear();
            format_header(&mut buf, black_box(Flags::STD), &now, None);
        });
    });
}

fn bench_header_full(c: &mut Criterion) {
    let now = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_micro_opt(3, 4, 5, 678_901)
        .unwrap();
    let caller = Caller {
        file: "src/net/connection/handshake.rs",
        line: 412,
    };
    let flags = Flags::DATE | Flags::MICROSECONDS | Flags::SHORT_FILE;
    let mut buf = Vec::with_capacity(96);
    c.bench_function("header_full", |b| {
        b.iter(|| {
            buf.clear();
            format_header(&mut buf, black_box(flags), &now, Some(caller));
        });
    });
}

fn bench_logger_sink(c: &mut Criterion) {
    let now = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap();
    let logger = Logger::with_clock("bench", Arc::new(FixedClock(now)));
    logger.set_destination(Destination::writer(std::io::sink()));

    c.bench_function("logger_infof_sink", |b| {
        b.iter(|| {
            black_box(logger.infof(format_args!("request {} took {}ms", black_box(42), 17)));
        });
    });

    logger.set_level(Level::Warn);
    c.bench_function("logger_infof_suppressed", |b| {
        b.iter(|| {
            black_box(logger.infof(format_args!("request {} took {}ms", black_box(42), 17)));
        });
    });
}

criterion_group!(
    benches,
    bench_itoa_padded,
    bench_header_std,
    bench_header_full,
    bench_logger_sink
);
criterion_main!(benches);
