//! Benchmarks for Fillwatch history aggregation
//!
//! Run with: cargo bench

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use fillwatch::history::{aggregate, frequency, resolve, trend};
use fillwatch::storage::Event;

/// Events with shuffled timestamps and a small set of repeating levels
fn create_test_events(count: usize) -> Vec<Event> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let offset = (i * 7919) % count;
            Event::with_timestamp(
                1,
                ((i % 90) * 10) as f64,
                true,
                base + Duration::minutes(offset as i64),
            )
        })
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");

    for size in [100, 1000, 10000] {
        let events = create_test_events(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("trend_{}", size), |b| {
            b.iter(|| trend(black_box(&events)))
        });

        group.bench_function(format!("frequency_{}", size), |b| {
            b.iter(|| frequency(black_box(&events)))
        });

        group.bench_function(format!("aggregate_{}", size), |b| {
            b.iter(|| aggregate(black_box(&events)))
        });
    }

    group.finish();
}

fn bench_window(c: &mut Criterion) {
    let now = Utc::now();

    c.bench_function("resolve_six_months", |b| {
        b.iter(|| resolve(black_box("six_months"), now))
    });

    c.bench_function("resolve_unknown", |b| {
        b.iter(|| resolve(black_box("fortnight"), now))
    });
}

criterion_group!(benches, bench_aggregation, bench_window);
criterion_main!(benches);
