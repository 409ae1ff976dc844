use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{Duration, TimeZone, Utc};
use revdesk_core::{RecordId, UserId};
use revdesk_reporting::{
    PageRequest, RevenueDraft, RevenueFilter, RevenueRecord, normalize_timestamp,
    paginate_records, summarize_by_owner,
};

fn dataset(rows: usize, owners: u64) -> Vec<RevenueRecord> {
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    (0..rows)
        .map(|i| {
            let at = base + Duration::minutes(i as i64 * 17);
            let draft = RevenueDraft {
                expenditure: 100.0 + i as f64,
                revenue: 150.0 + (i % 7) as f64 * 10.0,
                order_count: (i % 11) as i64,
                ad_creation_count: 1,
                record_time: at.format("%Y-%m-%d %H:%M:%S").to_string(),
                ..RevenueDraft::default()
            };
            RevenueRecord::create(
                RecordId::new(i as u64 + 1),
                UserId::new(i as u64 % owners + 1),
                draft,
                base,
            )
            .unwrap()
        })
        .collect()
}

fn bench_timestamp_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestamp_normalization");

    for input in [
        "2025-03-10",
        "2025-03-10 16:08",
        "2025-03-10T16:08:00Z",
        "2025-03-10T16:08:00.250Z",
        "not a timestamp",
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(input), input, |b, input| {
            b.iter(|| normalize_timestamp(black_box(input)));
        });
    }

    group.finish();
}

fn bench_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("revenue_listing");

    for size in [100usize, 1_000, 10_000] {
        let rows = dataset(size, 25);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("paginate", size), &rows, |b, rows| {
            b.iter(|| {
                paginate_records(
                    black_box(rows),
                    &RevenueFilter::default(),
                    PageRequest::new(3, 20),
                )
            });
        });
    }

    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("owner_summary");

    for owners in [5u64, 50, 500] {
        let rows = dataset(10_000, owners);
        group.bench_with_input(BenchmarkId::new("owners", owners), &rows, |b, rows| {
            b.iter(|| {
                summarize_by_owner(
                    black_box(rows),
                    &RevenueFilter::default(),
                    PageRequest::default(),
                    |id| Some(format!("user-{id}")),
                )
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_timestamp_normalization,
    bench_listing,
    bench_summary
);
criterion_main!(benches);
