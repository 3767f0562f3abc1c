//! Criterion benchmarks for the segmentation hot paths.
//!
//! Benchmarks:
//! 1. RSS gain computation for one partition
//! 2. Full driver run, sequential vs parallel round scans

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use regprice_core::engine::rss_gains;
use regprice_core::{EngineConfig, MaxSplits, MissingPolicy, PriceSeries, Segmenter};

// ── Helpers ──────────────────────────────────────────────────────────

/// Regular price stepping every 90 days with a 7-day promotion each month.
fn make_series(n: usize) -> PriceSeries {
    let prices = (0..n)
        .map(|i| {
            let regular = 10.0 + (i / 90) as f64 * 0.5;
            if i % 30 < 7 {
                regular * 0.8
            } else {
                regular
            }
        })
        .collect();
    PriceSeries::from_prices(prices).expect("bench series is valid")
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_rss_gains(c: &mut Criterion) {
    let mut group = c.benchmark_group("rss_gains");

    for &n in &[365, 1825, 3650] {
        let series = make_series(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| rss_gains(black_box(series.prices()), MissingPolicy::Disqualify));
        });
    }

    group.finish();
}

fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");

    for &n in &[365, 1825, 3650] {
        let series = make_series(n);
        let sequential = Segmenter::new(EngineConfig::new(28, MaxSplits::Unbounded))
            .expect("valid config");
        let parallel =
            Segmenter::new(EngineConfig::new(28, MaxSplits::Unbounded).with_parallel(true))
                .expect("valid config");

        group.bench_with_input(BenchmarkId::new("sequential", n), &n, |b, _| {
            b.iter(|| sequential.run(black_box(&series)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", n), &n, |b, _| {
            b.iter(|| parallel.run(black_box(&series)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rss_gains, bench_segment);
criterion_main!(benches);
