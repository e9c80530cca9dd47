use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io;
use std::sync::Arc;

use primesweep::config::{DivisionMode, PrintMode, SearchConfig};
use primesweep::primality;
use primesweep::search;
use primesweep::sink::ResultSink;

fn run_silent(division_mode: DivisionMode, workers: usize, limit: u32) -> u64 {
    let sink = Arc::new(ResultSink::with_writer(
        PrintMode::Aggregate,
        Box::new(io::sink()),
    ));
    let config = SearchConfig {
        print_mode: PrintMode::Aggregate,
        division_mode,
        worker_count: workers,
        search_limit: limit,
    };
    search::run(&config, &sink).unwrap().primes_found
}

fn bench_is_prime(c: &mut Criterion) {
    c.bench_function("is_prime(2_147_483_647)", |b| {
        b.iter(|| primality::is_prime(black_box(2_147_483_647)));
    });
}

fn bench_static_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("static_range_100k");
    group.sample_size(20);
    for workers in [1usize, 4, 8] {
        group.bench_function(format!("{}_workers", workers), |b| {
            b.iter(|| run_silent(DivisionMode::StaticRange, black_box(workers), 100_000));
        });
    }
    group.finish();
}

fn bench_dynamic_elimination(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_elimination_100k");
    group.sample_size(20);
    for workers in [1usize, 4, 8] {
        group.bench_function(format!("{}_workers", workers), |b| {
            b.iter(|| run_silent(DivisionMode::DynamicElimination, black_box(workers), 100_000));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_is_prime,
    bench_static_range,
    bench_dynamic_elimination,
);
criterion_main!(benches);
