//! Catalog regeneration benchmarks
//!
//! Compares a cold rebuild, where every package is ingested, with a warm
//! rebuild over stored records that leaves the catalog file untouched.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use ipa_benchmarks::{clear_records, create_repository, criterion_config};

fn bench_cold_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_rebuild");
    group.sample_size(20);

    for count in [10usize, 100] {
        let (_dir, repository) = create_repository(count, 256 * 1024);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("packages", count), &repository, |b, repository| {
            b.iter_batched(
                || clear_records(repository),
                |_| black_box(repository.rebuild_catalog().unwrap()),
                BatchSize::PerIteration,
            );
        });
    }

    group.finish();
}

fn bench_warm_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("warm_rebuild");

    for count in [10usize, 100, 500] {
        let (_dir, repository) = create_repository(count, 0);
        repository.rebuild_catalog().unwrap();
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("packages", count), &repository, |b, repository| {
            b.iter(|| black_box(repository.rebuild_catalog().unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    name = benches;
    config = criterion_config();
    targets = bench_cold_rebuild, bench_warm_rebuild
);
criterion_main!(benches);
