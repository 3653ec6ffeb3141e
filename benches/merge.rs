//! Merge and query benchmarks across filter representations.
//!
//! Compares the dense, sparse and counting filters on the same hasher
//! workload, plus the raw cost of producing indices.

use bloomforge::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn generate_hashers(count: usize) -> Vec<EnhancedDoubleHasher> {
    let xx = XxHasher::new();
    (0..count as u64).map(|i| xx.hasher(&i.to_le_bytes())).collect()
}

fn new_filter(variant: &str, shape: Shape) -> Box<dyn BloomFilter> {
    match variant {
        "simple" => Box::new(SimpleBloomFilter::new(shape)),
        "sparse" => Box::new(SparseBloomFilter::new(shape)),
        "counting" => Box::new(SparseCountingBloomFilter::new(shape)),
        _ => unreachable!(),
    }
}

/// Merge a batch of hashers into each representation.
fn bench_merge_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_hasher");

    let batch_size = 10_000;
    let shape = Shape::from_np(100_000, 0.01).unwrap();
    let hashers = generate_hashers(batch_size);

    group.throughput(Throughput::Elements(batch_size as u64));

    for variant in ["simple", "sparse", "counting"] {
        group.bench_with_input(BenchmarkId::from_parameter(variant), &variant, |b, &variant| {
            b.iter_batched(
                || new_filter(variant, shape),
                |mut filter| {
                    for hasher in &hashers {
                        filter.merge_hasher(black_box(hasher)).unwrap();
                    }
                    black_box(filter)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Membership queries against a half-full filter.
fn bench_contains_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains_hasher");

    let size = 10_000;
    let shape = Shape::from_np(size, 0.01).unwrap();
    let hashers = generate_hashers(size);

    for variant in ["simple", "sparse", "counting"] {
        let mut filter = new_filter(variant, shape);
        for hasher in &hashers[..size / 2] {
            filter.merge_hasher(hasher).unwrap();
        }

        group.bench_function(variant, |b| {
            let mut idx = 0;
            b.iter(|| {
                let result = filter.contains_hasher(black_box(&hashers[idx % hashers.len()]));
                idx += 1;
                black_box(result)
            });
        });
    }

    group.finish();
}

/// Filter-into-filter merges, which go through the word arrays.
fn bench_merge_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_filter");

    for &items in &[100usize, 1_000, 10_000] {
        let shape = Shape::from_np(items, 0.01).unwrap();
        let mut source = SimpleBloomFilter::new(shape);
        for hasher in generate_hashers(items) {
            source.merge_hasher(&hasher).unwrap();
        }

        group.throughput(Throughput::Bytes((shape.number_of_bit_maps() * 8) as u64));
        group.bench_with_input(BenchmarkId::new("simple", items), &source, |b, source| {
            b.iter_batched(
                || SimpleBloomFilter::new(shape),
                |mut filter| {
                    filter.merge_filter(black_box(source)).unwrap();
                    black_box(filter)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Index production for each hashing strategy.
fn bench_hasher_indices(c: &mut Criterion) {
    let mut group = c.benchmark_group("hasher_indices");

    let shape = Shape::from_np(100_000, 0.001).unwrap();
    group.throughput(Throughput::Elements(shape.number_of_hash_functions() as u64));

    group.bench_function("simple", |b| {
        let hasher = SimpleHasher::new(0x5eed, 0x1234_5678);
        b.iter(|| black_box(hasher.indices(black_box(&shape)).as_index_array()));
    });

    group.bench_function("enhanced_double", |b| {
        let hasher = EnhancedDoubleHasher::new(0x5eed, 0x1234_5678);
        b.iter(|| black_box(hasher.indices(black_box(&shape)).as_index_array()));
    });

    group.bench_function("xxh3_seed", |b| {
        let xx = XxHasher::new();
        b.iter(|| black_box(xx.hasher(black_box(b"benchmark-item"))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_merge_comparison,
    bench_contains_comparison,
    bench_merge_filter,
    bench_hasher_indices,
);

criterion_main!(benches);
