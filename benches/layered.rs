//! Layered filter benchmarks: merge with layer rotation, and lookups
//! across a deep chain of layers.

use bloomforge::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn generate_hashers(count: usize) -> Vec<EnhancedDoubleHasher> {
    let xx = XxHasher::new();
    (0..count as u64).map(|i| xx.hasher(&i.to_le_bytes())).collect()
}

fn windowed(shape: Shape, per_layer: usize, depth: usize) -> LayeredBloomFilter<SimpleBloomFilter> {
    let manager = LayerManager::builder()
        .supplier(move || SimpleBloomFilter::new(shape))
        .extend_check(ExtendCheck::advance_on_count(per_layer).unwrap())
        .cleanup(Cleanup::on_max_size(depth).unwrap())
        .build()
        .unwrap();
    LayeredBloomFilter::new(shape, manager).unwrap()
}

/// Merge cost including periodic layer creation and eviction.
fn bench_layered_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("layered_merge");

    let batch_size = 10_000;
    let hashers = generate_hashers(batch_size);
    let shape = Shape::from_np(1_000, 0.01).unwrap();

    group.throughput(Throughput::Elements(batch_size as u64));

    for &depth in &[1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::new("advance_on_count", depth), &depth, |b, &depth| {
            b.iter_batched(
                || windowed(shape, 1_000, depth),
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

    group.bench_function("advance_on_saturation", |b| {
        b.iter_batched(
            || {
                let manager = LayerManager::builder()
                    .supplier(move || SimpleBloomFilter::new(shape))
                    .extend_check(ExtendCheck::advance_on_saturation(1_000.0).unwrap())
                    .cleanup(Cleanup::on_max_size(8).unwrap())
                    .build()
                    .unwrap();
                LayeredBloomFilter::new(shape, manager).unwrap()
            },
            |mut filter| {
                for hasher in &hashers {
                    filter.merge_hasher(black_box(hasher)).unwrap();
                }
                black_box(filter)
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Contains and find scale with the number of layers.
fn bench_layered_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("layered_query");

    let shape = Shape::from_np(1_000, 0.01).unwrap();
    let hashers = generate_hashers(16_000);

    for &depth in &[1usize, 4, 16] {
        let mut filter = windowed(shape, 1_000, depth);
        for hasher in &hashers[..depth * 1_000] {
            filter.merge_hasher(hasher).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("contains", depth), &filter, |b, filter| {
            let mut idx = 0;
            b.iter(|| {
                let result = filter.contains_hasher(black_box(&hashers[idx % hashers.len()]));
                idx += 1;
                black_box(result)
            });
        });

        group.bench_with_input(BenchmarkId::new("find", depth), &filter, |b, filter| {
            let mut idx = 0;
            b.iter(|| {
                let result = filter.find_hasher(black_box(&hashers[idx % hashers.len()]));
                idx += 1;
                black_box(result)
            });
        });

        group.bench_with_input(BenchmarkId::new("flatten", depth), &filter, |b, filter| {
            b.iter(|| black_box(filter.flatten()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_layered_merge, bench_layered_query);
criterion_main!(benches);
