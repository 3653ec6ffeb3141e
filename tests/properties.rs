//! Property-based tests over shapes, index conversion and merging.

use bloomforge::core::bit_maps::{self, mod_unsigned};
use bloomforge::core::indices::from_bit_map_extractor;
use bloomforge::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn shape_strategy() -> impl Strategy<Value = Shape> {
    (1usize..20, 1usize..2_000).prop_map(|(k, m)| Shape::from_km(k, m).unwrap())
}

fn shape_and_indices() -> impl Strategy<Value = (Shape, Vec<i32>)> {
    shape_strategy().prop_flat_map(|shape| {
        let m = shape.number_of_bits() as i32;
        (Just(shape), prop::collection::vec(0..m, 0..100))
    })
}

proptest! {
    #[test]
    fn prop_probability_in_unit_interval((k, m, n) in (1usize..30, 1usize..10_000, 1usize..10_000)) {
        let shape = Shape::from_km(k, m).unwrap();
        let p = shape.probability(n);
        prop_assert!(p > 0.0 && p <= 1.0, "probability {} for k={} m={} n={}", p, k, m, n);
        prop_assert!(shape.probability(n + 1) >= p);
    }

    #[test]
    fn prop_from_np_meets_target(n in 1usize..100_000, p in 0.0001f64..0.4) {
        let shape = Shape::from_np(n, p).unwrap();
        prop_assert!(shape.probability(n) <= p * 1.1);
    }

    #[test]
    fn prop_mod_unsigned_matches_u64(dividend in any::<i64>(), divisor in 1i32..i32::MAX) {
        let expected = ((dividend as u64) % (divisor as u64)) as i32;
        prop_assert_eq!(mod_unsigned(dividend, divisor), expected);
    }

    #[test]
    fn prop_bit_map_round_trip_sorted_distinct((shape, indices) in shape_and_indices()) {
        let words = BitMapArray::from_index_extractor(
            &IndexArray::from(indices.clone()),
            shape.number_of_bits(),
        ).unwrap();
        prop_assert_eq!(words.words().len(), shape.number_of_bit_maps());

        let mut expected = indices;
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(from_bit_map_extractor(&words).as_index_array(), expected);
    }

    #[test]
    fn prop_merge_is_idempotent((shape, indices) in shape_and_indices()) {
        let indices = IndexArray::from(indices);

        let mut dense = SimpleBloomFilter::new(shape);
        dense.merge_indices(&indices).unwrap();
        let once = dense.clone();
        dense.merge_indices(&indices).unwrap();
        prop_assert_eq!(&dense, &once);

        let mut sparse = SparseBloomFilter::new(shape);
        sparse.merge_indices(&indices).unwrap();
        let once = sparse.clone();
        sparse.merge_filter(&once).unwrap();
        prop_assert_eq!(&sparse, &once);
    }

    #[test]
    fn prop_dense_and_sparse_agree((shape, indices) in shape_and_indices(), probe in any::<u64>()) {
        let indices = IndexArray::from(indices);
        let mut dense = SimpleBloomFilter::new(shape);
        let mut sparse = SparseBloomFilter::new(shape);
        dense.merge_indices(&indices).unwrap();
        sparse.merge_indices(&indices).unwrap();

        prop_assert_eq!(dense.as_bit_map_array(), sparse.as_bit_map_array());
        prop_assert_eq!(dense.as_index_array(), sparse.as_index_array());
        prop_assert_eq!(dense.cardinality(), sparse.cardinality());

        let hasher = EnhancedDoubleHasher::from_data(&probe.to_le_bytes());
        prop_assert_eq!(
            dense.contains_hasher(&hasher).unwrap(),
            sparse.contains_hasher(&hasher).unwrap()
        );
    }

    #[test]
    fn prop_hasher_indices_in_range(shape in shape_strategy(), initial in any::<i64>(), increment in any::<i64>()) {
        let m = shape.number_of_bits() as i32;
        for hasher in [
            Box::new(SimpleHasher::new(initial, increment)) as Box<dyn Hasher>,
            Box::new(EnhancedDoubleHasher::new(initial, increment)),
        ] {
            let produced = hasher.indices(&shape).as_index_array();
            prop_assert_eq!(produced.len(), shape.number_of_hash_functions());
            prop_assert!(produced.iter().all(|&i| i >= 0 && i < m));
        }
    }
}

fn cells(filter: &SparseCountingBloomFilter) -> Vec<(i32, i32)> {
    let mut pairs = Vec::new();
    filter.process_cells(&mut |index, count| {
        pairs.push((index, count));
        true
    });
    pairs
}

#[test]
fn test_counting_add_then_subtract_restores_counts() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let shape = Shape::from_np(500, 0.01).unwrap();
    let mut filter = SparseCountingBloomFilter::new(shape);

    let items: Vec<EnhancedDoubleHasher> = (0..200)
        .map(|_| EnhancedDoubleHasher::new(rng.gen(), rng.gen()))
        .collect();
    for item in &items[..100] {
        filter.merge_hasher(item).unwrap();
    }
    let snapshot = cells(&filter);

    for item in &items[100..] {
        filter.merge_hasher(item).unwrap();
    }
    for item in &items[100..] {
        filter.remove_hasher(item).unwrap();
    }

    assert!(filter.is_valid());
    assert_eq!(cells(&filter), snapshot);
}

#[test]
fn test_random_bits_land_in_expected_words() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut words = vec![0u64; 3];
    for _ in 0..50 {
        let index: i32 = rng.gen_range(0..192);
        bit_maps::set(&mut words, index);
        assert!(bit_maps::contains(&words, index));
        assert_ne!(words[(index / 64) as usize] & (1u64 << (index % 64)), 0);
    }
}
