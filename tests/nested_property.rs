// tests/nested_property.rs

use std::collections::HashSet;

use futures::executor::block_on;
use futures::stream::TryStreamExt;
use proptest::prelude::*;

use pipebuild::stream::{flatten, unique, Nested};

/// Split `values` into consecutive groups of the given sizes, nesting each
/// group one level down.
fn grouped(values: &[u8], sizes: &[usize]) -> Nested<u8> {
    let mut rest = values;
    let mut groups = Vec::new();
    for &size in sizes {
        let take = size.min(rest.len());
        let (head, tail) = rest.split_at(take);
        groups.push(head.iter().copied().map(Nested::Leaf).collect::<Nested<u8>>());
        rest = tail;
    }
    groups.push(rest.iter().copied().map(Nested::Leaf).collect());
    groups.into_iter().collect()
}

proptest! {
    #[test]
    fn flatten_preserves_leaf_order(
        values in proptest::collection::vec(any::<u8>(), 0..40),
        sizes in proptest::collection::vec(0..6usize, 0..8),
    ) {
        let flat: Vec<u8> = block_on(flatten(grouped(&values, &sizes)).try_collect()).unwrap();
        prop_assert_eq!(flat, values);
    }

    #[test]
    fn unique_keeps_first_occurrences_in_order(
        values in proptest::collection::vec(0..10u8, 0..40),
        sizes in proptest::collection::vec(0..6usize, 0..8),
    ) {
        let deduped: Vec<u8> = block_on(unique(grouped(&values, &sizes)).try_collect()).unwrap();

        let mut seen = HashSet::new();
        let expected: Vec<u8> = values.iter().copied().filter(|v| seen.insert(*v)).collect();
        prop_assert_eq!(deduped, expected);
    }
}
