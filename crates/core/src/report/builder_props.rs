//! Property tests for the report tree invariants.

use std::collections::BTreeMap;

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::catalog::{AccountCatalog, Classification};

use super::tree::{build_tree, LeafSeed};
use super::types::ReportNode;

fn leaf_code() -> impl Strategy<Value = Classification> {
    prop::collection::vec(1u8..5, 1..4).prop_map(|segments| {
        let code = segments
            .iter()
            .map(|s| format!("{s:02}"))
            .collect::<Vec<_>>()
            .join(".");
        Classification::parse(&code).expect("generated codes are well-formed")
    })
}

fn leaf_seed() -> impl Strategy<Value = LeafSeed> {
    prop::collection::btree_map(
        1u32..=12,
        (-100_000i64..100_000).prop_map(|cents| Decimal::new(cents, 2)),
        1..6,
    )
    .prop_map(|monthly| LeafSeed {
        name: None,
        lines: monthly.len(),
        monthly,
        flipped: 0,
    })
}

fn assert_tree_invariants(node: &ReportNode) {
    if !node.children.is_empty() {
        let mut derived: BTreeMap<u32, Decimal> = BTreeMap::new();
        for child in &node.children {
            assert_tree_invariants(child);
            for (month, value) in &child.monthly {
                *derived.entry(*month).or_insert(Decimal::ZERO) += *value;
            }
        }
        assert_eq!(node.monthly, derived);
        for pair in node.children.windows(2) {
            assert!(pair[0].classification < pair[1].classification);
        }
    }
    assert_eq!(node.total, node.monthly.values().copied().sum::<Decimal>());
}

proptest! {
    /// Every parent's monthly values equal the sum of its children, at
    /// every depth, regardless of which codes were seeded.
    #[test]
    fn parents_always_sum_children(
        seeds in prop::collection::btree_map(leaf_code(), leaf_seed(), 1..12)
    ) {
        let roots = build_tree(seeds, &AccountCatalog::new());
        for root in &roots {
            assert_tree_invariants(root);
        }
        for pair in roots.windows(2) {
            prop_assert!(pair[0].classification < pair[1].classification);
        }
    }

    /// Root totals are stable under re-aggregation.
    #[test]
    fn grand_total_matches_monthly_sums(
        seeds in prop::collection::btree_map(leaf_code(), leaf_seed(), 1..12)
    ) {
        let roots = build_tree(seeds, &AccountCatalog::new());
        let from_months: Decimal = roots
            .iter()
            .flat_map(|r| r.monthly.values())
            .copied()
            .sum();
        let from_totals: Decimal = roots.iter().map(|r| r.total).sum();
        prop_assert_eq!(from_months, from_totals);
    }
}
