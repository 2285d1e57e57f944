//! Property-based tests for capacity planning and timing aggregation

use proptest::prelude::*;
use std::time::Duration;
use xfsbench::capacity::{safe_budget, safe_item_count};
use xfsbench::timing::{TaskOutcome, TimingSet};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_plan_fits_budget(
        free in 0u64..(1u64 << 50),
        per_item in 1u64..(1u64 << 30),
        desired in 0usize..100_000,
    ) {
        let count = safe_item_count(free, per_item, desired);
        prop_assert!(count <= desired);
        prop_assert!((count as u128) * (per_item as u128) <= safe_budget(free) as u128);
        prop_assert!(safe_budget(free) as f64 <= free as f64 * 0.95 + 1.0);
    }

    #[test]
    fn prop_plan_is_maximal(
        free in 0u64..(1u64 << 50),
        per_item in 1u64..(1u64 << 30),
        desired in 0usize..100_000,
    ) {
        // One more item would either exceed the request or the budget
        let count = safe_item_count(free, per_item, desired);
        let one_more = (count as u128 + 1) * per_item as u128;
        prop_assert!(count == desired || one_more > safe_budget(free) as u128);
    }

    #[test]
    fn prop_zero_free_space_plans_nothing(
        per_item in 1u64..u64::MAX,
        desired in 0usize..100_000,
    ) {
        prop_assert_eq!(safe_item_count(0, per_item, desired), 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_timing_set_accounts_every_outcome(
        outcomes in prop::collection::vec(prop::option::of(0u64..1_000_000), 0..200),
    ) {
        let outcomes: Vec<TaskOutcome> = outcomes
            .into_iter()
            .map(|o| o.map(Duration::from_micros))
            .collect();
        let set = TimingSet::from_outcomes(&outcomes);

        prop_assert_eq!(set.attempted(), outcomes.len());
        prop_assert_eq!(set.failed, outcomes.iter().filter(|o| o.is_none()).count());

        match set.average() {
            None => prop_assert!(set.samples.is_empty()),
            Some(avg) => {
                let max = set.samples.iter().max().copied().unwrap_or_default();
                let min = set.samples.iter().min().copied().unwrap_or_default();
                prop_assert!(avg <= max && avg >= min);
            }
        }
    }
}
