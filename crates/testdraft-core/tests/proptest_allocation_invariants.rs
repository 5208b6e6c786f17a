//! Property-based invariant tests for the allocation engine.
//!
//! These tests replay random edit streams and check the invariants that
//! must hold after every single edit:
//!
//! 1. Question counts sum to the total.
//! 2. Percentages sum to 100 whenever the set is non-empty with a positive total.
//! 3. Every entry's difficulty shares sum to 100.
//! 4. No entry ever holds more than two locked tiers.
//! 5. The question order has one slot per question, numbered from 1.
//! 6. The distributor preserves length and sums to its total.
//! 7. The percentage rebalancer sums to 100 and pins the edited value.

use proptest::prelude::*;
use testdraft_core::distribute::distribute;
use testdraft_core::engine::{AllocationSet, Edit};
use testdraft_core::model::{ControlMode, DifficultyTier, Entry, EntryType, LockedTiers};
use testdraft_core::percentage::rebalance_percentage;

// ── Helpers ─────────────────────────────────────────────────────────────

fn entry(index: usize) -> Entry {
    Entry {
        id: format!("e{index}"),
        entry_type: EntryType::Subchapter,
        name: format!("Section {index}"),
        book_id: "book".into(),
        chapter_id: Some("ch".into()),
        subchapter_id: Some(format!("e{index}")),
    }
}

fn tier_strategy() -> impl Strategy<Value = DifficultyTier> {
    prop_oneof![
        Just(DifficultyTier::Easy),
        Just(DifficultyTier::Medium),
        Just(DifficultyTier::Hard),
    ]
}

/// Entry ids `e0`..`e6`; `e6` is never selected and exercises the unknown-id path.
fn entry_id_strategy() -> impl Strategy<Value = String> {
    (0usize..7).prop_map(|i| format!("e{i}"))
}

fn value_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => (-20i32..=140).prop_map(f64::from),
        1 => -10.0f64..110.0,
        1 => Just(f64::NAN),
    ]
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        1 => proptest::collection::vec(0usize..6, 0..6)
            .prop_map(|ids| Edit::SelectEntries(ids.into_iter().map(entry).collect())),
        3 => (entry_id_strategy(), value_strategy())
            .prop_map(|(entry_id, value)| Edit::SetPercentage { entry_id, value }),
        2 => (entry_id_strategy(), value_strategy())
            .prop_map(|(entry_id, value)| Edit::SetCount { entry_id, value }),
        2 => (-5i32..300).prop_map(|v| Edit::SetTotalQuestions(f64::from(v))),
        1 => (entry_id_strategy(), prop_oneof![Just(ControlMode::Percentage), Just(ControlMode::Count)])
            .prop_map(|(entry_id, mode)| Edit::SetControlMode { entry_id, mode }),
        3 => (entry_id_strategy(), tier_strategy(), value_strategy())
            .prop_map(|(entry_id, tier, value)| Edit::SetDifficulty { entry_id, tier, value }),
        2 => (entry_id_strategy(), tier_strategy())
            .prop_map(|(entry_id, tier)| Edit::ToggleDifficultyLock { entry_id, tier }),
    ]
}

fn check_invariants(set: &AllocationSet) -> Result<(), TestCaseError> {
    let count_sum: u64 = set.allocations().iter().map(|a| a.question_count).sum();
    let pct_sum: u32 = set.allocations().iter().map(|a| a.question_percentage).sum();

    if set.is_empty() {
        prop_assert_eq!(count_sum, 0);
    } else {
        prop_assert_eq!(count_sum, set.total_questions(), "counts drifted: {:?}", set);
        prop_assert!(pct_sum == 0 || pct_sum == 100, "percentages sum to {}", pct_sum);
        if set.total_questions() > 0 {
            prop_assert_eq!(pct_sum, 100, "percentages sum to {}: {:?}", pct_sum, set);
        }
    }

    for allocation in set.allocations() {
        prop_assert_eq!(
            allocation.difficulty.total(),
            100,
            "difficulty of {} is {:?}",
            allocation.entry.id,
            allocation.difficulty
        );
        prop_assert!(allocation.locked_difficulties.len() <= LockedTiers::CAPACITY);
        prop_assert!(allocation.question_percentage <= 100);
    }

    let order = set.question_order();
    prop_assert_eq!(order.len() as u64, count_sum);
    for (index, slot) in order.iter().enumerate() {
        prop_assert_eq!(slot.question_number, index as u64 + 1);
    }

    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1-5. Invariants hold after every edit in a random stream
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn edit_streams_preserve_invariants(
        total in 0u64..200,
        initial in proptest::collection::vec(0usize..6, 1..6),
        edits in proptest::collection::vec(edit_strategy(), 0..40),
    ) {
        let mut set = AllocationSet::new(total)
            .apply(Edit::SelectEntries(initial.into_iter().map(entry).collect()));
        check_invariants(&set)?;

        for edit in edits {
            set = set.apply(edit);
            check_invariants(&set)?;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Replaying the same stream twice gives the same result
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn edit_streams_are_deterministic(
        edits in proptest::collection::vec(edit_strategy(), 0..30),
    ) {
        let start = AllocationSet::new(20)
            .apply(Edit::SelectEntries((0..4).map(entry).collect()));
        let a = start.apply_all(edits.clone());
        let b = start.apply_all(edits);
        prop_assert_eq!(a, b);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Distributor sums
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn distribute_sums_to_total(
        total in 0u64..10_000,
        weights in proptest::collection::vec(0.0f64..1000.0, 1..20),
    ) {
        let shares = distribute(total, &weights);
        prop_assert_eq!(shares.len(), weights.len());
        prop_assert_eq!(shares.iter().sum::<u64>(), total);
    }
}

proptest! {
    #[test]
    fn distribute_zero_weight_gets_nothing_when_others_positive(
        total in 1u64..1000,
        weights in proptest::collection::vec(1.0f64..100.0, 1..8),
    ) {
        let mut with_zero = weights.clone();
        with_zero.push(0.0);
        let shares = distribute(total, &with_zero);
        prop_assert_eq!(*shares.last().unwrap(), 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Percentage rebalancer
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rebalance_percentage_sums_to_100(
        values in proptest::collection::vec(0u32..=100, 2..8),
        index in 0usize..8,
        new_value in 0u32..=100,
    ) {
        let index = index % values.len();
        let result = rebalance_percentage(&values, index, f64::from(new_value));
        prop_assert_eq!(result.len(), values.len());
        prop_assert_eq!(result.iter().sum::<u32>(), 100);
        prop_assert_eq!(result[index], new_value);
    }
}
