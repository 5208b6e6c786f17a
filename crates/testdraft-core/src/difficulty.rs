//! Difficulty rebalancing within a single entry.
//!
//! Both operations walk tiers in [`DifficultyTier::ORDER`] and keep the three
//! shares summing to 100. Locked tiers are never used to absorb a change
//! unless nothing else can.

use crate::distribute::{clamp_percent, split_with_residual};
use crate::model::{DifficultyDistribution, DifficultyTier, LockedTiers};

/// Change one tier's share and let the free tiers absorb the difference.
///
/// The changed tier is clamped into `[0, 100 - Σ other locked tiers]`. The
/// tiers that are neither locked nor changed share the remaining budget in
/// proportion to their current values (evenly when those are all zero).
/// When no such tier exists the spillover lands on the changed tier if it
/// is locked itself, otherwise on the first locked tier.
pub fn rebalance_difficulty(
    distribution: &DifficultyDistribution,
    changed: DifficultyTier,
    new_value: f64,
    locked: &LockedTiers,
) -> DifficultyDistribution {
    let mut next = *distribution;

    let locked_sum: u32 = locked
        .iter()
        .filter(|&tier| tier != changed)
        .map(|tier| next.get(tier))
        .sum();
    let ceiling = 100u32.saturating_sub(locked_sum);
    let value = clamp_percent(new_value).min(ceiling);
    next.set(changed, value);

    let adjustable: Vec<DifficultyTier> = DifficultyTier::ORDER
        .into_iter()
        .filter(|&tier| tier != changed && !locked.contains(tier))
        .collect();

    if adjustable.is_empty() {
        let spill_target = if locked.contains(changed) {
            changed
        } else {
            locked
                .iter()
                .find(|&tier| tier != changed)
                .unwrap_or(changed)
        };
        absorb(&mut next, spill_target, 100 - i64::from(locked_sum + value));
        return next;
    }

    let remaining = ceiling - value;
    let current: Vec<u32> = adjustable.iter().map(|&tier| next.get(tier)).collect();
    for (tier, share) in adjustable
        .iter()
        .zip(split_with_residual(&current, remaining))
    {
        next.set(*tier, share);
    }

    next
}

/// Re-pin locked tiers after the lock set changed.
///
/// Locked tiers keep their values; the unlocked tiers share what is left in
/// proportion to their current values. A final pass assigns any shortfall
/// or excess to the last adjustable tier, or to the most recently locked
/// tier when every tier is locked.
pub fn enforce_locked_difficulty(
    distribution: &DifficultyDistribution,
    locked: &LockedTiers,
) -> DifficultyDistribution {
    let mut next = *distribution;

    let locked_sum: u32 = locked.iter().map(|tier| next.get(tier)).sum();
    let adjustable: Vec<DifficultyTier> = DifficultyTier::ORDER
        .into_iter()
        .filter(|&tier| !locked.contains(tier))
        .collect();
    let remaining = 100u32.saturating_sub(locked_sum);

    let current: Vec<u32> = adjustable.iter().map(|&tier| next.get(tier)).collect();
    for (tier, share) in adjustable
        .iter()
        .zip(split_with_residual(&current, remaining))
    {
        next.set(*tier, share);
    }

    let total = next.total();
    if total != 100 {
        let fixup_target = adjustable
            .last()
            .copied()
            .or_else(|| locked.last())
            .unwrap_or(DifficultyTier::Easy);
        absorb(&mut next, fixup_target, 100 - i64::from(total));
    }

    next
}

fn absorb(distribution: &mut DifficultyDistribution, tier: DifficultyTier, delta: i64) {
    let adjusted = (i64::from(distribution.get(tier)) + delta).clamp(0, 100);
    distribution.set(tier, adjusted as u32);
}
