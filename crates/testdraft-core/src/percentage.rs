//! Percentage rebalancing across entries.

use crate::distribute::{clamp_percent, distribute_evenly, distribute_percent, split_with_residual};

/// Set one entry's percentage and redistribute the rest across the others.
///
/// The edited value is clamped into `[0, 100]`. The remaining budget is
/// spread over the other entries in proportion to their current
/// percentages (evenly when they are all zero), with the last of them
/// taking the residual. The whole vector is then normalized so it sums to
/// exactly 100. An out-of-range `edited_index` leaves the values as they
/// are.
pub fn rebalance_percentage(percentages: &[u32], edited_index: usize, new_value: f64) -> Vec<u32> {
    if edited_index >= percentages.len() {
        return percentages.to_vec();
    }

    let value = clamp_percent(new_value);
    let remaining = 100 - value;

    let others: Vec<u32> = percentages
        .iter()
        .enumerate()
        .filter(|&(index, _)| index != edited_index)
        .map(|(_, &p)| p)
        .collect();
    let mut shares = split_with_residual(&others, remaining).into_iter();

    let rebalanced: Vec<u32> = (0..percentages.len())
        .map(|index| {
            if index == edited_index {
                value
            } else {
                shares.next().unwrap_or(0)
            }
        })
        .collect();

    normalize_percentages(&rebalanced)
}

/// Rescale percentages so they sum to exactly 100.
///
/// Vectors already summing to 100 are returned as-is; an all-zero vector
/// becomes an even split.
pub fn normalize_percentages(percentages: &[u32]) -> Vec<u32> {
    if percentages.is_empty() {
        return Vec::new();
    }

    let total: u32 = percentages.iter().sum();
    if total == 100 {
        return percentages.to_vec();
    }
    if total == 0 {
        return distribute_evenly(percentages.len(), 100)
            .into_iter()
            .map(|v| v as u32)
            .collect();
    }

    let weights: Vec<f64> = percentages.iter().map(|&p| f64::from(p)).collect();
    distribute_percent(100, &weights)
}
