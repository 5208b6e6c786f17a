//! Largest-remainder apportionment and input normalization.
//!
//! Every place that turns real-valued shares into integers that must add up
//! to an exact total goes through [`distribute`].

use std::cmp::Ordering;

/// Largest question count accepted for a single entry or a whole test.
pub const MAX_QUESTIONS: u64 = (1 << 53) - 1;

/// Split `total` into `count` integers that differ by at most one.
///
/// The first `total % count` positions receive the extra unit.
pub fn distribute_evenly(count: usize, total: u64) -> Vec<u64> {
    if count == 0 {
        return Vec::new();
    }
    let base = total / count as u64;
    let remainder = (total % count as u64) as usize;
    (0..count)
        .map(|index| base + u64::from(index < remainder))
        .collect()
}

/// Apportion `total` across `weights` with the largest remainder method.
///
/// The result preserves input order and always sums to `total`. Each share
/// is `weights[i] / Σweights * total` rounded half-up; the rounding error is
/// then walked off one unit at a time. Surplus units go to the largest
/// fractional remainders, deficits are taken from the smallest fractional
/// remainders that are still positive. Equal remainders resolve to the lower
/// index. Negative and NaN weights count as zero. When every weight is zero
/// the total is split evenly.
pub fn distribute(total: u64, weights: &[f64]) -> Vec<u64> {
    if weights.is_empty() {
        return Vec::new();
    }
    if total == 0 {
        return vec![0; weights.len()];
    }

    let weights: Vec<f64> = weights.iter().map(|&w| sanitize_weight(w)).collect();
    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 || !weight_sum.is_finite() {
        return distribute_evenly(weights.len(), total);
    }

    let raw: Vec<f64> = weights
        .iter()
        .map(|w| w / weight_sum * total as f64)
        .collect();
    let mut rounded: Vec<u64> = raw.iter().map(|r| r.round() as u64).collect();
    let fractions: Vec<f64> = raw.iter().map(|r| r - r.floor()).collect();

    let assigned: u64 = rounded.iter().sum();
    match assigned.cmp(&total) {
        Ordering::Equal => {}
        Ordering::Less => {
            // Stable sort: equal fractions keep ascending index order.
            let mut order: Vec<usize> = (0..rounded.len()).collect();
            order.sort_by(|&a, &b| fractions[b].total_cmp(&fractions[a]));

            let mut diff = total - assigned;
            let mut cursor = 0;
            while diff > 0 {
                rounded[order[cursor % order.len()]] += 1;
                diff -= 1;
                cursor += 1;
            }
        }
        Ordering::Greater => {
            let mut order: Vec<usize> = (0..rounded.len()).collect();
            order.sort_by(|&a, &b| fractions[a].total_cmp(&fractions[b]));

            let mut diff = assigned - total;
            let mut cursor = 0;
            while diff > 0 {
                let index = order[cursor % order.len()];
                if rounded[index] > 0 {
                    rounded[index] -= 1;
                    diff -= 1;
                }
                cursor += 1;
            }
        }
    }

    rounded
}

/// Percentage-space convenience wrapper around [`distribute`].
pub fn distribute_percent(total: u32, weights: &[f64]) -> Vec<u32> {
    distribute(u64::from(total), weights)
        .into_iter()
        .map(|v| v as u32)
        .collect()
}

/// Scale `values` so they sum to `budget`, keeping their relative weights.
///
/// Every position before the last is scaled and rounded; the last position
/// takes whatever budget is left, so the result sums to `budget` exactly.
/// A zero-sum input is split evenly and a zero budget yields all zeros.
pub fn split_with_residual(values: &[u32], budget: u32) -> Vec<u32> {
    if values.is_empty() {
        return Vec::new();
    }
    if budget == 0 {
        return vec![0; values.len()];
    }

    let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
    if sum == 0 {
        return distribute_evenly(values.len(), u64::from(budget))
            .into_iter()
            .map(|v| v as u32)
            .collect();
    }

    let residual_index = values.len() - 1;
    let mut allocated = 0u32;
    let mut result = Vec::with_capacity(values.len());
    for (index, &value) in values.iter().enumerate() {
        if index == residual_index {
            result.push(budget - allocated);
        } else {
            let scaled = (f64::from(value) / sum as f64 * f64::from(budget)).round() as u32;
            let share = scaled.min(budget - allocated);
            allocated += share;
            result.push(share);
        }
    }
    result
}

fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Coerce raw text input to a number. Empty or unparseable text becomes 0.
pub fn coerce_input(raw: &str) -> f64 {
    let value = raw.trim().parse::<f64>().unwrap_or(0.0);
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Round `value` to the nearest integer and clamp it into `[min, max]`.
/// NaN becomes `min`.
pub fn clamp_int(value: f64, min: u64, max: u64) -> u64 {
    if value.is_nan() {
        return min;
    }
    let rounded = value.round();
    if rounded <= min as f64 {
        min
    } else if rounded >= max as f64 {
        max
    } else {
        rounded as u64
    }
}

/// [`clamp_int`] into the `[0, 100]` percentage range.
pub fn clamp_percent(value: f64) -> u32 {
    clamp_int(value, 0, 100) as u32
}
