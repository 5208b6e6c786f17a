//! Conversion between percentage space and count space.

use crate::distribute::{distribute, distribute_percent};
use crate::model::Allocation;

/// Derive every entry's question count from its percentage.
///
/// Counts sum to `total_questions`. A zero total zeroes every count.
pub fn recalc_counts_from_percentages(
    allocations: &[Allocation],
    total_questions: u64,
) -> Vec<Allocation> {
    if total_questions == 0 {
        return allocations
            .iter()
            .map(|a| Allocation {
                question_count: 0,
                ..a.clone()
            })
            .collect();
    }

    let weights: Vec<f64> = allocations
        .iter()
        .map(|a| f64::from(a.question_percentage))
        .collect();
    let counts = distribute(total_questions, &weights);

    allocations
        .iter()
        .zip(counts)
        .map(|(a, question_count)| Allocation {
            question_count,
            ..a.clone()
        })
        .collect()
}

/// Derive every entry's percentage from its question count.
///
/// Percentages sum to 100 unless the total is zero, in which case they are
/// all zero.
pub fn recalc_percentages_from_counts(
    allocations: &[Allocation],
    total_questions: u64,
) -> Vec<Allocation> {
    if allocations.is_empty() || total_questions == 0 {
        return allocations
            .iter()
            .map(|a| Allocation {
                question_percentage: 0,
                ..a.clone()
            })
            .collect();
    }

    let weights: Vec<f64> = allocations
        .iter()
        .map(|a| a.question_count as f64)
        .collect();
    let percentages = distribute_percent(100, &weights);

    allocations
        .iter()
        .zip(percentages)
        .map(|(a, question_percentage)| Allocation {
            question_percentage,
            ..a.clone()
        })
        .collect()
}
