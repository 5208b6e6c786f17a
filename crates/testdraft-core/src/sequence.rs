//! Flattening a settled allocation into numbered question slots.

use serde::{Deserialize, Serialize};

use crate::distribute::distribute;
use crate::model::{Allocation, DifficultyDistribution, DifficultyTier};

/// One numbered question slot in the final test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSlot {
    pub question_number: u64,
    pub entry_id: String,
    pub entry_name: String,
    pub difficulty: DifficultyTier,
}

/// Split `count` questions across tiers, in [`DifficultyTier::ORDER`].
pub fn split_by_difficulty(count: u64, difficulty: &DifficultyDistribution) -> [u64; 3] {
    let weights = DifficultyTier::ORDER.map(|tier| f64::from(difficulty.get(tier)));
    let split = distribute(count, &weights);
    [split[0], split[1], split[2]]
}

/// Expand allocations into question slots.
///
/// Entries are visited in order; within an entry, slots run hard, medium,
/// then easy. Numbering starts at 1 and continues across entries, so the
/// sequence length equals the sum of all question counts.
pub fn build_question_order(allocations: &[Allocation]) -> Vec<QuestionSlot> {
    let mut order = Vec::new();
    let mut next_number = 1;

    for allocation in allocations {
        if allocation.question_count == 0 {
            continue;
        }
        let split = split_by_difficulty(allocation.question_count, &allocation.difficulty);
        for (tier, count) in DifficultyTier::ORDER.into_iter().zip(split) {
            for _ in 0..count {
                order.push(QuestionSlot {
                    question_number: next_number,
                    entry_id: allocation.entry.id.clone(),
                    entry_name: allocation.entry.name.clone(),
                    difficulty: tier,
                });
                next_number += 1;
            }
        }
    }

    order
}
