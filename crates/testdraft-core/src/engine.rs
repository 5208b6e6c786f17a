//! The allocation reducer.
//!
//! An [`AllocationSet`] is the whole state of a test draft's question
//! distribution. Every user action is an [`Edit`]; applying an edit never
//! mutates the current set, it returns the next one. Identical
//! `(set, edit)` pairs always produce identical results.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::difficulty::{enforce_locked_difficulty, rebalance_difficulty};
use crate::distribute::{clamp_int, distribute_evenly, MAX_QUESTIONS};
use crate::model::{
    Allocation, ControlMode, DifficultyDistribution, DifficultyTier, Entry, LockedTiers,
};
use crate::percentage::{normalize_percentages, rebalance_percentage};
use crate::projection::{recalc_counts_from_percentages, recalc_percentages_from_counts};
use crate::sequence::{build_question_order, QuestionSlot};

/// A single user action against an allocation set.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Replace the selected entries with a new selection from the library.
    SelectEntries(Vec<Entry>),
    /// Edit an entry's percentage share.
    SetPercentage { entry_id: String, value: f64 },
    /// Edit an entry's question count directly.
    SetCount { entry_id: String, value: f64 },
    /// Edit the total number of questions.
    SetTotalQuestions(f64),
    /// Switch which field drives an entry.
    SetControlMode { entry_id: String, mode: ControlMode },
    /// Edit one difficulty tier of an entry.
    SetDifficulty {
        entry_id: String,
        tier: DifficultyTier,
        value: f64,
    },
    /// Lock or unlock one difficulty tier of an entry.
    ToggleDifficultyLock {
        entry_id: String,
        tier: DifficultyTier,
    },
}

/// Ordered allocations plus the test's total question count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSet {
    allocations: Vec<Allocation>,
    total_questions: u64,
    #[serde(default)]
    default_difficulty: DifficultyDistribution,
}

impl Default for AllocationSet {
    fn default() -> Self {
        Self::new(0)
    }
}

impl AllocationSet {
    /// An empty set with the given total.
    pub fn new(total_questions: u64) -> Self {
        Self {
            allocations: Vec::new(),
            total_questions: total_questions.min(MAX_QUESTIONS),
            default_difficulty: DifficultyDistribution::default(),
        }
    }

    /// Use `difficulty` for entries selected from now on. Shares that do not
    /// sum to 100 are rescaled first.
    pub fn with_default_difficulty(mut self, difficulty: DifficultyDistribution) -> Self {
        self.default_difficulty = enforce_locked_difficulty(&difficulty, &LockedTiers::new());
        self
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    pub fn total_questions(&self) -> u64 {
        self.total_questions
    }

    pub fn default_difficulty(&self) -> DifficultyDistribution {
        self.default_difficulty
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    /// Look up an entry's allocation by id.
    pub fn get(&self, entry_id: &str) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.entry.key() == entry_id)
    }

    /// The numbered question sequence for the current allocations.
    pub fn question_order(&self) -> Vec<QuestionSlot> {
        build_question_order(&self.allocations)
    }

    /// Apply one edit and return the resulting set.
    pub fn apply(&self, edit: Edit) -> AllocationSet {
        match edit {
            Edit::SelectEntries(entries) => self.select_entries(entries),
            Edit::SetPercentage { entry_id, value } => self.set_percentage(&entry_id, value),
            Edit::SetCount { entry_id, value } => self.set_count(&entry_id, value),
            Edit::SetTotalQuestions(value) => self.set_total_questions(value),
            Edit::SetControlMode { entry_id, mode } => self.set_control_mode(&entry_id, mode),
            Edit::SetDifficulty {
                entry_id,
                tier,
                value,
            } => self.set_difficulty(&entry_id, tier, value),
            Edit::ToggleDifficultyLock { entry_id, tier } => {
                self.toggle_difficulty_lock(&entry_id, tier)
            }
        }
    }

    /// Apply edits in order.
    pub fn apply_all<I>(&self, edits: I) -> AllocationSet
    where
        I: IntoIterator<Item = Edit>,
    {
        edits
            .into_iter()
            .fold(self.clone(), |state, edit| state.apply(edit))
    }

    fn position(&self, entry_id: &str) -> Option<usize> {
        let index = self.allocations.iter().position(|a| a.entry.key() == entry_id);
        if index.is_none() {
            tracing::debug!("no entry with id '{}', ignoring edit", entry_id);
        }
        index
    }

    fn with_allocations(&self, allocations: Vec<Allocation>, total_questions: u64) -> Self {
        Self {
            allocations,
            total_questions,
            default_difficulty: self.default_difficulty,
        }
    }

    fn select_entries(&self, entries: Vec<Entry>) -> Self {
        let mut seen = HashSet::new();
        let selection: Vec<Entry> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.key().to_string()))
            .collect();

        let previous: HashMap<&str, &Allocation> = self
            .allocations
            .iter()
            .map(|a| (a.entry.key(), a))
            .collect();

        let claimed: u32 = selection
            .iter()
            .filter_map(|entry| previous.get(entry.key()))
            .map(|a| a.question_percentage)
            .sum();
        let fresh = selection
            .iter()
            .filter(|entry| !previous.contains_key(entry.key()))
            .count();
        let mut fresh_shares =
            distribute_evenly(fresh, u64::from(100u32.saturating_sub(claimed))).into_iter();

        let allocations: Vec<Allocation> = selection
            .into_iter()
            .map(|entry| match previous.get(entry.key()) {
                Some(&existing) => Allocation {
                    entry,
                    ..existing.clone()
                },
                None => {
                    let share = fresh_shares.next().unwrap_or(0) as u32;
                    Allocation::new(entry, share, self.default_difficulty)
                }
            })
            .collect();

        tracing::debug!(
            "selection now has {} entries ({} new)",
            allocations.len(),
            fresh
        );

        let allocations = renormalize(allocations);
        let allocations = recalc_counts_from_percentages(&allocations, self.total_questions);
        self.with_allocations(allocations, self.total_questions)
    }

    fn set_percentage(&self, entry_id: &str, value: f64) -> Self {
        let Some(index) = self.position(entry_id) else {
            return self.clone();
        };

        let current: Vec<u32> = self
            .allocations
            .iter()
            .map(|a| a.question_percentage)
            .collect();
        let rebalanced = rebalance_percentage(&current, index, value);

        let mut allocations = with_percentages(self.allocations.clone(), &rebalanced);
        allocations[index].control_mode = ControlMode::Percentage;
        let allocations = recalc_counts_from_percentages(&allocations, self.total_questions);
        self.with_allocations(allocations, self.total_questions)
    }

    fn set_count(&self, entry_id: &str, value: f64) -> Self {
        let Some(index) = self.position(entry_id) else {
            return self.clone();
        };

        let others: u64 = self
            .allocations
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .map(|(_, a)| a.question_count)
            .sum();
        let count = clamp_int(value, 0, MAX_QUESTIONS.saturating_sub(others));

        let mut allocations = self.allocations.clone();
        allocations[index].control_mode = ControlMode::Count;
        allocations[index].question_count = count;

        let total = others + count;
        let allocations = recalc_percentages_from_counts(&allocations, total);
        self.with_allocations(allocations, total)
    }

    fn set_total_questions(&self, value: f64) -> Self {
        let total = clamp_int(value, 0, MAX_QUESTIONS);

        let mut allocations = self.allocations.clone();
        let percentage_sum: u32 = allocations.iter().map(|a| a.question_percentage).sum();
        if total > 0 && percentage_sum == 0 {
            allocations = renormalize(allocations);
        }

        let allocations = recalc_counts_from_percentages(&allocations, total);
        self.with_allocations(allocations, total)
    }

    fn set_control_mode(&self, entry_id: &str, mode: ControlMode) -> Self {
        let Some(index) = self.position(entry_id) else {
            return self.clone();
        };
        let mut next = self.clone();
        next.allocations[index].control_mode = mode;
        next
    }

    fn set_difficulty(&self, entry_id: &str, tier: DifficultyTier, value: f64) -> Self {
        let Some(index) = self.position(entry_id) else {
            return self.clone();
        };
        let mut next = self.clone();
        let allocation = &mut next.allocations[index];
        let locked = allocation.locked_difficulties;
        let rebalanced = rebalance_difficulty(&allocation.difficulty, tier, value, &locked);
        allocation.difficulty = enforce_locked_difficulty(&rebalanced, &locked);
        next
    }

    fn toggle_difficulty_lock(&self, entry_id: &str, tier: DifficultyTier) -> Self {
        let Some(index) = self.position(entry_id) else {
            return self.clone();
        };
        let mut next = self.clone();
        let allocation = &mut next.allocations[index];

        if allocation.locked_difficulties.contains(tier) {
            allocation.locked_difficulties.unlock(tier);
        } else if !allocation.locked_difficulties.lock(tier) {
            tracing::debug!(
                "'{}' already has {} locked tiers, not locking {}",
                entry_id,
                LockedTiers::CAPACITY,
                tier
            );
            return self.clone();
        }

        allocation.difficulty =
            enforce_locked_difficulty(&allocation.difficulty, &allocation.locked_difficulties);
        next
    }
}

fn with_percentages(mut allocations: Vec<Allocation>, percentages: &[u32]) -> Vec<Allocation> {
    for (allocation, &percentage) in allocations.iter_mut().zip(percentages) {
        allocation.question_percentage = percentage;
    }
    allocations
}

fn renormalize(allocations: Vec<Allocation>) -> Vec<Allocation> {
    let current: Vec<u32> = allocations.iter().map(|a| a.question_percentage).collect();
    let normalized = normalize_percentages(&current);
    with_percentages(allocations, &normalized)
}
