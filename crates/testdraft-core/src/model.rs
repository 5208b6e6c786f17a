//! Core data model types for testdraft.
//!
//! These are the types every other module works with: the selectable
//! library entries, the three difficulty tiers and their percentage
//! shares, and the per-entry allocation state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default difficulty shares assigned to newly selected entries.
pub const DEFAULT_DIFFICULTY: DifficultyDistribution = DifficultyDistribution {
    easy: 34,
    medium: 33,
    hard: 33,
};

/// Kind of library content an entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Book,
    Chapter,
    Subchapter,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::Book => write!(f, "book"),
            EntryType::Chapter => write!(f, "chapter"),
            EntryType::Subchapter => write!(f, "subchapter"),
        }
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "book" => Ok(EntryType::Book),
            "chapter" => Ok(EntryType::Chapter),
            "subchapter" => Ok(EntryType::Subchapter),
            other => Err(format!("unknown entry type: {other}")),
        }
    }
}

/// A selectable book, chapter or subchapter included in a test draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Identifier of the referenced content.
    pub id: String,
    /// What kind of content this is.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Display name.
    pub name: String,
    /// Book the content belongs to.
    pub book_id: String,
    /// Parent chapter, for chapters and subchapters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    /// Subchapter identifier, for subchapters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subchapter_id: Option<String>,
}

impl Entry {
    /// Key used to tell entries apart within a selection. Ids are unique
    /// across entry types, so a book and a chapter sharing an id are the
    /// same entry.
    pub fn key(&self) -> &str {
        &self.id
    }
}

/// One of the three difficulty tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    /// Canonical tier order: redistribution walks tiers in this order and
    /// question sequences emit them in this order.
    pub const ORDER: [DifficultyTier; 3] = [
        DifficultyTier::Hard,
        DifficultyTier::Medium,
        DifficultyTier::Easy,
    ];
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyTier::Easy => write!(f, "easy"),
            DifficultyTier::Medium => write!(f, "medium"),
            DifficultyTier::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for DifficultyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(DifficultyTier::Easy),
            "medium" => Ok(DifficultyTier::Medium),
            "hard" => Ok(DifficultyTier::Hard),
            other => Err(format!("unknown difficulty tier: {other}")),
        }
    }
}

/// Percentage shares of the three difficulty tiers. Sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DifficultyDistribution {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl Default for DifficultyDistribution {
    fn default() -> Self {
        DEFAULT_DIFFICULTY
    }
}

impl DifficultyDistribution {
    pub fn new(easy: u32, medium: u32, hard: u32) -> Self {
        Self { easy, medium, hard }
    }

    pub fn get(&self, tier: DifficultyTier) -> u32 {
        match tier {
            DifficultyTier::Easy => self.easy,
            DifficultyTier::Medium => self.medium,
            DifficultyTier::Hard => self.hard,
        }
    }

    pub fn set(&mut self, tier: DifficultyTier, value: u32) {
        match tier {
            DifficultyTier::Easy => self.easy = value,
            DifficultyTier::Medium => self.medium = value,
            DifficultyTier::Hard => self.hard = value,
        }
    }

    pub fn total(&self) -> u32 {
        self.easy + self.medium + self.hard
    }
}

/// Which field the user is driving for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Percentage,
    Count,
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMode::Percentage => write!(f, "percentage"),
            ControlMode::Count => write!(f, "count"),
        }
    }
}

impl FromStr for ControlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "percentage" | "percent" | "%" => Ok(ControlMode::Percentage),
            "count" => Ok(ControlMode::Count),
            other => Err(format!("unknown control mode: {other}")),
        }
    }
}

/// Set of locked difficulty tiers.
///
/// Holds at most `DifficultyTier::ORDER.len() - 1` tiers so one tier is
/// always free to absorb a remainder. Tiers are kept in the order they were
/// locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LockedTiers {
    slots: [Option<DifficultyTier>; MAX_LOCKED_TIERS],
}

const MAX_LOCKED_TIERS: usize = DifficultyTier::ORDER.len() - 1;

impl LockedTiers {
    pub const CAPACITY: usize = MAX_LOCKED_TIERS;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= Self::CAPACITY
    }

    pub fn contains(&self, tier: DifficultyTier) -> bool {
        self.slots.contains(&Some(tier))
    }

    /// Lock a tier. Returns `false` (and changes nothing) when the tier is
    /// already locked or the set is full.
    pub fn lock(&mut self, tier: DifficultyTier) -> bool {
        if self.contains(tier) {
            return false;
        }
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(tier);
                true
            }
            None => false,
        }
    }

    /// Unlock a tier, keeping the remaining tiers in lock order.
    pub fn unlock(&mut self, tier: DifficultyTier) -> bool {
        if !self.contains(tier) {
            return false;
        }
        let remaining: Vec<DifficultyTier> = self.iter().filter(|&t| t != tier).collect();
        self.slots = [None; Self::CAPACITY];
        for (slot, t) in self.slots.iter_mut().zip(remaining) {
            *slot = Some(t);
        }
        true
    }

    /// Locked tiers in lock order.
    pub fn iter(&self) -> impl Iterator<Item = DifficultyTier> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Most recently locked tier.
    pub fn last(&self) -> Option<DifficultyTier> {
        self.iter().last()
    }
}

impl Serialize for LockedTiers {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for LockedTiers {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tiers = Vec::<DifficultyTier>::deserialize(deserializer)?;
        let mut locked = LockedTiers::new();
        for tier in tiers {
            if !locked.contains(tier) && !locked.lock(tier) {
                return Err(serde::de::Error::custom(format!(
                    "at most {} difficulty tiers can be locked",
                    LockedTiers::CAPACITY
                )));
            }
        }
        Ok(locked)
    }
}

/// Count, percentage and difficulty configuration attached to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    #[serde(flatten)]
    pub entry: Entry,
    pub question_count: u64,
    pub question_percentage: u32,
    pub difficulty: DifficultyDistribution,
    #[serde(default)]
    pub control_mode: ControlMode,
    #[serde(default)]
    pub locked_difficulties: LockedTiers,
}

impl Allocation {
    /// A fresh allocation for a newly selected entry.
    pub fn new(entry: Entry, question_percentage: u32, difficulty: DifficultyDistribution) -> Self {
        Self {
            entry,
            question_count: 0,
            question_percentage,
            difficulty,
            control_mode: ControlMode::Percentage,
            locked_difficulties: LockedTiers::new(),
        }
    }
}
