//! Submission payload handed to the test-creation endpoint.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::engine::AllocationSet;
use crate::error::DraftError;
use crate::model::{DifficultyDistribution, Entry};
use crate::sequence::QuestionSlot;

/// Title used when a draft does not name itself.
pub const DEFAULT_TITLE: &str = "Untitled test";

/// One entry's settled allocation, as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryAllocation {
    #[serde(flatten)]
    pub entry: Entry,
    pub question_count: u64,
    pub question_percentage: u32,
    pub difficulty: DifficultyDistribution,
}

/// Everything the test-creation endpoint needs to build a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestPayload {
    pub title: String,
    pub total_questions: u64,
    pub entries: Vec<EntryAllocation>,
    pub question_order: Vec<QuestionSlot>,
}

impl CreateTestPayload {
    /// Build the payload for a settled allocation set.
    ///
    /// Fails when the draft cannot be submitted: no entries, or a total of
    /// zero questions. A blank title falls back to [`DEFAULT_TITLE`].
    pub fn build(title: &str, set: &AllocationSet) -> Result<Self, DraftError> {
        if set.is_empty() {
            return Err(DraftError::NoEntries);
        }
        if set.total_questions() == 0 {
            return Err(DraftError::NoQuestions);
        }

        let title = match title.trim() {
            "" => DEFAULT_TITLE.to_string(),
            trimmed => trimmed.to_string(),
        };

        let entries = set
            .allocations()
            .iter()
            .map(|a| EntryAllocation {
                entry: a.entry.clone(),
                question_count: a.question_count,
                question_percentage: a.question_percentage,
                difficulty: a.difficulty,
            })
            .collect();

        Ok(Self {
            title,
            total_questions: set.total_questions(),
            entries,
            question_order: set.question_order(),
        })
    }
}

/// A consistency problem found in a payload.
#[derive(Debug, Clone)]
pub struct PayloadWarning {
    /// The entry ID (if applicable).
    pub entry_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a payload against the allocation invariants.
pub fn validate_payload(payload: &CreateTestPayload) -> Vec<PayloadWarning> {
    let mut warnings = Vec::new();
    let mut warn = |entry_id: Option<&str>, message: String| {
        warnings.push(PayloadWarning {
            entry_id: entry_id.map(str::to_string),
            message,
        });
    };

    if payload.title.trim().is_empty() {
        warn(None, "title is empty".into());
    }
    if payload.entries.is_empty() {
        warn(None, "payload has no entries".into());
        return warnings;
    }
    if payload.total_questions == 0 {
        warn(None, "total question count is 0".into());
    }

    let mut seen_ids = HashSet::new();
    for entry in &payload.entries {
        if !seen_ids.insert(entry.entry.id.as_str()) {
            warn(
                Some(entry.entry.id.as_str()),
                format!("duplicate entry ID: {}", entry.entry.id),
            );
        }
        if entry.question_percentage > 100 {
            warn(
                Some(entry.entry.id.as_str()),
                format!("percentage {} is above 100", entry.question_percentage),
            );
        }
        let difficulty_total = entry.difficulty.total();
        if difficulty_total != 100 {
            warn(
                Some(entry.entry.id.as_str()),
                format!("difficulty shares sum to {difficulty_total}, expected 100"),
            );
        }
    }

    let percentage_total: u32 = payload.entries.iter().map(|e| e.question_percentage).sum();
    if percentage_total != 100 {
        warn(
            None,
            format!("percentages sum to {percentage_total}, expected 100"),
        );
    }

    let count_total: u64 = payload.entries.iter().map(|e| e.question_count).sum();
    if count_total != payload.total_questions {
        warn(
            None,
            format!(
                "question counts sum to {count_total}, expected {}",
                payload.total_questions
            ),
        );
    }

    if payload.question_order.len() as u64 != payload.total_questions {
        warn(
            None,
            format!(
                "question order has {} slots, expected {}",
                payload.question_order.len(),
                payload.total_questions
            ),
        );
    }
    for (index, slot) in payload.question_order.iter().enumerate() {
        if slot.question_number != index as u64 + 1 {
            warn(
                Some(slot.entry_id.as_str()),
                format!(
                    "question {} is numbered {}",
                    index + 1,
                    slot.question_number
                ),
            );
            break;
        }
    }
    for slot in &payload.question_order {
        if !seen_ids.contains(slot.entry_id.as_str()) {
            warn(
                Some(slot.entry_id.as_str()),
                format!(
                    "question {} references unknown entry {}",
                    slot.question_number, slot.entry_id
                ),
            );
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Edit;
    use crate::model::EntryType;

    fn settled(total: u64, ids: &[&str]) -> AllocationSet {
        let entries = ids
            .iter()
            .map(|id| Entry {
                id: id.to_string(),
                entry_type: EntryType::Book,
                name: format!("Book {id}"),
                book_id: id.to_string(),
                chapter_id: None,
                subchapter_id: None,
            })
            .collect();
        AllocationSet::new(total).apply(Edit::SelectEntries(entries))
    }

    #[test]
    fn build_rejects_unsubmittable_drafts() {
        assert_eq!(
            CreateTestPayload::build("T", &AllocationSet::new(10)),
            Err(DraftError::NoEntries)
        );
        assert_eq!(
            CreateTestPayload::build("T", &settled(0, &["a"])),
            Err(DraftError::NoQuestions)
        );
        assert!(DraftError::NoQuestions.blocks_submission());
        assert!(!DraftError::UnknownEntry("x".into()).blocks_submission());
    }

    #[test]
    fn build_produces_consistent_payload() {
        let payload = CreateTestPayload::build("  Midterm ", &settled(10, &["a", "b", "c"])).unwrap();
        assert_eq!(payload.title, "Midterm");
        assert_eq!(payload.total_questions, 10);
        assert_eq!(payload.entries.len(), 3);
        assert_eq!(payload.question_order.len(), 10);
        assert!(validate_payload(&payload).is_empty());
    }

    #[test]
    fn blank_title_uses_default() {
        let payload = CreateTestPayload::build("   ", &settled(5, &["a"])).unwrap();
        assert_eq!(payload.title, DEFAULT_TITLE);
    }

    #[test]
    fn wire_format_is_camel_case() {
        let payload = CreateTestPayload::build("Quiz", &settled(2, &["a"])).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["totalQuestions"], 2);
        assert_eq!(json["entries"][0]["type"], "book");
        assert_eq!(json["entries"][0]["questionPercentage"], 100);
        assert_eq!(json["entries"][0]["difficulty"]["easy"], 34);
        assert!(json["entries"][0].get("controlMode").is_none());
        assert_eq!(json["questionOrder"][1]["questionNumber"], 2);

        let back: CreateTestPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn validation_flags_broken_invariants() {
        let mut payload = CreateTestPayload::build("Quiz", &settled(4, &["a", "b"])).unwrap();
        payload.entries[0].question_percentage = 70;
        payload.entries[1].difficulty.easy = 0;
        payload.total_questions = 5;

        let messages: Vec<String> = validate_payload(&payload)
            .into_iter()
            .map(|w| w.message)
            .collect();
        assert!(messages.iter().any(|m| m.contains("percentages sum to 120")));
        assert!(messages.iter().any(|m| m.contains("difficulty shares sum to 66")));
        assert!(messages.iter().any(|m| m.contains("question counts sum to 4")));
        assert!(messages.iter().any(|m| m.contains("question order has 4 slots")));
    }

    #[test]
    fn validation_flags_duplicates_and_strays() {
        let mut payload = CreateTestPayload::build("Quiz", &settled(3, &["a", "b"])).unwrap();
        payload.entries[1].entry.id = "a".into();
        payload.question_order[0].question_number = 9;

        let warnings = validate_payload(&payload);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate entry ID")));
        assert!(warnings.iter().any(|w| w.message.contains("numbered 9")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("references unknown entry b")));
    }
}
