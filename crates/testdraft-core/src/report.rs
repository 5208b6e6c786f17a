//! Draft report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::DifficultyTier;
use crate::payload::CreateTestPayload;

/// A settled draft, ready to hand to the test-creation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Headline numbers for the draft.
    pub summary: DraftSummary,
    /// The submission payload.
    pub payload: CreateTestPayload,
}

/// Question totals for a draft, per tier as laid out in the question order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSummary {
    pub title: String,
    pub entry_count: usize,
    pub total_questions: u64,
    pub hard: u64,
    pub medium: u64,
    pub easy: u64,
}

impl DraftSummary {
    pub fn from_payload(payload: &CreateTestPayload) -> Self {
        let mut summary = Self {
            title: payload.title.clone(),
            entry_count: payload.entries.len(),
            total_questions: payload.total_questions,
            ..Self::default()
        };
        for slot in &payload.question_order {
            match slot.difficulty {
                DifficultyTier::Hard => summary.hard += 1,
                DifficultyTier::Medium => summary.medium += 1,
                DifficultyTier::Easy => summary.easy += 1,
            }
        }
        summary
    }
}

impl DraftReport {
    /// Wrap a payload in a new report stamped with the current time.
    pub fn new(payload: CreateTestPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            summary: DraftSummary::from_payload(&payload),
            payload,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: DraftReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// File name used when writing this report into an output directory.
    pub fn file_name(&self) -> String {
        format!("draft-{}.json", self.id)
    }
}
