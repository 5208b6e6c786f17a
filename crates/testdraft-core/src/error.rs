//! Draft error types.
//!
//! The allocation engine itself never fails; these errors come from the
//! surfaces around it, such as refusing to submit an unusable draft.

use thiserror::Error;

/// Errors raised when turning a draft into a submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    /// The draft has no selected entries.
    #[error("draft has no entries")]
    NoEntries,

    /// The draft asks for zero questions.
    #[error("draft has no questions (total is 0)")]
    NoQuestions,

    /// An edit referenced an entry that is not part of the draft.
    #[error("unknown entry: {0}")]
    UnknownEntry(String),
}

impl DraftError {
    /// Returns `true` if this error blocks submitting the test.
    pub fn blocks_submission(&self) -> bool {
        matches!(self, DraftError::NoEntries | DraftError::NoQuestions)
    }
}
