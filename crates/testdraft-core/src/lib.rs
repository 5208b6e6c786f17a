//! testdraft-core — Question allocation engine for test drafting.
//!
//! Given a selection of library entries (books, chapters, subchapters), this
//! crate apportions a test's questions across them, splits each entry's
//! share across difficulty tiers, and lays the result out as a numbered
//! question sequence ready for submission. Every edit is a pure function
//! from one [`engine::AllocationSet`] to the next.

pub mod config;
pub mod difficulty;
pub mod distribute;
pub mod engine;
pub mod error;
pub mod library;
pub mod model;
pub mod parser;
pub mod payload;
pub mod percentage;
pub mod projection;
pub mod report;
pub mod sequence;
