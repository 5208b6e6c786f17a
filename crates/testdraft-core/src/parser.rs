//! TOML draft parser.
//!
//! A draft file names the selected entries and, optionally, a scripted
//! stream of edits to replay against them. Drafts are loaded from single
//! files or whole directories, and can be checked for common mistakes.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::TestDraftConfig;
use crate::distribute::coerce_input;
use crate::engine::{AllocationSet, Edit};
use crate::error::DraftError;
use crate::library::{order_selection, LibraryBook};
use crate::model::{ControlMode, DifficultyTier, Entry, EntryType};

/// A parsed draft: what was selected and what edits to replay.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    /// Test title. Empty when the file does not set one.
    pub title: String,
    /// Starting total; `None` uses the configured default.
    pub total_questions: Option<u64>,
    /// Selected entries in canonical order.
    pub entries: Vec<Entry>,
    /// Edits replayed after selection, in file order.
    pub edits: Vec<Edit>,
}

impl Draft {
    /// Replay the draft from an empty set and return the settled allocation.
    pub fn settle(&self, config: &TestDraftConfig) -> AllocationSet {
        let total = self
            .total_questions
            .unwrap_or(config.default_total_questions);
        let selected = AllocationSet::new(total)
            .with_default_difficulty(config.default_difficulty)
            .apply(Edit::SelectEntries(self.entries.clone()));
        tracing::debug!(
            "replaying {} edits over {} entries",
            self.edits.len(),
            selected.len()
        );
        selected.apply_all(self.edits.iter().cloned())
    }

    /// The draft's title, or the configured default when it has none.
    pub fn title_or_default<'a>(&'a self, config: &'a TestDraftConfig) -> &'a str {
        if self.title.trim().is_empty() {
            &config.default_title
        } else {
            &self.title
        }
    }
}

/// Intermediate TOML structure for parsing draft files.
#[derive(Debug, Deserialize)]
struct TomlDraftFile {
    #[serde(default)]
    draft: TomlDraftHeader,
    #[serde(default)]
    library: Vec<LibraryBook>,
    #[serde(default)]
    entries: Vec<TomlEntry>,
    #[serde(default)]
    edits: Vec<TomlEdit>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlDraftHeader {
    #[serde(default)]
    title: String,
    #[serde(default)]
    total_questions: Option<TomlNumber>,
}

#[derive(Debug, Deserialize)]
struct TomlEntry {
    id: String,
    #[serde(rename = "type")]
    entry_type: String,
    name: String,
    #[serde(default)]
    book_id: Option<String>,
    #[serde(default)]
    chapter_id: Option<String>,
    #[serde(default)]
    subchapter_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TomlEdit {
    Percentage { entry: String, value: TomlNumber },
    Count { entry: String, value: TomlNumber },
    Total { value: TomlNumber },
    Mode { entry: String, mode: String },
    Difficulty {
        entry: String,
        tier: String,
        value: TomlNumber,
    },
    Lock { entry: String, tier: String },
}

/// Numeric input as typed by a user: a number or free text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TomlNumber {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl TomlNumber {
    fn value(&self) -> f64 {
        match self {
            TomlNumber::Integer(i) => *i as f64,
            TomlNumber::Float(f) => *f,
            TomlNumber::Text(s) => coerce_input(s),
        }
    }
}

/// Parse a single TOML file into a `Draft`.
pub fn parse_draft(path: &Path) -> Result<Draft> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read draft file: {}", path.display()))?;

    parse_draft_str(&content, path)
}

/// Parse a TOML string into a `Draft` (useful for testing).
pub fn parse_draft_str(content: &str, source_path: &Path) -> Result<Draft> {
    let parsed: TomlDraftFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let entries = parsed
        .entries
        .into_iter()
        .map(|e| -> Result<Entry> {
            let entry_type: EntryType = e
                .entry_type
                .parse()
                .map_err(|err: String| anyhow::anyhow!("entry '{}': {}", e.id, err))?;
            let book_id = match (entry_type, e.book_id) {
                (_, Some(book_id)) => book_id,
                (EntryType::Book, None) => e.id.clone(),
                (_, None) => anyhow::bail!("entry '{}': {} needs a book_id", e.id, entry_type),
            };
            Ok(Entry {
                id: e.id,
                entry_type,
                name: e.name,
                book_id,
                chapter_id: e.chapter_id,
                subchapter_id: e.subchapter_id,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let entries = if parsed.library.is_empty() {
        entries
    } else {
        order_selection(&entries, &parsed.library)
    };

    let known: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    let check_entry = |id: String| -> Result<String> {
        if known.contains(id.as_str()) {
            Ok(id)
        } else {
            Err(DraftError::UnknownEntry(id).into())
        }
    };
    let parse_tier = |tier: &str| -> Result<DifficultyTier> {
        tier.parse().map_err(|e: String| anyhow::anyhow!("{}", e))
    };

    let edits = parsed
        .edits
        .into_iter()
        .map(|edit| -> Result<Edit> {
            Ok(match edit {
                TomlEdit::Percentage { entry, value } => Edit::SetPercentage {
                    entry_id: check_entry(entry)?,
                    value: value.value(),
                },
                TomlEdit::Count { entry, value } => Edit::SetCount {
                    entry_id: check_entry(entry)?,
                    value: value.value(),
                },
                TomlEdit::Total { value } => Edit::SetTotalQuestions(value.value()),
                TomlEdit::Mode { entry, mode } => Edit::SetControlMode {
                    entry_id: check_entry(entry)?,
                    mode: mode
                        .parse::<ControlMode>()
                        .map_err(|e| anyhow::anyhow!("{}", e))?,
                },
                TomlEdit::Difficulty { entry, tier, value } => Edit::SetDifficulty {
                    entry_id: check_entry(entry)?,
                    tier: parse_tier(&tier)?,
                    value: value.value(),
                },
                TomlEdit::Lock { entry, tier } => Edit::ToggleDifficultyLock {
                    entry_id: check_entry(entry)?,
                    tier: parse_tier(&tier)?,
                },
            })
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid edit in {}", source_path.display()))?;

    let total_questions = parsed
        .draft
        .total_questions
        .map(|n| crate::distribute::clamp_int(n.value(), 0, crate::distribute::MAX_QUESTIONS));

    Ok(Draft {
        title: parsed.draft.title,
        total_questions,
        entries,
        edits,
    })
}

/// Recursively load all `.toml` draft files from a directory.
pub fn load_draft_directory(dir: &Path) -> Result<Vec<Draft>> {
    let mut drafts = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            drafts.extend(load_draft_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_draft(&path) {
                Ok(draft) => drafts.push(draft),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(drafts)
}

/// A warning from draft validation.
#[derive(Debug, Clone)]
pub struct DraftWarning {
    /// The entry ID (if applicable).
    pub entry_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a draft for common issues.
pub fn validate_draft(draft: &Draft) -> Vec<DraftWarning> {
    let mut warnings = Vec::new();

    if draft.entries.is_empty() {
        warnings.push(DraftWarning {
            entry_id: None,
            message: "draft selects no entries".into(),
        });
    }

    if draft.total_questions == Some(0) {
        warnings.push(DraftWarning {
            entry_id: None,
            message: "total_questions is 0, the test cannot be submitted".into(),
        });
    }

    // Duplicate entries are collapsed on selection
    let mut seen = HashSet::new();
    for entry in &draft.entries {
        if !seen.insert(entry.key()) {
            warnings.push(DraftWarning {
                entry_id: Some(entry.id.clone()),
                message: format!("duplicate entry id: {}", entry.id),
            });
        }
    }

    // Parent linkage
    for entry in &draft.entries {
        let missing = match entry.entry_type {
            EntryType::Book => None,
            EntryType::Chapter if entry.chapter_id.is_none() => Some("chapter_id"),
            EntryType::Subchapter if entry.chapter_id.is_none() => Some("chapter_id"),
            EntryType::Subchapter if entry.subchapter_id.is_none() => Some("subchapter_id"),
            _ => None,
        };
        if let Some(field) = missing {
            warnings.push(DraftWarning {
                entry_id: Some(entry.id.clone()),
                message: format!("{} entry has no {field}", entry.entry_type),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[draft]
title = "Cell biology midterm"
total_questions = 20

[[entries]]
id = "bio-1"
type = "chapter"
name = "Cells"
book_id = "bio"
chapter_id = "bio-1"

[[entries]]
id = "bio-2"
type = "chapter"
name = "Genetics"
book_id = "bio"
chapter_id = "bio-2"

[[edits]]
kind = "percentage"
entry = "bio-1"
value = 70

[[edits]]
kind = "difficulty"
entry = "bio-2"
tier = "hard"
value = 50

[[edits]]
kind = "lock"
entry = "bio-2"
tier = "hard"
"#;

    #[test]
    fn parse_valid_toml() {
        let draft = parse_draft_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(draft.title, "Cell biology midterm");
        assert_eq!(draft.total_questions, Some(20));
        assert_eq!(draft.entries.len(), 2);
        assert_eq!(draft.entries[0].chapter_id.as_deref(), Some("bio-1"));
        assert_eq!(draft.edits.len(), 3);
        assert_eq!(
            draft.edits[0],
            Edit::SetPercentage {
                entry_id: "bio-1".into(),
                value: 70.0
            }
        );
        assert!(validate_draft(&draft).is_empty());
    }

    #[test]
    fn settle_replays_edits() {
        let draft = parse_draft_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        let set = draft.settle(&TestDraftConfig::default());
        assert_eq!(set.total_questions(), 20);
        assert_eq!(set.get("bio-1").unwrap().question_percentage, 70);
        assert_eq!(set.get("bio-1").unwrap().question_count, 14);
        let genetics = set.get("bio-2").unwrap();
        assert_eq!(genetics.difficulty.hard, 50);
        assert!(genetics.locked_difficulties.contains(DifficultyTier::Hard));
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[[entries]]
id = "chem"
type = "book"
name = "Chemistry"
"#;
        let draft = parse_draft_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert!(draft.title.is_empty());
        assert_eq!(draft.total_questions, None);
        assert_eq!(draft.entries[0].book_id, "chem");

        let config = TestDraftConfig::default();
        assert_eq!(draft.title_or_default(&config), "Untitled test");
        assert_eq!(draft.settle(&config).total_questions(), 20);
    }

    #[test]
    fn text_values_are_coerced() {
        let toml = r#"
[draft]
total_questions = "12"

[[entries]]
id = "a"
type = "book"
name = "A"

[[edits]]
kind = "count"
entry = "a"
value = "lots"

[[edits]]
kind = "total"
value = 7.6
"#;
        let draft = parse_draft_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(draft.total_questions, Some(12));
        assert_eq!(
            draft.edits[0],
            Edit::SetCount {
                entry_id: "a".into(),
                value: 0.0
            }
        );
        assert_eq!(draft.settle(&TestDraftConfig::default()).total_questions(), 8);
    }

    #[test]
    fn library_orders_entries() {
        let toml = r#"
[[library]]
id = "bio"
title = "Biology"

[[library.chapters]]
id = "bio-1"
title = "Cells"

[[library.chapters]]
id = "bio-2"
title = "Genetics"

[[entries]]
id = "bio-2"
type = "chapter"
name = "Genetics"
book_id = "bio"
chapter_id = "bio-2"

[[entries]]
id = "bio-1"
type = "chapter"
name = "Cells"
book_id = "bio"
chapter_id = "bio-1"
"#;
        let draft = parse_draft_str(toml, &PathBuf::from("test.toml")).unwrap();
        let ids: Vec<&str> = draft.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["bio-1", "bio-2"]);
    }

    #[test]
    fn unknown_edit_target_is_an_error() {
        let toml = r#"
[[entries]]
id = "a"
type = "book"
name = "A"

[[edits]]
kind = "percentage"
entry = "ghost"
value = 10
"#;
        let err = parse_draft_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("unknown entry: ghost"));
    }

    #[test]
    fn bad_tier_and_type_are_errors() {
        let toml = r#"
[[entries]]
id = "a"
type = "book"
name = "A"

[[edits]]
kind = "lock"
entry = "a"
tier = "brutal"
"#;
        assert!(parse_draft_str(toml, &PathBuf::from("test.toml")).is_err());

        let toml = r#"
[[entries]]
id = "a"
type = "pamphlet"
name = "A"
"#;
        assert!(parse_draft_str(toml, &PathBuf::from("test.toml")).is_err());

        let toml = r#"
[[entries]]
id = "a"
type = "chapter"
name = "A"
"#;
        assert!(parse_draft_str(toml, &PathBuf::from("test.toml")).is_err());
    }

    #[test]
    fn validate_flags_problems() {
        let toml = r#"
[draft]
total_questions = 0

[[entries]]
id = "a"
type = "subchapter"
name = "A"
book_id = "b"
chapter_id = "c"

[[entries]]
id = "a"
type = "subchapter"
name = "A again"
book_id = "b"
chapter_id = "c"
"#;
        let draft = parse_draft_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_draft(&draft);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("no subchapter_id")));
        assert!(warnings.iter().any(|w| w.message.contains("cannot be submitted")));
    }

    #[test]
    fn shared_id_across_types_is_a_duplicate() {
        let toml = r#"
[[entries]]
id = "x"
type = "book"
name = "X"

[[entries]]
id = "x"
type = "chapter"
name = "X chapter"
book_id = "x"
chapter_id = "x"
"#;
        let draft = parse_draft_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_draft(&draft);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].entry_id.as_deref(), Some("x"));
        assert!(warnings[0].message.contains("duplicate entry id: x"));
        assert_eq!(draft.settle(&TestDraftConfig::default()).len(), 1);
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_draft_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("midterm.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [toml").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let drafts = load_draft_directory(dir.path()).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Cell biology midterm");
    }
}
