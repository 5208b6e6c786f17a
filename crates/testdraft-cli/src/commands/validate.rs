//! The `testdraft validate` command.

use std::path::PathBuf;

use anyhow::Result;

use testdraft_core::config::load_config;
use testdraft_core::parser::{self, DraftWarning};
use testdraft_core::payload::{validate_payload, CreateTestPayload};

pub fn execute(draft_path: PathBuf) -> Result<()> {
    let drafts = if draft_path.is_dir() {
        parser::load_draft_directory(&draft_path)?
    } else {
        vec![parser::parse_draft(&draft_path)?]
    };
    let config = load_config()?;

    let mut total_warnings = 0;

    for draft in &drafts {
        let title = draft.title_or_default(&config);
        println!("Draft: {} ({} entries)", title, draft.entries.len());

        let mut warnings = parser::validate_draft(draft);
        match CreateTestPayload::build(title, &draft.settle(&config)) {
            Ok(payload) => {
                warnings.extend(validate_payload(&payload).into_iter().map(|w| DraftWarning {
                    entry_id: w.entry_id,
                    message: w.message,
                }));
            }
            Err(e) if e.blocks_submission() => warnings.push(DraftWarning {
                entry_id: None,
                message: format!("cannot be submitted: {e}"),
            }),
            Err(e) => return Err(e.into()),
        }

        for w in &warnings {
            let prefix = w
                .entry_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All drafts valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
