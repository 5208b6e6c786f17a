//! The `testdraft order` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use testdraft_core::config::load_config_from;
use testdraft_core::parser;
use testdraft_core::payload::CreateTestPayload;

pub fn execute(draft_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let draft = parser::parse_draft(&draft_path)?;
    let set = draft.settle(&config);

    let payload = CreateTestPayload::build(draft.title_or_default(&config), &set)
        .with_context(|| format!("cannot submit {}", draft_path.display()))?;

    println!("{} ({} questions)", payload.title, payload.total_questions);
    for slot in &payload.question_order {
        println!(
            "{:>4}. [{}] {} ({})",
            slot.question_number, slot.difficulty, slot.entry_name, slot.entry_id
        );
    }

    Ok(())
}
