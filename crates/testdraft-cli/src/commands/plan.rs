//! The `testdraft plan` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use testdraft_core::config::load_config_from;
use testdraft_core::distribute::coerce_input;
use testdraft_core::engine::{AllocationSet, Edit};
use testdraft_core::parser;
use testdraft_core::payload::{validate_payload, CreateTestPayload};
use testdraft_core::report::DraftReport;

pub fn execute(
    draft_path: PathBuf,
    total: Option<String>,
    title: Option<String>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "text" | "json"),
        "unknown format '{}', expected text or json",
        format
    );

    let config = load_config_from(config_path.as_deref())?;
    let draft = parser::parse_draft(&draft_path)?;

    let mut set = draft.settle(&config);
    if let Some(total) = &total {
        set = set.apply(Edit::SetTotalQuestions(coerce_input(total)));
    }

    let title = title.as_deref().unwrap_or(draft.title_or_default(&config));
    let payload = CreateTestPayload::build(title, &set)
        .with_context(|| format!("cannot submit {}", draft_path.display()))?;

    for w in validate_payload(&payload) {
        tracing::warn!("{}", w.message);
    }

    let report = DraftReport::new(payload);

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report.payload)?);
        }
        _ => {
            println!(
                "{} ({} questions, {} entries)",
                report.payload.title,
                report.summary.total_questions,
                report.summary.entry_count
            );
            print_summary(&set);
            println!(
                "Difficulty: {} hard, {} medium, {} easy",
                report.summary.hard, report.summary.medium, report.summary.easy
            );
        }
    }

    let output = output.unwrap_or_else(|| config.output_dir.clone());
    let path = output.join(report.file_name());
    report.save_json(&path)?;
    eprintln!("Report saved to: {}", path.display());

    Ok(())
}

fn print_summary(set: &AllocationSet) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Entry", "Type", "Mode", "Share", "Questions", "Hard", "Medium", "Easy", "Locked",
    ]);

    for allocation in set.allocations() {
        let locked: Vec<String> = allocation
            .locked_difficulties
            .iter()
            .map(|tier| tier.to_string())
            .collect();
        table.add_row(vec![
            Cell::new(&allocation.entry.name),
            Cell::new(allocation.entry.entry_type),
            Cell::new(allocation.control_mode),
            Cell::new(format!("{}%", allocation.question_percentage)),
            Cell::new(allocation.question_count),
            Cell::new(format!("{}%", allocation.difficulty.hard)),
            Cell::new(format!("{}%", allocation.difficulty.medium)),
            Cell::new(format!("{}%", allocation.difficulty.easy)),
            Cell::new(locked.join(", ")),
        ]);
    }

    println!("{table}");
}
