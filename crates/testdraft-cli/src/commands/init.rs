//! The `testdraft init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create testdraft.toml
    if std::path::Path::new("testdraft.toml").exists() {
        println!("testdraft.toml already exists, skipping.");
    } else {
        std::fs::write("testdraft.toml", SAMPLE_CONFIG)?;
        println!("Created testdraft.toml");
    }

    // Create example draft
    std::fs::create_dir_all("drafts")?;
    let example_path = std::path::Path::new("drafts/example.toml");
    if example_path.exists() {
        println!("drafts/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DRAFT)?;
        println!("Created drafts/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit drafts/example.toml to select your chapters");
    println!("  2. Run: testdraft validate --draft drafts/example.toml");
    println!("  3. Run: testdraft plan --draft drafts/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# testdraft configuration

default_total_questions = 20
default_title = "Untitled test"
output_dir = "./testdraft-output"

[default_difficulty]
easy = 34
medium = 33
hard = 33
"#;

const EXAMPLE_DRAFT: &str = r#"[draft]
title = "Biology midterm"
total_questions = 30

[[library]]
id = "bio"
title = "Biology"

[[library.chapters]]
id = "bio-cells"
title = "Cells"

[[library.chapters.subchapters]]
id = "bio-cells-membranes"
title = "Membranes"

[[library.chapters]]
id = "bio-genetics"
title = "Genetics"

[[entries]]
id = "bio-genetics"
type = "chapter"
name = "Genetics"
book_id = "bio"
chapter_id = "bio-genetics"

[[entries]]
id = "bio-cells-membranes"
type = "subchapter"
name = "Membranes"
book_id = "bio"
chapter_id = "bio-cells"
subchapter_id = "bio-cells-membranes"

# Give genetics the larger share
[[edits]]
kind = "percentage"
entry = "bio-genetics"
value = 60

# Make the membranes questions harder and keep them that way
[[edits]]
kind = "difficulty"
entry = "bio-cells-membranes"
tier = "hard"
value = 50

[[edits]]
kind = "lock"
entry = "bio-cells-membranes"
tier = "hard"
"#;
