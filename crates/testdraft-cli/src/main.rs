//! testdraft CLI — plan how a test's questions are spread over library content.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "testdraft", version, about = "Test question allocation planner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Settle a draft and write its submission report
    Plan {
        /// Path to a .toml draft file
        #[arg(long)]
        draft: PathBuf,

        /// Override the total number of questions
        #[arg(long)]
        total: Option<String>,

        /// Override the test title
        #[arg(long)]
        title: Option<String>,

        /// Output directory (defaults to the configured output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the numbered question sequence of a draft
    Order {
        /// Path to a .toml draft file
        #[arg(long)]
        draft: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate draft TOML files
    Validate {
        /// Path to draft file or directory
        #[arg(long)]
        draft: PathBuf,
    },

    /// Create starter config and example draft
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("testdraft=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Plan {
            draft,
            total,
            title,
            output,
            format,
            config,
        } => commands::plan::execute(draft, total, title, output, format, config),
        Commands::Order { draft, config } => commands::order::execute(draft, config),
        Commands::Validate { draft } => commands::validate::execute(draft),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
