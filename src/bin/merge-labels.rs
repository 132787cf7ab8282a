//! Label merger CLI tool
//!
//! Merges every label PDF in a directory into one file.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use label_merger::config::DEFAULT_PATTERN;
use label_merger::{run, MergeSelection, MergerConfig, RunOutcome};

/// Merge shipping-label PDFs into a single document
#[derive(Parser)]
#[command(name = "merge-labels")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge every label next to the backend
    merge-labels

    # Merge only the five most recent labels
    merge-labels --selection last

    # Merge the last 20 labels from a custom directory
    merge-labels --labels-dir ./labels -o today.pdf --selection last:20

    # Show what would be merged
    merge-labels --dry-run")]
struct Cli {
    /// Directory containing label PDFs [default: ../backend/labels beside this program]
    #[arg(long, env = "LABEL_MERGER_LABELS_DIR")]
    labels_dir: Option<PathBuf>,

    /// Output PDF file path [default: ../backend/merged_labels.pdf beside this program]
    #[arg(short, long, env = "LABEL_MERGER_OUTPUT")]
    output: Option<PathBuf>,

    /// Which labels to merge: "all", "last" (the last 5) or "last:N"
    #[arg(long, env = "LABEL_MERGER_SELECTION", default_value = "all", value_parser = parse_selection)]
    selection: MergeSelection,

    /// Case-insensitive file name pattern
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// List what would be merged without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Log filter for diagnostics on stderr (e.g. "debug", "label_merger=info")
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn parse_selection(s: &str) -> Result<MergeSelection, String> {
    s.parse().map_err(|e: label_merger::Error| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cmd_merge(cli) {
        Ok(outcome) => println!("{}", outcome),
        Err(e) => {
            println!("{}", e);
            process::exit(1);
        }
    }
}

/// Resolve the configuration and run the merge
fn cmd_merge(cli: Cli) -> anyhow::Result<RunOutcome> {
    let mut config = MergerConfig::for_program()
        .context("Could not locate the program directory")?;

    if let Some(labels_dir) = cli.labels_dir {
        config.labels_dir = labels_dir;
    }
    if let Some(output) = cli.output {
        config.output_path = output;
    }
    config.selection = cli.selection;
    config.pattern = cli.pattern;
    config.dry_run = cli.dry_run;

    let outcome = run(&config)?;
    Ok(outcome)
}
