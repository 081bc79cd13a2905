//! repolens - repository structure analyzer with differential reporting.
//!
//! Usage:
//!   repolens inspect SNAPSHOT            Summarize an exported snapshot
//!   repolens diff CURRENT PREVIOUS       Diff two exported snapshots
//!   repolens --help                      Show help

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use humansize::{format_size, BINARY};

use repolens_analyze::DifferentialEngine;
use repolens_core::Snapshot;

#[derive(Parser)]
#[command(
    name = "repolens",
    version,
    about = "Repository structure analyzer with differential reporting",
    long_about = "repolens inspects analyzed repository snapshots and computes \
                  structural diffs between them.\n\n\
                  Snapshots are JSON exports produced by the analysis service."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize an exported snapshot
    Inspect {
        /// Snapshot JSON file
        snapshot: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Diff two exported snapshots (current against previous)
    Diff {
        /// Current snapshot JSON file
        current: PathBuf,

        /// Previous snapshot JSON file
        previous: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Inspect { snapshot, format } => inspect(&snapshot, format),
        Command::Diff {
            current,
            previous,
            format,
        } => diff(&current, &previous, format),
    }
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("failed to parse snapshot file {}", path.display()))
}

fn inspect(path: &Path, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(path)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        OutputFormat::Text => {
            println!("Analysis:  {}", snapshot.analysis_id);
            println!("Status:    {:?}", snapshot.progress.status);
            println!("Files:     {}", snapshot.total_files());
            println!("Size:      {}", format_size(snapshot.total_size(), BINARY));
            println!("Created:   {}", snapshot.created_at.to_rfc3339());
            if !snapshot.modules.is_empty() {
                println!("\nModules:");
                for module in &snapshot.modules {
                    println!(
                        "  {:<20} {:>5} files  {:>10}",
                        module.name,
                        module.metrics.file_count,
                        format_size(module.metrics.total_size, BINARY)
                    );
                }
            }
        }
    }
    Ok(())
}

fn diff(current: &Path, previous: &Path, format: OutputFormat) -> Result<()> {
    let current = load_snapshot(current)?;
    let previous = load_snapshot(previous)?;
    let diff = DifferentialEngine::diff(&current, &previous);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&diff)?);
        }
        OutputFormat::Text => {
            println!(
                "Diff {} -> {}: {}",
                diff.parent_commit,
                diff.commit_hash,
                diff.summary()
            );
            for change in &diff.changes {
                println!("  {:<9} {}", change.change_type.to_string(), change.path);
            }
            if !diff.module_changes.is_empty() {
                println!("\nModule changes:");
                for change in &diff.module_changes {
                    println!(
                        "  {:<9} {} ({} files affected)",
                        change.change_type.to_string(),
                        change.name,
                        change.affected_files.len()
                    );
                }
            }
        }
    }
    Ok(())
}
