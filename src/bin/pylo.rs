//! # Pylo CLI - reversible bulk renaming
//!
//! Command-line interface for the pylo library.
//!
//! ## Usage
//! ```bash
//! # Preview what a rename run would do (the default)
//! pylo rename --path ~/Desktop
//!
//! # Execute it
//! pylo rename --path ~/Desktop --execute
//!
//! # Bring every original name back
//! pylo restore --path ~/Desktop --execute
//! ```
//!
//! Exit status is 0 whenever a run completes, even when individual items
//! errored - the printed counters communicate partial failure.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::*;
use humantime::format_duration;
use pylo::{PyloBuilder, Result, RunReport};

/// Pylo CLI - rename everything, restore everything
#[derive(Parser)]
#[command(name = "pylo")]
#[command(version)]
#[command(about = "Reversible bulk renaming of top-level files and directories")]
#[command(long_about = None)]
struct Cli {
    /// Root folder(s) to process (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Vec<PathBuf>,

    /// Override the application-data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Compute and report the plan without touching the filesystem
    /// (the default; wins over --execute when both are given)
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    /// Actually perform the renames instead of the default dry run
    #[arg(long, global = true)]
    execute: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace every top-level name with a generated one
    #[command(alias = "rn")]
    Rename,

    /// Restore every original name from stored metadata
    #[command(alias = "rs")]
    Restore,
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    // Disable colors if needed
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    // A completed run always exits 0; the counters carry partial failure.
    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
    }
}

fn run(cli: Cli) -> Result<()> {
    let roots = if cli.path.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.path
    };

    // Runs are previews unless explicitly executed; --dry-run always wins.
    let dry_run = cli.dry_run || !cli.execute;

    let mut builder = PyloBuilder::new().roots(roots).dry_run(dry_run);
    if let Some(data_dir) = cli.data_dir {
        builder = builder.data_dir(data_dir);
    }
    let mut pylo = builder.build()?;

    let report = match cli.command {
        Commands::Rename => pylo.rename()?,
        Commands::Restore => pylo.restore()?,
    };
    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    let title = if report.dry_run {
        format!("{} (Dry Run)", report.title)
    } else {
        report.title.clone()
    };
    println!("{}", title.blue().bold());

    if report.dry_run {
        println!(
            "{}",
            "Planned changes (no filesystem modifications were made).".yellow()
        );
    }

    for line in &report.changes {
        println!("  {}", line);
    }
    if !report.changes.is_empty() {
        println!();
    }

    let elapsed = format_duration(Duration::from_millis(report.elapsed_ms));
    println!("{} {}", "✓".green().bold(), report.summary());
    println!(
        "  Started: {}  Elapsed: {}",
        report.started.format("%Y-%m-%d %H:%M:%S UTC"),
        elapsed.to_string().cyan()
    );
    if report.errors > 0 {
        println!(
            "  {} {} item(s) hit errors; see counters above",
            "!".yellow().bold(),
            report.errors
        );
    }
}
