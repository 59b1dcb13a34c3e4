//! # nha-cli
//!
//! Command-line interface for the adaptive policy pipeline.
//!
//! One subcommand per pipeline stage, each an independent one-shot batch
//! transform communicating with the others through files:
//! - `nha collect` — aggregate violations from the audit logs
//! - `nha analyze` — classify the aggregate into prioritized policy gaps
//! - `nha recommend` — propose registry edits from the gaps
//! - `nha selfheal check/snapshot` — guard the registry's integrity

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Adaptive policy pipeline for non-human agents.
#[derive(Parser)]
#[command(name = "nha", version, about)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate policy violations from the audit logs.
    Collect(commands::collect::CollectArgs),
    /// Detect policy gaps in a collection summary.
    Analyze(commands::analyze::AnalyzeArgs),
    /// Propose registry edits from a gaps report.
    Recommend(commands::recommend::RecommendArgs),
    /// Check and repair the agent registry.
    Selfheal {
        #[command(subcommand)]
        command: commands::selfheal::SelfhealCommands,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so report output and shell pipelines stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Collect(args) => commands::collect::execute(args),
        Commands::Analyze(args) => commands::analyze::execute(args),
        Commands::Recommend(args) => commands::recommend::execute(args),
        Commands::Selfheal { command } => commands::selfheal::execute(command),
    }
}
