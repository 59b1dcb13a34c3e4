// analyze.rs — The `nha analyze` subcommand.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use nha_analyze::{analyze, render_markdown};
use nha_collect::CollectionSummary;
use nha_registry::load_registry;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to the Collector's JSON output.
    #[arg(long)]
    collect_file: PathBuf,

    /// Directory reports are written into.
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Agent registry consulted for unknown-agent detection.
    #[arg(long, default_value = "cblm/opipe/nha/agents.yaml")]
    registry_file: PathBuf,

    /// Also write a Markdown digest next to the JSON report.
    #[arg(long)]
    markdown: bool,
}

pub fn execute(args: &AnalyzeArgs) -> anyhow::Result<()> {
    let data = fs::read_to_string(&args.collect_file)
        .with_context(|| format!("failed to read collect file {}", args.collect_file.display()))?;
    let summary: CollectionSummary = serde_json::from_str(&data)
        .with_context(|| format!("{} is not a collection summary", args.collect_file.display()))?;

    // The registry is advisory here: without one, only the unknown-agent
    // rule is skipped.
    let registry = match load_registry(&args.registry_file) {
        Ok(registry) => Some(registry),
        Err(err) => {
            tracing::warn!(
                registry = %args.registry_file.display(),
                %err,
                "registry unavailable; unknown-agent detection disabled"
            );
            None
        }
    };

    let report = analyze(
        &summary,
        registry.as_ref(),
        &args.collect_file.display().to_string(),
    );

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let json_path = args.out_dir.join("policy_gaps.json");
    fs::write(&json_path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    if args.markdown {
        let md_path = args.out_dir.join("policy_gaps.md");
        fs::write(&md_path, render_markdown(&report))
            .with_context(|| format!("failed to write {}", md_path.display()))?;
    }

    println!(
        "Detected {} gap(s) -> {}",
        report.all_gaps.len(),
        json_path.display(),
    );
    Ok(())
}
