// recommend.rs — The `nha recommend` subcommand.
//
// Both inputs are hard requirements: a missing gaps file or registry file
// is a fatal, clearly reported error with no partial output.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, ValueEnum};

use nha_analyze::{GapsReport, Priority};
use nha_recommend::{recommend, DefaultMatcher, RecommendationsFile};
use nha_registry::load_registry;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    #[value(name = "low")]
    Low,
    #[value(name = "medium")]
    Medium,
    #[value(name = "high")]
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Args)]
pub struct RecommendArgs {
    /// Path to the Analyzer's gaps report.
    #[arg(long)]
    gaps_file: PathBuf,

    /// Agent registry to diff proposals against.
    #[arg(long, default_value = "cblm/opipe/nha/agents.yaml")]
    registry_file: PathBuf,

    /// Where the recommendations document is written.
    #[arg(long, default_value = "cblm/opipe/nha/policy_recommendations.yaml")]
    out_file: PathBuf,

    /// Drop gaps below this priority.
    #[arg(long, value_enum, default_value = "medium")]
    min_priority: PriorityArg,

    /// Print the document as JSON instead of writing the file.
    #[arg(long)]
    dry_run: bool,
}

pub fn execute(args: &RecommendArgs) -> anyhow::Result<()> {
    if !args.gaps_file.exists() {
        bail!("gaps file not found: {}", args.gaps_file.display());
    }
    if !args.registry_file.exists() {
        bail!("registry file not found: {}", args.registry_file.display());
    }

    let data = fs::read_to_string(&args.gaps_file)
        .with_context(|| format!("failed to read gaps file {}", args.gaps_file.display()))?;
    let gaps: GapsReport = serde_json::from_str(&data)
        .with_context(|| format!("{} is not a gaps report", args.gaps_file.display()))?;
    let registry = load_registry(&args.registry_file)
        .with_context(|| format!("failed to load registry {}", args.registry_file.display()))?;

    let document = recommend(&gaps, &registry, args.min_priority.into(), &DefaultMatcher);
    let file = RecommendationsFile {
        policy_recommendations: document,
    };

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&file)?);
        return Ok(());
    }

    if let Some(parent) = args.out_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    fs::write(&args.out_file, serde_yaml::to_string(&file)?)
        .with_context(|| format!("failed to write {}", args.out_file.display()))?;

    println!(
        "Proposed {} recommendation(s) for {} agent(s) -> {}",
        file.policy_recommendations.total_recommendations,
        file.policy_recommendations.agents.len(),
        args.out_file.display(),
    );
    Ok(())
}
