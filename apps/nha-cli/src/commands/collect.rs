// collect.rs — The `nha collect` subcommand.
//
// Usage errors (an absolute window missing its bounds, a bad bound format)
// are fatal before any file is touched; everything about the logs
// themselves degrades gracefully inside the collector.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, ValueEnum};
use chrono::Utc;

use nha_audit::{parse_zulu, TimeWindow};
use nha_collect::{collect_logs_dir, render_markdown, CollectOptions};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WindowArg {
    #[value(name = "last_24h")]
    Last24h,
    #[value(name = "last_7d")]
    Last7d,
    #[value(name = "all")]
    All,
    #[value(name = "absolute")]
    Absolute,
}

#[derive(Args)]
pub struct CollectArgs {
    /// Directory holding the monthly audit log partitions.
    #[arg(long, default_value = "logs")]
    logs_dir: PathBuf,

    /// Directory reports are written into.
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Aggregation window.
    #[arg(long, value_enum, default_value = "last_24h")]
    window: WindowArg,

    /// Window start (ISO-8601 Zulu); required with --window absolute.
    #[arg(long)]
    from_ts: Option<String>,

    /// Window end (ISO-8601 Zulu); required with --window absolute.
    #[arg(long)]
    to_ts: Option<String>,

    /// Drop table entries with fewer occurrences than this.
    #[arg(long, default_value_t = 1)]
    min_count: u64,

    /// Select WARN decisions alongside DENY.
    #[arg(long)]
    include_warn: bool,

    /// Also write a Markdown digest next to the JSON report.
    #[arg(long)]
    markdown: bool,
}

pub fn execute(args: &CollectArgs) -> anyhow::Result<()> {
    let window = resolve_window(args)?;
    let options = CollectOptions {
        window,
        min_count: args.min_count,
        include_warn: args.include_warn,
    };

    let summary = collect_logs_dir(&args.logs_dir, Utc::now(), &options)
        .with_context(|| format!("failed to read logs from {}", args.logs_dir.display()))?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let json_path = args
        .out_dir
        .join(format!("policy_collect_{}.json", window.label()));
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&json_path, json)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    if args.markdown {
        let md_path = args
            .out_dir
            .join(format!("policy_collect_{}.md", window.label()));
        fs::write(&md_path, render_markdown(&summary))
            .with_context(|| format!("failed to write {}", md_path.display()))?;
    }

    println!(
        "Collected {} violation(s) from {} in-window record(s) -> {}",
        summary.violations_total,
        summary.total_records,
        json_path.display(),
    );
    Ok(())
}

fn resolve_window(args: &CollectArgs) -> anyhow::Result<TimeWindow> {
    match args.window {
        WindowArg::Last24h => Ok(TimeWindow::Last24h),
        WindowArg::Last7d => Ok(TimeWindow::Last7d),
        WindowArg::All => Ok(TimeWindow::All),
        WindowArg::Absolute => {
            let (Some(from_ts), Some(to_ts)) = (&args.from_ts, &args.to_ts) else {
                bail!("--window absolute requires both --from-ts and --to-ts");
            };
            let Some(from) = parse_zulu(from_ts) else {
                bail!("--from-ts '{}' is not an ISO-8601 Zulu timestamp", from_ts);
            };
            let Some(to) = parse_zulu(to_ts) else {
                bail!("--to-ts '{}' is not an ISO-8601 Zulu timestamp", to_ts);
            };
            Ok(TimeWindow::Absolute { from, to })
        }
    }
}
