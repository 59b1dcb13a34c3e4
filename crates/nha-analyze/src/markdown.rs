// markdown.rs — Human-readable digest of a GapsReport.

use crate::gap::{GapsReport, Priority};

/// Render the gaps report as a Markdown digest.
pub fn render_markdown(report: &GapsReport) -> String {
    let mut out = String::new();

    out.push_str("# Policy gaps\n\n");
    out.push_str(&format!(
        "Generated: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Source: `{}`\n\n", report.source_file));

    if report.all_gaps.is_empty() {
        out.push_str("No gaps detected.\n");
        return out;
    }

    for priority in [Priority::High, Priority::Medium, Priority::Low] {
        let gaps: Vec<_> = report
            .all_gaps
            .iter()
            .filter(|g| g.priority == priority)
            .collect();
        if gaps.is_empty() {
            continue;
        }
        out.push_str(&format!("## {} priority\n\n", priority));
        for gap in gaps {
            let subject = gap
                .scope
                .as_deref()
                .or(gap.secret.as_deref())
                .or(gap.agent_id.as_deref())
                .unwrap_or("-");
            out.push_str(&format!("- **{:?}** `{}` — {}\n", gap.kind, subject, gap.rationale));
        }
        out.push('\n');
    }

    out
}
