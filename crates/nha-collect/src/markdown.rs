// markdown.rs — Human-readable digest of a CollectionSummary.
//
// Same data as the JSON report, organized into bulleted sections for an
// operator skimming the reports directory. Sections with no entries are
// omitted rather than rendered empty.

use crate::summary::{CollectionSummary, CountEntry};

/// Render the summary as a Markdown digest.
pub fn render_markdown(summary: &CollectionSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "# Policy violation summary — {}\n\n",
        summary.window
    ));
    out.push_str(&format!(
        "Generated: {}\n\n",
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out.push_str("## Headline\n\n");
    out.push_str(&format!("- Records in window: {}\n", summary.total_records));
    out.push_str(&format!("- Violations: {}\n", summary.violations_total));
    out.push_str(&format!("- Denies: {}\n", summary.denies));
    out.push_str(&format!("- Warns included: {}\n", summary.warns_included));
    out.push_str(&format!("- Minimum count: {}\n\n", summary.min_count));

    push_table(&mut out, "Top agents", &summary.top_agents);
    push_table(&mut out, "Top actions", &summary.top_actions);
    push_table(&mut out, "Top scopes", &summary.top_scopes);
    push_table(&mut out, "Top reasons", &summary.top_reasons);
    push_table(&mut out, "Missing scopes", &summary.missing_scopes);
    push_table(&mut out, "Missing secrets", &summary.missing_secrets);

    if !summary.agent_action_matrix.is_empty() {
        out.push_str("## Per-agent actions\n\n");
        for (agent, rows) in &summary.agent_action_matrix {
            out.push_str(&format!("- `{}`\n", agent));
            for row in rows {
                out.push_str(&format!("  - {} — {}\n", row.action, row.count));
            }
        }
        out.push('\n');
    }

    if !summary.agent_scope_matrix.is_empty() {
        out.push_str("## Per-agent scopes\n\n");
        for (agent, rows) in &summary.agent_scope_matrix {
            out.push_str(&format!("- `{}`\n", agent));
            for row in rows {
                out.push_str(&format!("  - {} — {}\n", row.scope, row.count));
            }
        }
        out.push('\n');
    }

    out
}

fn push_table(out: &mut String, title: &str, entries: &[CountEntry]) {
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!("## {}\n\n", title));
    for entry in entries {
        out.push_str(&format!("- `{}` — {}\n", entry.key, entry.count));
    }
    out.push('\n');
}
