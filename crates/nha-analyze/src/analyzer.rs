// analyzer.rs — Heuristic classification of violation patterns into gaps.
//
// Each rule reads one slice of the CollectionSummary and produces zero or
// more gaps. The summary's tables already carry the Collector's min_count
// floor, so anything visible here has cleared it; the thresholds below are
// multiples of that same floor, chosen conservatively so low-volume noise
// stays at medium priority.

use chrono::Utc;

use nha_collect::CollectionSummary;
use nha_registry::Registry;

use crate::gap::{GapKind, GapsReport, PolicyGap, Priority};

/// A table entry at or above `HIGH_PRIORITY_MULTIPLE × min_count`
/// escalates its gap from medium to high.
pub const HIGH_PRIORITY_MULTIPLE: u64 = 10;

/// An agent must violate across at least this many distinct actions to be
/// considered systemic.
pub const SYSTEMIC_MIN_ACTIONS: usize = 3;

/// ...and its total violations must reach this multiple of the floor.
pub const SYSTEMIC_VOLUME_MULTIPLE: u64 = 5;

/// How many drill-down rows an agent-shaped gap carries.
const DRILLDOWN_ROWS: usize = 5;

/// Reason string the enforcement point uses for scope denials.
const REASON_SCOPE: &str = "scope_not_allowed";
/// Reason string for IAM-style permission denials.
const REASON_PERMISSION: &str = "permission_not_allowed";

/// Classify a collection summary into a prioritized gaps report.
///
/// The registry is optional: without it the unknown-agent rule is skipped
/// (flagging every agent against an absent registry would be noise, not
/// signal). `source_file` records provenance in the report.
pub fn analyze(
    summary: &CollectionSummary,
    registry: Option<&Registry>,
    source_file: &str,
) -> GapsReport {
    let floor = summary.min_count.max(1);
    let mut gaps = Vec::new();

    // Rule 1: denials naming a specific scope nobody holds.
    for entry in &summary.missing_scopes {
        gaps.push(
            PolicyGap::new(
                GapKind::MissingScope,
                scaled_priority(entry.count, floor),
                format!(
                    "{} denial(s) named scope '{}' which no current grant covers",
                    entry.count, entry.key
                ),
            )
            .with_scope(&entry.key)
            .with_count(entry.count),
        );
    }

    // Rule 2: denials naming a secret nobody is declared to read.
    for entry in &summary.missing_secrets {
        gaps.push(
            PolicyGap::new(
                GapKind::MissingSecret,
                scaled_priority(entry.count, floor),
                format!(
                    "{} denial(s) required secret '{}' which no agent declares",
                    entry.count, entry.key
                ),
            )
            .with_secret(&entry.key)
            .with_count(entry.count),
        );
    }

    // Rule 3: scope denials too diffuse to pin on a named scope. The
    // residual is the scope_not_allowed reason count minus everything
    // already attributed to named scopes in missing_scopes.
    let scope_reason_count = reason_count(summary, REASON_SCOPE);
    let attributed: u64 = summary.missing_scopes.iter().map(|e| e.count).sum();
    let residual = scope_reason_count.saturating_sub(attributed);
    if residual >= floor {
        gaps.push(
            PolicyGap::new(
                GapKind::FrequentScopeViolation,
                scaled_priority(residual, floor),
                format!(
                    "{} scope denial(s) carried no scope field and cannot be attributed to a specific grant",
                    residual
                ),
            )
            .with_count(residual),
        );
    }

    // Rule 4: violating agents the registry has never heard of.
    match registry {
        Some(registry) => {
            for entry in &summary.top_agents {
                if !registry.contains(&entry.key) {
                    gaps.push(
                        PolicyGap::new(
                            GapKind::UnknownAgent,
                            Priority::High,
                            format!(
                                "agent '{}' produced {} violation(s) but does not resolve in the registry; \
                                 investigate X-NHA-ID propagation at the enforcement point",
                                entry.key, entry.count
                            ),
                        )
                        .with_agent(&entry.key)
                        .with_count(entry.count),
                    );
                }
            }
        }
        None => {
            tracing::warn!("no registry available; skipping unknown-agent detection");
        }
    }

    // Rule 5: one agent violating across enough distinct actions, at enough
    // volume, to look like a systemic per-agent policy gap.
    for (agent, actions) in &summary.agent_action_matrix {
        let total: u64 = actions.iter().map(|row| row.count).sum();
        if actions.len() >= SYSTEMIC_MIN_ACTIONS && total >= SYSTEMIC_VOLUME_MULTIPLE * floor {
            let mut gap = PolicyGap::new(
                GapKind::AgentPolicyGap,
                scaled_priority(total, floor),
                format!(
                    "agent '{}' accumulated {} violation(s) across {} action type(s); \
                     its policy likely lags its actual duties",
                    agent,
                    total,
                    actions.len()
                ),
            )
            .with_agent(agent)
            .with_count(total);
            gap.top_actions = Some(actions.iter().take(DRILLDOWN_ROWS).cloned().collect());
            gap.top_scopes = summary
                .agent_scope_matrix
                .get(agent)
                .map(|scopes| scopes.iter().take(DRILLDOWN_ROWS).cloned().collect());
            gaps.push(gap);
        }
    }

    // Rule 6: catch-all for IAM-style permission denials.
    let permission_count = reason_count(summary, REASON_PERMISSION);
    if permission_count >= floor {
        gaps.push(
            PolicyGap::new(
                GapKind::PermissionGap,
                scaled_priority(permission_count, floor),
                format!(
                    "{} denial(s) cite '{}'; the affected agents likely lack IAM-style permissions",
                    permission_count, REASON_PERMISSION
                ),
            )
            .with_count(permission_count),
        );
    }

    // Highest priority first; volume breaks ties so the report reads
    // top-down in order of urgency.
    gaps.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.violation_count.cmp(&a.violation_count))
    });

    tracing::debug!(gaps = gaps.len(), source = source_file, "analysis complete");

    GapsReport {
        generated_at: Utc::now(),
        source_file: source_file.to_string(),
        all_gaps: gaps,
    }
}

fn reason_count(summary: &CollectionSummary, reason: &str) -> u64 {
    summary
        .top_reasons
        .iter()
        .find(|entry| entry.key == reason)
        .map(|entry| entry.count)
        .unwrap_or(0)
}

fn scaled_priority(count: u64, floor: u64) -> Priority {
    if count >= HIGH_PRIORITY_MULTIPLE * floor {
        Priority::High
    } else {
        Priority::Medium
    }
}
