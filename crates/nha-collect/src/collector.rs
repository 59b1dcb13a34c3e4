// collector.rs — Windowed aggregation of policy violations.
//
// Filtering happens first: a record is selected only when its result is
// DENY (or WARN when include_warn is set) AND its timestamp falls inside
// the inclusive window bounds. Everything downstream — headline counts,
// ranked tables, matrices, heuristic side-tables — is built from the
// selected set only, so the breakdown always reflects exactly the result
// types that were asked for.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use nha_audit::{scan_logs_dir, AuditError, AuditRecord, PolicyResult, TimeWindow};

use crate::summary::{ActionCount, CollectionSummary, CountEntry, ScopeCount};

/// Denial reasons that name a scope the agent lacks.
const SCOPE_GAP_REASONS: &[&str] = &["scope_not_allowed", "permission_not_allowed"];

/// Denial reason that names a secret the agent lacks.
const SECRET_GAP_REASON: &str = "secret_not_allowed";

/// Parameters for one collection run.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// The window to aggregate over.
    pub window: TimeWindow,
    /// Drop table entries with fewer occurrences than this.
    pub min_count: u64,
    /// Select WARN decisions alongside DENY.
    pub include_warn: bool,
}

/// Aggregate records into a summary for the configured window.
///
/// `now` anchors the relative windows; callers pass `Utc::now()` outside
/// tests. Pure function — reading the log partitions is the caller's job
/// (or use [`collect_logs_dir`]).
pub fn collect(
    records: &[AuditRecord],
    now: DateTime<Utc>,
    options: &CollectOptions,
) -> CollectionSummary {
    let (start, end) = options.window.bounds(now);

    let mut total_records = 0u64;
    let mut denies = 0u64;
    let mut warns_included = 0u64;

    let mut agents: HashMap<String, u64> = HashMap::new();
    let mut actions: HashMap<String, u64> = HashMap::new();
    let mut scopes: HashMap<String, u64> = HashMap::new();
    let mut reasons: HashMap<String, u64> = HashMap::new();
    let mut missing_scopes: HashMap<String, u64> = HashMap::new();
    let mut missing_secrets: HashMap<String, u64> = HashMap::new();
    let mut agent_actions: HashMap<String, HashMap<String, u64>> = HashMap::new();
    let mut agent_scopes: HashMap<String, HashMap<String, u64>> = HashMap::new();

    for record in records {
        // An unparseable timestamp excludes the record — out-of-window,
        // not an error.
        let ts = match record.parsed_ts() {
            Some(ts) => ts,
            None => continue,
        };
        if ts < start || ts > end {
            continue;
        }
        total_records += 1;

        let selected = match record.result {
            PolicyResult::Deny => {
                denies += 1;
                true
            }
            PolicyResult::Warn if options.include_warn => {
                warns_included += 1;
                true
            }
            _ => false,
        };
        if !selected {
            continue;
        }

        *agents.entry(record.agent_id.clone()).or_insert(0) += 1;
        *actions.entry(record.action.clone()).or_insert(0) += 1;
        if !record.reason.is_empty() {
            *reasons.entry(record.reason.clone()).or_insert(0) += 1;
        }

        *agent_actions
            .entry(record.agent_id.clone())
            .or_default()
            .entry(record.action.clone())
            .or_insert(0) += 1;

        if let Some(scope) = &record.scope {
            *scopes.entry(scope.clone()).or_insert(0) += 1;
            *agent_scopes
                .entry(record.agent_id.clone())
                .or_default()
                .entry(scope.clone())
                .or_insert(0) += 1;

            if SCOPE_GAP_REASONS.contains(&record.reason.as_str()) {
                *missing_scopes.entry(scope.clone()).or_insert(0) += 1;
            }
        }

        if record.reason == SECRET_GAP_REASON {
            let secret = record
                .extra_str("secret")
                .or_else(|| record.extra_str("require_secret"))
                .unwrap_or("unknown");
            *missing_secrets.entry(secret.to_string()).or_insert(0) += 1;
        }
    }

    tracing::debug!(
        window = options.window.label(),
        total_records,
        denies,
        warns_included,
        "collection pass complete"
    );

    CollectionSummary {
        generated_at: Utc::now(),
        window: options.window.label().to_string(),
        min_count: options.min_count,
        include_warn: options.include_warn,
        total_records,
        violations_total: denies + warns_included,
        denies,
        warns_included,
        top_agents: ranked(agents, options.min_count),
        top_actions: ranked(actions, options.min_count),
        top_scopes: ranked(scopes, options.min_count),
        top_reasons: ranked(reasons, options.min_count),
        missing_scopes: ranked(missing_scopes, options.min_count),
        missing_secrets: ranked(missing_secrets, options.min_count),
        agent_action_matrix: agent_actions
            .into_iter()
            .filter_map(|(agent, counts)| {
                let rows: Vec<ActionCount> = ranked(counts, options.min_count)
                    .into_iter()
                    .map(|e| ActionCount {
                        action: e.key,
                        count: e.count,
                    })
                    .collect();
                (!rows.is_empty()).then_some((agent, rows))
            })
            .collect(),
        agent_scope_matrix: agent_scopes
            .into_iter()
            .filter_map(|(agent, counts)| {
                let rows: Vec<ScopeCount> = ranked(counts, options.min_count)
                    .into_iter()
                    .map(|e| ScopeCount {
                        scope: e.key,
                        count: e.count,
                    })
                    .collect();
                (!rows.is_empty()).then_some((agent, rows))
            })
            .collect(),
    }
}

/// Scan a logs directory and aggregate in one step.
pub fn collect_logs_dir(
    logs_dir: impl AsRef<std::path::Path>,
    now: DateTime<Utc>,
    options: &CollectOptions,
) -> Result<CollectionSummary, AuditError> {
    let outcome = scan_logs_dir(logs_dir)?;
    Ok(collect(&outcome.records, now, options))
}

/// Turn a counter map into a ranked table: count descending, key ascending
/// on ties, entries below the floor dropped entirely.
fn ranked(counts: HashMap<String, u64>, min_count: u64) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .filter(|(_, count)| *count >= min_count)
        .map(|(key, count)| CountEntry { key, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    entries
}
