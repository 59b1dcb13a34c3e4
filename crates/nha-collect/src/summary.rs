// summary.rs — The Collector's output document.
//
// A CollectionSummary is fully regenerated on every run — no incremental
// mutation, no identity beyond the output file. The run parameters are
// echoed into the document so a reader of the report can tell how it was
// produced without consulting scheduler state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row in a ranked frequency table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountEntry {
    pub key: String,
    pub count: u64,
}

/// One row in an agent's action drill-down.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionCount {
    pub action: String,
    pub count: u64,
}

/// One row in an agent's scope drill-down.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeCount {
    pub scope: String,
    pub count: u64,
}

/// Aggregated violation summary for one collection window.
///
/// Invariants:
/// - `violations_total == denies + warns_included`
/// - every count in every table and matrix row is `>= min_count`
///
/// The matrices use `BTreeMap` so serialization order is deterministic and
/// two runs over the same inputs produce byte-identical reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// When this summary was produced.
    pub generated_at: DateTime<Utc>,

    /// Window label the run aggregated over (e.g., "last_24h").
    pub window: String,
    /// Minimum count below which table entries were dropped.
    pub min_count: u64,
    /// Whether WARN decisions were selected alongside DENY.
    pub include_warn: bool,

    /// Records read inside the window, regardless of result.
    pub total_records: u64,
    /// Selected violations: `denies + warns_included`.
    pub violations_total: u64,
    /// DENY decisions selected.
    pub denies: u64,
    /// WARN decisions selected (zero unless `include_warn`).
    pub warns_included: u64,

    pub top_agents: Vec<CountEntry>,
    pub top_actions: Vec<CountEntry>,
    pub top_scopes: Vec<CountEntry>,
    pub top_reasons: Vec<CountEntry>,

    /// Scopes named in scope/permission denial reasons.
    pub missing_scopes: Vec<CountEntry>,
    /// Secret identifiers named in secret denial reasons.
    pub missing_secrets: Vec<CountEntry>,

    /// Per-agent action breakdown.
    pub agent_action_matrix: BTreeMap<String, Vec<ActionCount>>,
    /// Per-agent scope breakdown.
    pub agent_scope_matrix: BTreeMap<String, Vec<ScopeCount>>,
}

impl CollectionSummary {
    /// Look up an agent's row in `top_agents`.
    pub fn agent_count(&self, agent_id: &str) -> Option<u64> {
        self.top_agents
            .iter()
            .find(|entry| entry.key == agent_id)
            .map(|entry| entry.count)
    }
}
