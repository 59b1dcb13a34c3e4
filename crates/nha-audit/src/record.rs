// record.rs — Policy decision record data model.
//
// Every line in a monthly log partition is one AuditRecord: a single
// allow/deny/warn decision made by the enforcement point for a non-human
// agent. Records are externally owned and immutable once written — this
// crate only ever reads them.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format the enforcement point writes: ISO-8601 UTC "Zulu".
pub const TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// The outcome of a policy decision.
///
/// Serialized in UPPERCASE to match the wire format of the enforcement
/// point (`"result": "DENY"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyResult {
    /// The action was permitted.
    Allow,
    /// The action was blocked.
    Deny,
    /// The action was permitted but flagged for review.
    Warn,
}

/// A single policy decision — one line in a JSONL log partition.
///
/// Only `ts`, `agent_id`, `action`, and `result` are required on the wire;
/// everything else defaults when absent. A line missing a required field
/// fails to parse and is skipped by the scanner as a malformed record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// When the decision was made, as written by the enforcement point
    /// (`%Y-%m-%dT%H:%M:%SZ`). Kept as a string so a bad timestamp excludes
    /// the record from the window rather than failing the whole line.
    pub ts: String,

    /// Which agent requested the action (e.g., "nha:crawler-01").
    pub agent_id: String,

    /// What the agent tried to do (e.g., "index.write").
    pub action: String,

    /// The capability scope the action required, when one was named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// The decision outcome.
    pub result: PolicyResult,

    /// Why the enforcement point decided this way (e.g., "scope_not_allowed").
    #[serde(default)]
    pub reason: String,

    /// Request correlation id, when the caller propagated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    /// Arbitrary additional decision context (e.g., `secret`, `require_secret`).
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AuditRecord {
    /// Parse the record's timestamp, strictly in the enforcement point's
    /// format. Returns `None` on any deviation — the caller treats that as
    /// out-of-window, not as an error.
    pub fn parsed_ts(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.ts, TS_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Fetch a string value from the `extra` map.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}
