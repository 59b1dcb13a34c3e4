// gap.rs — Policy gap data model.
//
// A PolicyGap is one detected discrepancy between observed violation
// patterns and what the registry currently grants. Gaps are advisory:
// nothing downstream mutates the registry because a gap exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nha_collect::{ActionCount, ScopeCount};

/// How urgently a gap deserves attention.
///
/// Totally ordered (`low < medium < high`) so a minimum-priority filter
/// behaves monotonically: filtering at `medium` keeps `medium` and `high`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// What kind of discrepancy a gap describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    /// Denials name a specific scope no agent holds.
    MissingScope,
    /// Denials name a secret no agent is declared to read.
    MissingSecret,
    /// Scope denials too diffuse to pin on a named scope.
    FrequentScopeViolation,
    /// A violating agent id that does not resolve in the registry.
    UnknownAgent,
    /// One agent violating across enough actions to look systemic.
    AgentPolicyGap,
    /// Denials suggesting missing IAM-style permissions.
    PermissionGap,
}

/// One detected policy gap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyGap {
    /// The gap classification.
    #[serde(rename = "type")]
    pub kind: GapKind,

    /// How urgently this deserves attention.
    pub priority: Priority,

    /// Why this gap was raised, in operator-readable terms.
    pub rationale: String,

    /// The scope in question (scope-shaped gaps).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// The secret identifier in question (secret-shaped gaps).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// The agent in question (agent-shaped gaps).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    /// How many violations back this gap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_count: Option<u64>,

    /// Action drill-down for agent-shaped gaps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_actions: Option<Vec<ActionCount>>,

    /// Scope drill-down for agent-shaped gaps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_scopes: Option<Vec<ScopeCount>>,
}

impl PolicyGap {
    /// Create a gap with the common fields; attach the rest builder-style.
    pub fn new(kind: GapKind, priority: Priority, rationale: impl Into<String>) -> Self {
        Self {
            kind,
            priority,
            rationale: rationale.into(),
            scope: None,
            secret: None,
            agent_id: None,
            violation_count: None,
            top_actions: None,
            top_scopes: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.violation_count = Some(count);
        self
    }
}

/// The Analyzer's output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapsReport {
    /// When this report was produced.
    pub generated_at: DateTime<Utc>,
    /// The collection report this was derived from.
    pub source_file: String,
    /// Every detected gap, highest priority first.
    pub all_gaps: Vec<PolicyGap>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_is_totally_ordered() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
        assert_eq!(Priority::High.max(Priority::Low), Priority::High);
    }

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        let restored: Priority = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(restored, Priority::Medium);
    }

    #[test]
    fn gap_kind_serializes_snake_case() {
        let json = serde_json::to_string(&GapKind::FrequentScopeViolation).unwrap();
        assert_eq!(json, "\"frequent_scope_violation\"");
    }

    #[test]
    fn gap_serializes_kind_under_type_key() {
        let gap = PolicyGap::new(GapKind::MissingScope, Priority::High, "because")
            .with_scope("write:index")
            .with_count(5);
        let json = serde_json::to_string(&gap).unwrap();
        assert!(json.contains("\"type\":\"missing_scope\""));
        assert!(json.contains("\"scope\":\"write:index\""));
        // Unset optionals are omitted entirely.
        assert!(!json.contains("secret"));
        assert!(!json.contains("top_actions"));
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = GapsReport {
            generated_at: Utc::now(),
            source_file: "reports/policy_collect_last_24h.json".to_string(),
            all_gaps: vec![PolicyGap::new(
                GapKind::UnknownAgent,
                Priority::High,
                "unresolved agent",
            )
            .with_agent("nha:ghost")],
        };
        let json = serde_json::to_string_pretty(&report).unwrap();
        let restored: GapsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.all_gaps.len(), 1);
        assert_eq!(restored.all_gaps[0].agent_id.as_deref(), Some("nha:ghost"));
    }
}
