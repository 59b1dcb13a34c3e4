// model.rs — Recommendation data model and output document.
//
// Recommendations are advisory. They never touch the registry themselves;
// applying them is a separate, explicit step outside this pipeline, which
// is why the output is a reviewable YAML document rather than a mutation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nha_analyze::Priority;
use nha_collect::{ActionCount, ScopeCount};

/// The concrete edit (or follow-up) a recommendation proposes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationAction {
    /// Grant a scope to an agent's capabilities.
    AddScope,
    /// Declare a secret for an agent.
    AddSecret,
    /// Grant an IAM-style permission.
    AddPermission,
    /// Investigate an agent id that could not be resolved.
    InvestigateAgent,
    /// Review an agent's whole policy against its observed behavior.
    ReviewAgentPolicy,
}

impl RecommendationAction {
    /// The snake_case key used in the document's summary tally.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationAction::AddScope => "add_scope",
            RecommendationAction::AddSecret => "add_secret",
            RecommendationAction::AddPermission => "add_permission",
            RecommendationAction::InvestigateAgent => "investigate_agent",
            RecommendationAction::ReviewAgentPolicy => "review_agent_policy",
        }
    }
}

/// One proposed registry edit for one agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub agent_id: String,
    pub agent_name: String,
    pub action: RecommendationAction,
    pub rationale: String,
    pub priority: Priority,
    pub violation_count: u64,

    /// The scope to grant (`add_scope`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// The secret to declare (`add_secret`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// The permission to grant (`add_permission`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,

    /// Observed actions, for the human reviewer (`review_agent_policy`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_actions: Option<Vec<ActionCount>>,

    /// Observed scopes, for the human reviewer (`review_agent_policy`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_scopes: Option<Vec<ScopeCount>>,
}

/// All recommendations for one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecommendations {
    pub id: String,
    pub recommendations: Vec<Recommendation>,
}

/// The Recommender's output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsDocument {
    /// When this document was produced.
    pub generated_at: DateTime<Utc>,
    /// Total recommendations across all agents.
    pub total_recommendations: usize,
    /// Count per action kind (snake_case keys).
    pub summary: BTreeMap<String, usize>,
    /// Recommendations grouped per agent, sorted by agent id.
    pub agents: Vec<AgentRecommendations>,
}

impl RecommendationsDocument {
    /// Flat view over every recommendation, in document order.
    pub fn all_recommendations(&self) -> impl Iterator<Item = &Recommendation> {
        self.agents.iter().flat_map(|a| a.recommendations.iter())
    }
}

/// Wrapper giving the YAML file its single top-level key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsFile {
    pub policy_recommendations: RecommendationsDocument,
}
