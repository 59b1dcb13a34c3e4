// model.rs — Agent registry data model.
//
// The registry is a YAML document with a single top-level key `nhas`: the
// catalog of non-human agent identities and what each is allowed to hold.
// This pipeline treats it as ground truth to diff proposals against — the
// recommender must never propose a capability an agent already has.

use serde::{Deserialize, Serialize};

/// A capability block within a registry entry.
///
/// Agents may carry several capability blocks (one per subsystem in
/// practice); membership checks flatten across all of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capability {
    /// The scope strings this capability grants (e.g., "read:rag").
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// One registered non-human agent.
///
/// Only `id` is required; a sparse entry is valid and simply holds nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentRegistryEntry {
    /// Stable identity, conventionally "nha:<name>".
    #[serde(default)]
    pub id: String,

    /// Human-readable name (e.g., "index-crawler").
    #[serde(default)]
    pub name: String,

    /// Operational category (e.g., "infra", "mlops", "ops").
    #[serde(default)]
    pub category: String,

    /// Granted capability blocks.
    #[serde(default)]
    pub capabilities: Vec<Capability>,

    /// Granted IAM-style permissions (e.g., "run.invoker").
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Secret identifiers this agent may read.
    #[serde(default)]
    pub secrets: Vec<String>,
}

impl AgentRegistryEntry {
    /// Whether any capability block already grants this scope.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.capabilities
            .iter()
            .any(|cap| cap.scopes.iter().any(|s| s == scope))
    }

    /// Whether this permission is already granted.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Whether this secret is already held.
    pub fn has_secret(&self, secret: &str) -> bool {
        self.secrets.iter().any(|s| s == secret)
    }
}

/// The full registry document (top-level YAML key `nhas`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registry {
    #[serde(default)]
    pub nhas: Vec<AgentRegistryEntry>,
}

impl Registry {
    /// Look up an agent by id.
    pub fn find(&self, id: &str) -> Option<&AgentRegistryEntry> {
        self.nhas.iter().find(|entry| entry.id == id)
    }

    /// Whether an agent id resolves in the registry.
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }
}
