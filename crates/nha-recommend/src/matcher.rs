// matcher.rs — Scope→agent affinity matching.
//
// Deciding which agents plausibly need a denied scope is fuzzy string
// matching over names and categories. The heuristic lives behind a trait
// so it can be replaced (or sharpened) without touching the synthesis
// pipeline, and unit-tested on its own.

use nha_registry::AgentRegistryEntry;

/// Strategy deciding whether an agent is a plausible holder of a scope.
///
/// `scope_resource` is the part after the first colon of the scope string
/// (`"write:index"` → `"index"`), or empty when the scope has no colon.
pub trait AgentMatcher {
    fn matches(&self, scope_resource: &str, agent: &AgentRegistryEntry) -> bool;
}

/// Resource keywords with an affinity to operational categories: a scope
/// over `rag` or `vectors` plausibly belongs to ML/infra agents, a `cost`
/// scope to ops tooling.
const CATEGORY_AFFINITIES: &[(&str, &[&str])] = &[
    ("rag", &["mlops", "infra"]),
    ("vectors", &["mlops", "infra"]),
    ("cost", &["ops"]),
];

/// The stock heuristic: substring match on the agent name, or a category
/// affinity for a handful of well-known resource keywords.
#[derive(Debug, Default)]
pub struct DefaultMatcher;

impl AgentMatcher for DefaultMatcher {
    fn matches(&self, scope_resource: &str, agent: &AgentRegistryEntry) -> bool {
        if scope_resource.is_empty() {
            return false;
        }
        if agent.name.contains(scope_resource) {
            return true;
        }
        CATEGORY_AFFINITIES.iter().any(|(resource, categories)| {
            *resource == scope_resource && categories.contains(&agent.category.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(name: &str, category: &str) -> AgentRegistryEntry {
        AgentRegistryEntry {
            id: format!("nha:{}", name),
            name: name.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn name_substring_matches() {
        let matcher = DefaultMatcher;
        assert!(matcher.matches("index", &agent("index-crawler", "infra")));
        assert!(!matcher.matches("billing", &agent("index-crawler", "infra")));
    }

    #[test]
    fn category_affinity_matches() {
        let matcher = DefaultMatcher;
        assert!(matcher.matches("rag", &agent("worker-7", "mlops")));
        assert!(matcher.matches("vectors", &agent("worker-7", "infra")));
        assert!(matcher.matches("cost", &agent("reporter", "ops")));
        // Affinity is keyword-specific, not category-wide.
        assert!(!matcher.matches("cost", &agent("worker-7", "mlops")));
    }

    #[test]
    fn empty_resource_matches_nothing() {
        let matcher = DefaultMatcher;
        assert!(!matcher.matches("", &agent("index-crawler", "infra")));
    }
}
