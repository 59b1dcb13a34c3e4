// recommender.rs — Synthesis of registry edit proposals from policy gaps.
//
// The registry is ground truth: a proposal is suppressed when the agent
// already holds the capability, and no (agent, action, payload) triple is
// emitted twice in one run. Grouping uses BTreeMap so the output document
// is deterministic for a given gaps file and registry.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;

use nha_analyze::{GapKind, GapsReport, PolicyGap, Priority};
use nha_registry::{AgentRegistryEntry, Registry};

use crate::matcher::AgentMatcher;
use crate::model::{
    AgentRecommendations, Recommendation, RecommendationAction, RecommendationsDocument,
};

/// Permissions proposed for agents with systemic policy gaps, tried in
/// order; at most one is recommended per agent per run to avoid flooding.
pub const CANDIDATE_PERMISSIONS: &[&str] = &[
    "run.invoker",
    "storage.objectViewer",
    "storage.objectCreator",
    "logging.logWriter",
    "monitoring.viewer",
];

/// Agent id used for recommendations that have no resolvable agent.
const UNKNOWN_AGENT_ID: &str = "unknown";

/// Synthesize recommendations from a gaps report against the registry.
///
/// Gaps below `min_priority` are dropped up front, so filtering at a
/// higher minimum always yields a subset of a lower one.
pub fn recommend(
    gaps: &GapsReport,
    registry: &Registry,
    min_priority: Priority,
    matcher: &dyn AgentMatcher,
) -> RecommendationsDocument {
    let mut by_agent: BTreeMap<String, Vec<Recommendation>> = BTreeMap::new();
    // (agent_id, action, payload) triples already emitted this run.
    let mut emitted: HashSet<(String, &'static str, String)> = HashSet::new();
    // Agents that already received their one add_permission this run.
    let mut permission_given: HashSet<String> = HashSet::new();

    let push = |by_agent: &mut BTreeMap<String, Vec<Recommendation>>,
                emitted: &mut HashSet<(String, &'static str, String)>,
                rec: Recommendation,
                payload: String| {
        let key = (rec.agent_id.clone(), rec.action.as_str(), payload);
        if emitted.insert(key) {
            by_agent.entry(rec.agent_id.clone()).or_default().push(rec);
        }
    };

    for gap in gaps
        .all_gaps
        .iter()
        .filter(|gap| gap.priority >= min_priority)
    {
        match gap.kind {
            GapKind::MissingScope | GapKind::FrequentScopeViolation => {
                let scope = match &gap.scope {
                    Some(scope) => scope,
                    // A scope-shaped gap without a named scope has nothing
                    // concrete to propose.
                    None => continue,
                };
                let (_scope_type, scope_resource) = split_scope(scope);
                for agent in &registry.nhas {
                    if !matcher.matches(scope_resource, agent) {
                        continue;
                    }
                    if agent.has_scope(scope) {
                        tracing::debug!(
                            agent = %agent.id,
                            %scope,
                            "scope already granted; suppressing recommendation"
                        );
                        continue;
                    }
                    push(
                        &mut by_agent,
                        &mut emitted,
                        Recommendation {
                            agent_id: agent.id.clone(),
                            agent_name: agent.name.clone(),
                            action: RecommendationAction::AddScope,
                            rationale: format!(
                                "grant scope '{}' to '{}': {}",
                                scope, agent.id, gap.rationale
                            ),
                            priority: gap.priority,
                            violation_count: gap.violation_count.unwrap_or(0),
                            scope: Some(scope.clone()),
                            secret: None,
                            permission: None,
                            top_actions: None,
                            top_scopes: None,
                        },
                        scope.clone(),
                    );
                }
            }

            GapKind::MissingSecret => {
                let secret = match &gap.secret {
                    Some(secret) => secret,
                    None => continue,
                };
                let agent = match secret_owner(secret).and_then(|id| registry.find(&id)) {
                    Some(agent) => agent,
                    None => continue,
                };
                if agent.has_secret(secret) {
                    continue;
                }
                push(
                    &mut by_agent,
                    &mut emitted,
                    Recommendation {
                        agent_id: agent.id.clone(),
                        agent_name: agent.name.clone(),
                        action: RecommendationAction::AddSecret,
                        rationale: format!(
                            "declare secret '{}' for '{}': {}",
                            secret, agent.id, gap.rationale
                        ),
                        priority: gap.priority,
                        violation_count: gap.violation_count.unwrap_or(0),
                        scope: None,
                        secret: Some(secret.clone()),
                        permission: None,
                        top_actions: None,
                        top_scopes: None,
                    },
                    secret.clone(),
                );
            }

            GapKind::AgentPolicyGap => {
                let agent = match gap.agent_id.as_deref().and_then(|id| registry.find(id)) {
                    Some(agent) => agent,
                    None => continue,
                };

                if !permission_given.contains(&agent.id) {
                    if let Some(permission) = first_missing_permission(agent) {
                        permission_given.insert(agent.id.clone());
                        push(
                            &mut by_agent,
                            &mut emitted,
                            Recommendation {
                                agent_id: agent.id.clone(),
                                agent_name: agent.name.clone(),
                                action: RecommendationAction::AddPermission,
                                rationale: format!(
                                    "grant permission '{}' to '{}': {}",
                                    permission, agent.id, gap.rationale
                                ),
                                priority: gap.priority,
                                violation_count: gap.violation_count.unwrap_or(0),
                                scope: None,
                                secret: None,
                                permission: Some(permission.to_string()),
                                top_actions: None,
                                top_scopes: None,
                            },
                            permission.to_string(),
                        );
                    }
                }

                push(
                    &mut by_agent,
                    &mut emitted,
                    Recommendation {
                        agent_id: agent.id.clone(),
                        agent_name: agent.name.clone(),
                        action: RecommendationAction::ReviewAgentPolicy,
                        rationale: gap.rationale.clone(),
                        priority: gap.priority,
                        violation_count: gap.violation_count.unwrap_or(0),
                        scope: None,
                        secret: None,
                        permission: None,
                        top_actions: gap.top_actions.clone(),
                        top_scopes: gap.top_scopes.clone(),
                    },
                    String::new(),
                );
            }

            GapKind::UnknownAgent => {
                let unresolved = gap.agent_id.clone().unwrap_or_default();
                push(
                    &mut by_agent,
                    &mut emitted,
                    Recommendation {
                        agent_id: UNKNOWN_AGENT_ID.to_string(),
                        agent_name: UNKNOWN_AGENT_ID.to_string(),
                        action: RecommendationAction::InvestigateAgent,
                        rationale: gap.rationale.clone(),
                        priority: gap.priority,
                        violation_count: gap.violation_count.unwrap_or(0),
                        scope: None,
                        secret: None,
                        permission: None,
                        top_actions: None,
                        top_scopes: None,
                    },
                    unresolved,
                );
            }

            // The catch-all permission gap names no agent; it stays in the
            // gaps report for a human, with nothing concrete to propose.
            GapKind::PermissionGap => {}
        }
    }

    let agents: Vec<AgentRecommendations> = by_agent
        .into_iter()
        .map(|(id, recommendations)| AgentRecommendations {
            id,
            recommendations,
        })
        .collect();

    let mut summary: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0usize;
    for agent in &agents {
        for rec in &agent.recommendations {
            *summary.entry(rec.action.as_str().to_string()).or_insert(0) += 1;
            total += 1;
        }
    }

    tracing::debug!(total, agents = agents.len(), "recommendation pass complete");

    RecommendationsDocument {
        generated_at: Utc::now(),
        total_recommendations: total,
        summary,
        agents,
    }
}

/// Split a scope on its first colon: `"write:index"` → `("write", "index")`.
/// A scope with no colon has an empty resource.
fn split_scope(scope: &str) -> (&str, &str) {
    match scope.split_once(':') {
        Some((scope_type, resource)) => (scope_type, resource),
        None => (scope, ""),
    }
}

/// Resolve a `nha/<agent>/<type>` secret identifier to a registry id.
fn secret_owner(secret: &str) -> Option<String> {
    let rest = secret.strip_prefix("nha/")?;
    let (agent, _secret_type) = rest.split_once('/')?;
    if agent.is_empty() {
        return None;
    }
    Some(format!("nha:{}", agent))
}

/// The first candidate permission the agent does not already hold.
fn first_missing_permission(agent: &AgentRegistryEntry) -> Option<&'static str> {
    CANDIDATE_PERMISSIONS
        .iter()
        .copied()
        .find(|permission| !agent.has_permission(permission))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::DefaultMatcher;
    use chrono::Utc;
    use nha_registry::Capability;

    fn registry() -> Registry {
        Registry {
            nhas: vec![
                AgentRegistryEntry {
                    id: "nha:crawler-01".to_string(),
                    name: "index-crawler".to_string(),
                    category: "infra".to_string(),
                    ..Default::default()
                },
                AgentRegistryEntry {
                    id: "nha:rag-worker".to_string(),
                    name: "rag-worker".to_string(),
                    category: "mlops".to_string(),
                    capabilities: vec![Capability {
                        scopes: vec!["read:rag".to_string()],
                    }],
                    permissions: vec!["run.invoker".to_string()],
                    secrets: vec!["nha/rag-worker/api-key".to_string()],
                },
            ],
        }
    }

    fn report(gaps: Vec<PolicyGap>) -> GapsReport {
        GapsReport {
            generated_at: Utc::now(),
            source_file: "reports/policy_gaps.json".to_string(),
            all_gaps: gaps,
        }
    }

    fn scope_gap(scope: &str, priority: Priority, count: u64) -> PolicyGap {
        PolicyGap::new(GapKind::MissingScope, priority, "scope denials")
            .with_scope(scope)
            .with_count(count)
    }

    #[test]
    fn scope_gap_targets_matching_agent() {
        let gaps = report(vec![scope_gap("write:index", Priority::Medium, 5)]);
        let doc = recommend(&gaps, &registry(), Priority::Medium, &DefaultMatcher);

        assert_eq!(doc.total_recommendations, 1);
        let rec = doc.all_recommendations().next().unwrap();
        assert_eq!(rec.agent_id, "nha:crawler-01");
        assert_eq!(rec.action, RecommendationAction::AddScope);
        assert_eq!(rec.scope.as_deref(), Some("write:index"));
        assert_eq!(rec.violation_count, 5);
        assert_eq!(doc.summary["add_scope"], 1);
    }

    #[test]
    fn already_granted_scope_is_suppressed() {
        let gaps = report(vec![scope_gap("read:rag", Priority::High, 12)]);
        let doc = recommend(&gaps, &registry(), Priority::Low, &DefaultMatcher);
        // rag-worker matches by name and category but already holds read:rag.
        assert!(doc
            .all_recommendations()
            .all(|r| r.agent_id != "nha:rag-worker" || r.action != RecommendationAction::AddScope));
    }

    #[test]
    fn duplicate_gaps_emit_once() {
        let gaps = report(vec![
            scope_gap("write:index", Priority::Medium, 5),
            scope_gap("write:index", Priority::Medium, 5),
        ]);
        let doc = recommend(&gaps, &registry(), Priority::Medium, &DefaultMatcher);
        assert_eq!(doc.total_recommendations, 1);
    }

    #[test]
    fn run_is_idempotent_over_unchanged_inputs() {
        let gaps = report(vec![
            scope_gap("write:index", Priority::Medium, 5),
            PolicyGap::new(GapKind::UnknownAgent, Priority::High, "unresolved")
                .with_agent("nha:ghost")
                .with_count(2),
        ]);
        let reg = registry();
        let first = recommend(&gaps, &reg, Priority::Medium, &DefaultMatcher);
        let second = recommend(&gaps, &reg, Priority::Medium, &DefaultMatcher);
        // Identical modulo the generation timestamp.
        assert_eq!(first.total_recommendations, second.total_recommendations);
        assert_eq!(first.summary, second.summary);
        let a: Vec<_> = first.all_recommendations().collect();
        let b: Vec<_> = second.all_recommendations().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn min_priority_filter_is_monotone() {
        let gaps = report(vec![
            scope_gap("write:index", Priority::Low, 1),
            scope_gap("read:cost", Priority::Medium, 3),
            PolicyGap::new(GapKind::UnknownAgent, Priority::High, "unresolved")
                .with_agent("nha:ghost")
                .with_count(2),
        ]);
        let reg = registry();

        let low = recommend(&gaps, &reg, Priority::Low, &DefaultMatcher);
        let medium = recommend(&gaps, &reg, Priority::Medium, &DefaultMatcher);
        let high = recommend(&gaps, &reg, Priority::High, &DefaultMatcher);

        assert!(high.total_recommendations <= medium.total_recommendations);
        assert!(medium.total_recommendations <= low.total_recommendations);

        let low_set: Vec<_> = low.all_recommendations().collect();
        for rec in high.all_recommendations() {
            assert!(low_set.contains(&rec));
        }
    }

    #[test]
    fn secret_gap_resolves_owner_directly() {
        let gaps = report(vec![PolicyGap::new(
            GapKind::MissingSecret,
            Priority::Medium,
            "secret denials",
        )
        .with_secret("nha/crawler-01/index-token")
        .with_count(2)]);
        let doc = recommend(&gaps, &registry(), Priority::Medium, &DefaultMatcher);

        assert_eq!(doc.total_recommendations, 1);
        let rec = doc.all_recommendations().next().unwrap();
        assert_eq!(rec.agent_id, "nha:crawler-01");
        assert_eq!(rec.action, RecommendationAction::AddSecret);
        assert_eq!(rec.secret.as_deref(), Some("nha/crawler-01/index-token"));
    }

    #[test]
    fn already_held_secret_is_suppressed() {
        let gaps = report(vec![PolicyGap::new(
            GapKind::MissingSecret,
            Priority::High,
            "secret denials",
        )
        .with_secret("nha/rag-worker/api-key")]);
        let doc = recommend(&gaps, &registry(), Priority::Low, &DefaultMatcher);
        assert_eq!(doc.total_recommendations, 0);
    }

    #[test]
    fn unshaped_secret_is_skipped() {
        let gaps = report(vec![PolicyGap::new(
            GapKind::MissingSecret,
            Priority::Medium,
            "secret denials",
        )
        .with_secret("unknown")]);
        let doc = recommend(&gaps, &registry(), Priority::Medium, &DefaultMatcher);
        assert_eq!(doc.total_recommendations, 0);
    }

    #[test]
    fn agent_policy_gap_yields_one_permission_and_a_review() {
        let gap = PolicyGap::new(GapKind::AgentPolicyGap, Priority::High, "systemic")
            .with_agent("nha:rag-worker")
            .with_count(15);
        let doc = recommend(&report(vec![gap]), &registry(), Priority::Medium, &DefaultMatcher);

        assert_eq!(doc.summary["add_permission"], 1);
        assert_eq!(doc.summary["review_agent_policy"], 1);
        let permission = doc
            .all_recommendations()
            .find(|r| r.action == RecommendationAction::AddPermission)
            .unwrap();
        // rag-worker already has run.invoker; the next candidate is chosen.
        assert_eq!(permission.permission.as_deref(), Some("storage.objectViewer"));
    }

    #[test]
    fn at_most_one_permission_per_agent_per_run() {
        let gaps = report(vec![
            PolicyGap::new(GapKind::AgentPolicyGap, Priority::High, "systemic")
                .with_agent("nha:crawler-01")
                .with_count(10),
            PolicyGap::new(GapKind::AgentPolicyGap, Priority::High, "still systemic")
                .with_agent("nha:crawler-01")
                .with_count(12),
        ]);
        let doc = recommend(&gaps, &registry(), Priority::Medium, &DefaultMatcher);
        assert_eq!(doc.summary["add_permission"], 1);
    }

    #[test]
    fn unknown_agent_becomes_investigation() {
        let gaps = report(vec![PolicyGap::new(
            GapKind::UnknownAgent,
            Priority::High,
            "agent 'nha:ghost' does not resolve",
        )
        .with_agent("nha:ghost")
        .with_count(4)]);
        let doc = recommend(&gaps, &registry(), Priority::Medium, &DefaultMatcher);

        assert_eq!(doc.agents.len(), 1);
        assert_eq!(doc.agents[0].id, "unknown");
        let rec = &doc.agents[0].recommendations[0];
        assert_eq!(rec.action, RecommendationAction::InvestigateAgent);
        assert!(rec.rationale.contains("nha:ghost"));
    }

    #[test]
    fn catch_all_permission_gap_proposes_nothing() {
        let gaps = report(vec![PolicyGap::new(
            GapKind::PermissionGap,
            Priority::High,
            "permission denials",
        )
        .with_count(9)]);
        let doc = recommend(&gaps, &registry(), Priority::Low, &DefaultMatcher);
        assert_eq!(doc.total_recommendations, 0);
    }

    #[test]
    fn scope_splitting() {
        assert_eq!(split_scope("write:index"), ("write", "index"));
        assert_eq!(split_scope("read:rag:deep"), ("read", "rag:deep"));
        assert_eq!(split_scope("bare"), ("bare", ""));
    }

    #[test]
    fn secret_owner_parsing() {
        assert_eq!(
            secret_owner("nha/rag-worker/api-key").as_deref(),
            Some("nha:rag-worker")
        );
        assert!(secret_owner("unknown").is_none());
        assert!(secret_owner("nha/only-agent").is_none());
        assert!(secret_owner("nha//type").is_none());
    }
}
