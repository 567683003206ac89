//! Capability-based agent scoring and selection.
//!
//! For each subtask every known agent profile is scored against the required
//! capabilities; the maximum wins, ties broken by lower in-flight load. The
//! weights are operationally tunable through [`RouterConfig`]; the defaults
//! are the illustrative values from the product design.

use crate::capability::graph::{CapabilityGraph, RelationStrength};
use crate::capability::profile::AgentProfile;
use crate::core::ids::{AgentId, SubtaskId};
use crate::task::entities::Subtask;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tunable scoring weights and the routing floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub exact_weight: f64,
    /// Applied only to required capabilities with no exact binding.
    pub hierarchical_weight: f64,
    pub primary_weight: f64,
    pub specialized_weight: f64,
    pub load_weight: f64,
    /// Below this score no agent qualifies and the fallback agent is used.
    pub min_score: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            exact_weight: 0.70,
            hierarchical_weight: 0.50,
            primary_weight: 0.10,
            specialized_weight: 0.05,
            load_weight: 0.10,
            min_score: 0.25,
        }
    }
}

/// Result of routing one subtask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub subtask_id: SubtaskId,
    pub agent: AgentId,
    pub score: f64,
    /// True when no agent cleared `min_score` and the fallback was used.
    pub fallback_used: bool,
}

/// Score one agent against a subtask's required capabilities.
///
/// Deterministic for a fixed graph, profile and load.
pub fn score_agent(
    config: &RouterConfig,
    graph: &CapabilityGraph,
    profile: &AgentProfile,
    subtask: &Subtask,
    load: usize,
) -> f64 {
    let required = &subtask.required_capabilities;
    if required.is_empty() {
        // Nothing to match on; only the load term applies.
        return config.load_weight * load_balance_term(load);
    }

    let mut exact_sum = 0.0;
    let mut hierarchical_sum = 0.0;
    let mut any_primary = false;
    let mut any_specialized = false;

    for capability in required {
        if let Some(binding) = profile.binding_for(capability) {
            // Exact match short-circuits the graph walk for this capability.
            exact_sum += binding.proficiency * binding.confidence;
            any_primary |= binding.is_primary;
            any_specialized |= binding.is_specialized;
        } else {
            // Strongest relationship across all of the agent's bindings.
            let best = profile
                .bindings
                .iter()
                .map(|b| {
                    let strength = graph.relationship(capability, &b.capability);
                    if strength == RelationStrength::Exact {
                        // Identity is handled by the exact branch above.
                        0.0
                    } else {
                        strength.multiplier() * b.proficiency
                    }
                })
                .fold(0.0, f64::max);
            hierarchical_sum += best;
        }
    }

    let n = required.len() as f64;
    config.exact_weight * (exact_sum / n)
        + config.hierarchical_weight * (hierarchical_sum / n)
        + config.primary_weight * if any_primary { 1.0 } else { 0.0 }
        + config.specialized_weight * if any_specialized { 1.0 } else { 0.0 }
        + config.load_weight * load_balance_term(load)
}

/// Inverse of the agent's current in-flight subtask count.
fn load_balance_term(load: usize) -> f64 {
    1.0 / (1.0 + load as f64)
}

/// Select the best agent for a subtask.
///
/// Ties are broken by lower load, then by agent id for full determinism.
/// When no agent clears `min_score` the designated fallback agent is chosen
/// and flagged; routing failure is data, never an error.
pub fn select_agent(
    config: &RouterConfig,
    graph: &CapabilityGraph,
    profiles: &[AgentProfile],
    subtask: &Subtask,
    loads: &HashMap<AgentId, usize>,
    fallback: &AgentId,
) -> RoutingDecision {
    let mut best: Option<(&AgentProfile, f64, usize)> = None;

    for profile in profiles {
        let load = loads.get(&profile.agent).copied().unwrap_or(0);
        let score = score_agent(config, graph, profile, subtask, load);

        let better = match &best {
            None => true,
            Some((current, best_score, best_load)) => {
                score > *best_score
                    || (score == *best_score && load < *best_load)
                    || (score == *best_score && load == *best_load
                        && profile.agent < current.agent)
            }
        };
        if better {
            best = Some((profile, score, load));
        }
    }

    match best {
        Some((profile, score, _)) if score >= config.min_score => RoutingDecision {
            subtask_id: subtask.id.clone(),
            agent: profile.agent.clone(),
            score,
            fallback_used: false,
        },
        _ => RoutingDecision {
            subtask_id: subtask.id.clone(),
            agent: fallback.clone(),
            score: best.map(|(_, score, _)| score).unwrap_or(0.0),
            fallback_used: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::entities::{Capability, CapabilityCategory, CapabilityLevel};
    use crate::capability::profile::CapabilityBinding;
    use crate::core::ids::RequestId;

    fn graph() -> CapabilityGraph {
        CapabilityGraph::builder()
            .add(Capability::new(
                "record_lookup",
                CapabilityLevel::Operational,
                CapabilityCategory::DataManagement,
            ))
            .add(
                Capability::new(
                    "player_lookup",
                    CapabilityLevel::Operational,
                    CapabilityCategory::DataManagement,
                )
                .with_parent("record_lookup"),
            )
            .add(
                Capability::new(
                    "team_lookup",
                    CapabilityLevel::Operational,
                    CapabilityCategory::DataManagement,
                )
                .with_parent("record_lookup"),
            )
            .add(Capability::new(
                "payment_creation",
                CapabilityLevel::Tactical,
                CapabilityCategory::Financial,
            ))
            .build()
            .unwrap()
    }

    fn subtask(capability: &str) -> Subtask {
        Subtask::new("st-1", "test subtask", RequestId::new("req-1")).with_capability(capability)
    }

    #[test]
    fn test_exact_match_beats_hierarchical() {
        let graph = graph();
        let config = RouterConfig::default();
        let exact = AgentProfile::new("data-agent")
            .with_binding(CapabilityBinding::new("player_lookup", 0.9));
        let related = AgentProfile::new("generalist")
            .with_binding(CapabilityBinding::new("team_lookup", 0.9));

        let subtask = subtask("player_lookup");
        let exact_score = score_agent(&config, &graph, &exact, &subtask, 0);
        let related_score = score_agent(&config, &graph, &related, &subtask, 0);

        assert!(exact_score > related_score);
        // Sibling relationship still contributes
        assert!(related_score > config.load_weight);
    }

    #[test]
    fn test_primary_and_specialized_bonuses() {
        let graph = graph();
        let config = RouterConfig::default();
        let plain = AgentProfile::new("plain")
            .with_binding(CapabilityBinding::new("player_lookup", 0.8));
        let primary = AgentProfile::new("primary")
            .with_binding(CapabilityBinding::new("player_lookup", 0.8).primary().specialized());

        let subtask = subtask("player_lookup");
        let plain_score = score_agent(&config, &graph, &plain, &subtask, 0);
        let primary_score = score_agent(&config, &graph, &primary, &subtask, 0);

        let expected_bonus = config.primary_weight + config.specialized_weight;
        assert!((primary_score - plain_score - expected_bonus).abs() < 1e-9);
    }

    #[test]
    fn test_load_breaks_ties() {
        let graph = graph();
        let config = RouterConfig::default();
        let a = AgentProfile::new("agent-a")
            .with_binding(CapabilityBinding::new("player_lookup", 0.9));
        let b = AgentProfile::new("agent-b")
            .with_binding(CapabilityBinding::new("player_lookup", 0.9));

        let mut loads = HashMap::new();
        loads.insert(AgentId::new("agent-a"), 3);
        loads.insert(AgentId::new("agent-b"), 0);

        let decision = select_agent(
            &config,
            &graph,
            &[a, b],
            &subtask("player_lookup"),
            &loads,
            &AgentId::new("fallback"),
        );

        assert_eq!(decision.agent, AgentId::new("agent-b"));
        assert!(!decision.fallback_used);
    }

    #[test]
    fn test_exact_tie_prefers_stable_agent_order() {
        let graph = graph();
        let config = RouterConfig::default();
        let a = AgentProfile::new("agent-a")
            .with_binding(CapabilityBinding::new("player_lookup", 0.9));
        let b = AgentProfile::new("agent-b")
            .with_binding(CapabilityBinding::new("player_lookup", 0.9));

        // Same score, same load: lowest agent id wins regardless of slice order
        let first = select_agent(
            &config,
            &graph,
            &[a.clone(), b.clone()],
            &subtask("player_lookup"),
            &HashMap::new(),
            &AgentId::new("fallback"),
        );
        let second = select_agent(
            &config,
            &graph,
            &[b, a],
            &subtask("player_lookup"),
            &HashMap::new(),
            &AgentId::new("fallback"),
        );

        assert_eq!(first.agent, AgentId::new("agent-a"));
        assert_eq!(second.agent, AgentId::new("agent-a"));
    }

    #[test]
    fn test_below_threshold_routes_to_fallback() {
        let graph = graph();
        let config = RouterConfig::default();
        let unrelated = AgentProfile::new("scheduler")
            .with_binding(CapabilityBinding::new("payment_creation", 0.2));

        let decision = select_agent(
            &config,
            &graph,
            &[unrelated],
            &subtask("player_lookup"),
            &HashMap::new(),
            &AgentId::new("concierge-fallback"),
        );

        assert!(decision.fallback_used);
        assert_eq!(decision.agent, AgentId::new("concierge-fallback"));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let graph = graph();
        let config = RouterConfig::default();
        let profile = AgentProfile::new("data-agent")
            .with_binding(CapabilityBinding::new("team_lookup", 0.7))
            .with_binding(CapabilityBinding::new("payment_creation", 0.4));
        let subtask = subtask("player_lookup");

        let first = score_agent(&config, &graph, &profile, &subtask, 2);
        let second = score_agent(&config, &graph, &profile, &subtask, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_required_capabilities_scores_load_only() {
        let graph = graph();
        let config = RouterConfig::default();
        let profile = AgentProfile::new("data-agent")
            .with_binding(CapabilityBinding::new("player_lookup", 1.0));
        let bare = Subtask::new("st-1", "anything", RequestId::new("req-1"));

        let score = score_agent(&config, &graph, &profile, &bare, 0);
        assert_eq!(score, config.load_weight);
    }
}
