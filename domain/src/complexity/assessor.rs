//! Complexity assessment — a deterministic, configurable scoring function.
//!
//! Operators retune weights, base scores and thresholds through
//! [`ComplexityConfig`] (fed from the config file) without code changes.
//! `assess` is pure: identical inputs always produce identical results.

use crate::intent::entities::IntentResult;
use crate::pipeline::context::SessionInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complexity tier of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    Simple,
    Moderate,
    Complex,
}

impl ComplexityTier {
    pub fn as_str(&self) -> &str {
        match self {
            ComplexityTier::Simple => "simple",
            ComplexityTier::Moderate => "moderate",
            ComplexityTier::Complex => "complex",
        }
    }
}

impl std::fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the assessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityResult {
    pub tier: ComplexityTier,
    pub score: f64,
    /// Estimated processing budget in seconds.
    pub estimated_secs: f64,
    /// Dependency markers detected in the request text.
    pub dependency_count: usize,
}

/// Tunable weights, scores and thresholds for the assessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityConfig {
    /// Weight applied to the per-intent base score.
    pub intent_weight: f64,
    /// Weight applied to the summed entity scores.
    pub entity_weight: f64,
    /// Weight applied to session context signals.
    pub context_weight: f64,
    /// Weight applied to the detected dependency count.
    pub dependency_weight: f64,
    /// Base score per intent label; unknown intents use `default_intent_score`.
    pub intent_base_scores: HashMap<String, f64>,
    pub default_intent_score: f64,
    /// Score per entity key; unknown entity keys use `default_entity_score`.
    pub entity_type_scores: HashMap<String, f64>,
    pub default_entity_score: f64,
    /// Score added per context signal (group channel, prior turn present).
    pub context_signal_score: f64,
    /// Tier thresholds: score <= simple_max is Simple, <= moderate_max is
    /// Moderate, anything above is Complex.
    pub simple_max: f64,
    pub moderate_max: f64,
    /// Base processing time per tier, seconds.
    pub simple_base_secs: f64,
    pub moderate_base_secs: f64,
    pub complex_base_secs: f64,
    /// Time adjustments, seconds.
    pub per_entity_secs: f64,
    pub per_dependency_secs: f64,
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        let mut intent_base_scores = HashMap::new();
        intent_base_scores.insert("general_query".to_string(), 1.0);
        intent_base_scores.insert("list_players".to_string(), 1.0);
        intent_base_scores.insert("player_status".to_string(), 2.0);
        intent_base_scores.insert("create_payment".to_string(), 3.0);
        intent_base_scores.insert("schedule_event".to_string(), 3.0);

        let mut entity_type_scores = HashMap::new();
        entity_type_scores.insert("player_name".to_string(), 1.0);
        entity_type_scores.insert("amount".to_string(), 1.5);
        entity_type_scores.insert("date".to_string(), 1.5);

        Self {
            intent_weight: 1.0,
            entity_weight: 0.5,
            context_weight: 0.5,
            dependency_weight: 1.0,
            intent_base_scores,
            default_intent_score: 2.0,
            entity_type_scores,
            default_entity_score: 0.5,
            context_signal_score: 1.0,
            simple_max: 2.0,
            moderate_max: 4.5,
            simple_base_secs: 2.0,
            moderate_base_secs: 5.0,
            complex_base_secs: 12.0,
            per_entity_secs: 0.5,
            per_dependency_secs: 2.0,
        }
    }
}

/// Phrases that signal one step depends on another.
const DEPENDENCY_MARKERS: &[&str] = &["and then", "after that", "once that", "followed by"];

/// Count dependency markers in the request text.
pub fn detect_dependencies(request_text: &str) -> usize {
    let lower = request_text.to_lowercase();
    DEPENDENCY_MARKERS
        .iter()
        .map(|marker| lower.matches(marker).count())
        .sum()
}

/// Score a request and bucket it into a tier. Pure and idempotent.
pub fn assess(
    config: &ComplexityConfig,
    intent: &IntentResult,
    session: &SessionInfo,
    request_text: &str,
) -> ComplexityResult {
    let intent_score = config
        .intent_base_scores
        .get(intent.intent.as_str())
        .copied()
        .unwrap_or(config.default_intent_score);

    // Sum entity scores in key order for determinism.
    let mut entity_keys: Vec<&String> = intent.entities.keys().collect();
    entity_keys.sort();
    let entity_score: f64 = entity_keys
        .iter()
        .map(|key| {
            config
                .entity_type_scores
                .get(key.as_str())
                .copied()
                .unwrap_or(config.default_entity_score)
        })
        .sum();

    let mut context_signals = 0.0;
    if session.is_group_channel() {
        context_signals += config.context_signal_score;
    }
    if session.prior_turn_summary.is_some() {
        context_signals += config.context_signal_score;
    }

    let dependency_count = detect_dependencies(request_text);

    let score = config.intent_weight * intent_score
        + config.entity_weight * entity_score
        + config.context_weight * context_signals
        + config.dependency_weight * dependency_count as f64;

    let tier = if score <= config.simple_max {
        ComplexityTier::Simple
    } else if score <= config.moderate_max {
        ComplexityTier::Moderate
    } else {
        ComplexityTier::Complex
    };

    let base_secs = match tier {
        ComplexityTier::Simple => config.simple_base_secs,
        ComplexityTier::Moderate => config.moderate_base_secs,
        ComplexityTier::Complex => config.complex_base_secs,
    };
    let estimated_secs = base_secs
        + intent.entity_count() as f64 * config.per_entity_secs
        + dependency_count as f64 * config.per_dependency_secs;

    ComplexityResult {
        tier,
        score,
        estimated_secs,
        dependency_count,
    }
}
