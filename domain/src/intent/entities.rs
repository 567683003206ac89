//! Intent classification entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A coarse intent label.
///
/// Open set: well-known intents get template decomposition, anything else
/// flows through the model-driven path, so novel labels proposed by the
/// classifier survive without a code change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Intent(String);

impl Intent {
    pub const GENERAL_QUERY: &str = "general_query";
    pub const LIST_PLAYERS: &str = "list_players";
    pub const PLAYER_STATUS: &str = "player_status";
    pub const CREATE_PAYMENT: &str = "create_payment";
    pub const SCHEDULE_EVENT: &str = "schedule_event";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Default intent used when classification fails.
    pub fn general_query() -> Self {
        Self::new(Self::GENERAL_QUERY)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_general_query(&self) -> bool {
        self.0 == Self::GENERAL_QUERY
    }
}

impl From<String> for Intent {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Intent {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output of the intent classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    /// Extracted entities (e.g. {"player_name": "Alice", "amount": 25})
    pub entities: HashMap<String, serde_json::Value>,
    /// Classifier confidence in [0,1]
    pub confidence: f64,
}

impl IntentResult {
    pub fn new(intent: impl Into<Intent>, confidence: f64) -> Self {
        Self {
            intent: intent.into(),
            entities: HashMap::new(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Low-confidence default returned when the classifier service fails.
    pub fn fallback() -> Self {
        Self::new(Intent::general_query(), 0.0)
    }

    pub fn with_entity(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.entities.insert(key.into(), value.into());
        self
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}
