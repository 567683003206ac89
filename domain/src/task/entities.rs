//! Subtask entities

use crate::core::ids::{CapabilityId, RequestId, SubtaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One unit of decomposed work requiring specific capabilities.
///
/// Immutable once created; consumed exactly once by the router/executor pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub id: SubtaskId,
    pub description: String,
    pub required_capabilities: Vec<CapabilityId>,
    pub parameters: HashMap<String, serde_json::Value>,
    /// Request this subtask was decomposed from.
    pub request_id: RequestId,
    /// A failed critical subtask aborts the whole request.
    pub critical: bool,
}

impl Subtask {
    pub fn new(
        id: impl Into<SubtaskId>,
        description: impl Into<String>,
        request_id: RequestId,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            required_capabilities: Vec::new(),
            parameters: HashMap::new(),
            request_id,
            critical: false,
        }
    }

    pub fn with_capability(mut self, capability: impl Into<CapabilityId>) -> Self {
        self.required_capabilities.push(capability.into());
        self
    }

    pub fn with_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }
}

/// Outcome of executing one subtask, post-validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskOutcome {
    pub subtask_id: SubtaskId,
    pub success: bool,
    /// Final text for this subtask (validated, possibly corrected).
    pub text: String,
    pub critical: bool,
    /// Set when the validator replaced the agent's text.
    pub corrected: bool,
}

impl SubtaskOutcome {
    pub fn success(subtask: &Subtask, text: impl Into<String>) -> Self {
        Self {
            subtask_id: subtask.id.clone(),
            success: true,
            text: text.into(),
            critical: subtask.critical,
            corrected: false,
        }
    }

    pub fn failure(subtask: &Subtask, reason: impl Into<String>) -> Self {
        Self {
            subtask_id: subtask.id.clone(),
            success: false,
            text: reason.into(),
            critical: subtask.critical,
            corrected: false,
        }
    }

    pub fn corrected(mut self) -> Self {
        self.corrected = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtask_builder() {
        let subtask = Subtask::new("st-1", "Look up active players", RequestId::new("req-1"))
            .with_capability("player_lookup")
            .with_parameter("status", "active")
            .critical();

        assert_eq!(subtask.id.as_str(), "st-1");
        assert_eq!(subtask.required_capabilities.len(), 1);
        assert!(subtask.critical);
    }

    #[test]
    fn test_outcome_carries_criticality() {
        let subtask =
            Subtask::new("st-1", "desc", RequestId::new("req-1")).critical();
        let outcome = SubtaskOutcome::failure(&subtask, "agent unreachable");
        assert!(!outcome.success);
        assert!(outcome.critical);
        assert!(!outcome.corrected);
    }
}
