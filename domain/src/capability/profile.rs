//! Agent capability profiles.

use crate::core::error::DomainError;
use crate::core::ids::{AgentId, CapabilityId};
use serde::{Deserialize, Serialize};

/// Maximum number of bindings an agent may mark as primary ("home" skills).
pub const MAX_PRIMARY: usize = 3;

/// One capability an agent declares, with proficiency and confidence in [0,1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityBinding {
    pub capability: CapabilityId,
    pub proficiency: f64,
    pub is_primary: bool,
    pub is_specialized: bool,
    pub confidence: f64,
}

impl CapabilityBinding {
    /// Creates a binding with proficiency and confidence clamped to [0,1].
    pub fn new(capability: impl Into<CapabilityId>, proficiency: f64) -> Self {
        Self {
            capability: capability.into(),
            proficiency: proficiency.clamp(0.0, 1.0),
            is_primary: false,
            is_specialized: false,
            confidence: 1.0,
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn specialized(mut self) -> Self {
        self.is_specialized = true;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

/// An agent's declared capability profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub agent: AgentId,
    pub bindings: Vec<CapabilityBinding>,
}

impl AgentProfile {
    pub fn new(agent: impl Into<AgentId>) -> Self {
        Self {
            agent: agent.into(),
            bindings: Vec::new(),
        }
    }

    pub fn with_binding(mut self, binding: CapabilityBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Enforce the primary-binding bounds: every routable agent declares at
    /// least one primary capability and at most [`MAX_PRIMARY`]. Called by
    /// registries before a profile is admitted to routing.
    pub fn validate(&self) -> Result<(), DomainError> {
        let primary_count = self.bindings.iter().filter(|b| b.is_primary).count();
        if primary_count == 0 {
            return Err(DomainError::InvalidProfile(format!(
                "agent '{}' declares no primary capability",
                self.agent
            )));
        }
        if primary_count > MAX_PRIMARY {
            return Err(DomainError::InvalidProfile(format!(
                "agent '{}' marks {} capabilities as primary (max {})",
                self.agent, primary_count, MAX_PRIMARY
            )));
        }
        Ok(())
    }

    pub fn binding_for(&self, capability: &CapabilityId) -> Option<&CapabilityBinding> {
        self.bindings.iter().find(|b| &b.capability == capability)
    }

    pub fn declares(&self, capability: &CapabilityId) -> bool {
        self.binding_for(capability).is_some()
    }
}
