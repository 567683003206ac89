//! In-memory agent registry.
//!
//! Profiles are validated at registration time, which is what lets the
//! pipeline treat every profile it reads as trusted.

use concierge_application::AgentRegistryPort;
use concierge_domain::{
    AgentId, AgentProfile, Capability, CapabilityBinding, CapabilityCategory, CapabilityGraph,
    CapabilityLevel, DomainError,
};
use tracing::info;

/// Registry backed by a plain vector; agents are registered at startup and
/// the set never changes during a run.
pub struct InMemoryAgentRegistry {
    profiles: Vec<AgentProfile>,
    fallback: AgentId,
}

impl InMemoryAgentRegistry {
    pub fn new(fallback: impl Into<AgentId>) -> Self {
        Self {
            profiles: Vec::new(),
            fallback: fallback.into(),
        }
    }

    /// Register an agent. Rejects invalid profiles (no primary capability,
    /// too many primaries) so bad profiles never reach the router.
    pub fn register(&mut self, profile: AgentProfile) -> Result<(), DomainError> {
        profile.validate()?;
        info!(agent = %profile.agent, bindings = profile.bindings.len(), "agent registered");
        self.profiles.push(profile);
        Ok(())
    }

    /// The demo roster paired with [`default_graph`].
    pub fn demo() -> Result<Self, DomainError> {
        let mut registry = Self::new("concierge_general");
        registry.register(
            AgentProfile::new("operations")
                .with_binding(CapabilityBinding::new("player_lookup", 0.95).primary())
                .with_binding(CapabilityBinding::new("member_lookup", 0.85))
                .with_binding(CapabilityBinding::new("record_lookup", 0.8)),
        )?;
        registry.register(
            AgentProfile::new("finance")
                .with_binding(CapabilityBinding::new("payment_lookup", 0.9).primary())
                .with_binding(
                    CapabilityBinding::new("payment_creation", 0.9)
                        .specialized()
                        .with_confidence(0.95),
                ),
        )?;
        registry.register(
            AgentProfile::new("scheduler")
                .with_binding(CapabilityBinding::new("event_scheduling", 0.9).primary()),
        )?;
        registry.register(
            AgentProfile::new("concierge_general")
                .with_binding(CapabilityBinding::new("general_assistance", 0.7).primary()),
        )?;
        Ok(registry)
    }
}

impl AgentRegistryPort for InMemoryAgentRegistry {
    fn profiles(&self) -> Vec<AgentProfile> {
        self.profiles.clone()
    }

    fn fallback_agent(&self) -> AgentId {
        self.fallback.clone()
    }
}

/// The capability hierarchy the demo roster declares against.
pub fn default_graph() -> Result<CapabilityGraph, DomainError> {
    CapabilityGraph::builder()
        .add(
            Capability::new(
                "general_assistance",
                CapabilityLevel::Foundational,
                CapabilityCategory::General,
            )
            .with_keyword("help"),
        )
        .add(
            Capability::new(
                "record_lookup",
                CapabilityLevel::Operational,
                CapabilityCategory::DataManagement,
            )
            .with_keyword("record"),
        )
        .add(
            Capability::new(
                "player_lookup",
                CapabilityLevel::Operational,
                CapabilityCategory::DataManagement,
            )
            .with_parent("record_lookup")
            .with_keyword("player")
            .with_keyword("roster"),
        )
        .add(
            Capability::new(
                "member_lookup",
                CapabilityLevel::Operational,
                CapabilityCategory::DataManagement,
            )
            .with_parent("record_lookup")
            .with_keyword("member"),
        )
        .add(
            Capability::new(
                "payment_lookup",
                CapabilityLevel::Operational,
                CapabilityCategory::Financial,
            )
            .with_keyword("payment")
            .with_keyword("balance"),
        )
        .add(
            Capability::new(
                "payment_creation",
                CapabilityLevel::Tactical,
                CapabilityCategory::Financial,
            )
            .with_dependency("payment_lookup")
            .with_keyword("charge"),
        )
        .add(
            Capability::new(
                "event_scheduling",
                CapabilityLevel::Tactical,
                CapabilityCategory::Scheduling,
            )
            .with_keyword("schedule")
            .with_keyword("event"),
        )
        .build()
}
