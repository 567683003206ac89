//! Agent registry port
//!
//! The registry is an external collaborator: it owns agent registration and
//! the callable tool interface. The pipeline only queries it.

use concierge_domain::{AgentId, AgentProfile};

/// Read-only view of the available agents and their capability profiles.
pub trait AgentRegistryPort: Send + Sync {
    /// All registered agent profiles. Profiles are validated on registration;
    /// the pipeline treats them as trusted.
    fn profiles(&self) -> Vec<AgentProfile>;

    /// The designated fallback agent used when routing finds no qualified
    /// agent for a subtask.
    fn fallback_agent(&self) -> AgentId;

    /// Look up a single profile.
    fn profile(&self, agent: &AgentId) -> Option<AgentProfile> {
        self.profiles().into_iter().find(|p| &p.agent == agent)
    }
}
