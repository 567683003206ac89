//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Capability graph cycle involving '{0}'")]
    GraphCycle(String),

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Invalid agent profile: {0}")]
    InvalidProfile(String),

    #[error("Pipeline context corrupted: {0}")]
    ContextCorrupted(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }

    /// Fatal conditions are surfaced immediately and never retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DomainError::GraphCycle(_) | DomainError::ContextCorrupted(_)
        )
    }
}
