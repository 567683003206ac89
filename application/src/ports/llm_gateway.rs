//! LLM Gateway port
//!
//! Defines the interface for the language-model completion service consumed
//! by intent classification and model-driven decomposition.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Transient/network-class failures qualify for the bounded retry
    /// budget; anything else fails immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::ConnectionError(_) | GatewayError::Timeout
        )
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to the completion
/// service. Implementations (adapters) live in the infrastructure layer.
/// Contract: request text in, best-effort-parseable text out; failures are
/// caught by the calling use case and degraded to fallback strategies.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send a prompt and get the completion text.
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GatewayError::Timeout.is_transient());
        assert!(GatewayError::ConnectionError("reset".to_string()).is_transient());
        assert!(!GatewayError::RequestFailed("bad prompt".to_string()).is_transient());
        assert!(!GatewayError::Other("?".to_string()).is_transient());
    }
}
