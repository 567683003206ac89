//! Scripted language-model gateway.
//!
//! Adapter used by the demo binary and integration tests: replies are queued
//! up front and played back in order, so runs are fully reproducible with no
//! network access. An exhausted script reports a connection error, which the
//! use cases treat like any other gateway outage.

use async_trait::async_trait;
use concierge_application::{GatewayError, LlmGateway};
use std::collections::VecDeque;
use tokio::sync::Mutex;
use tracing::debug;

pub struct ScriptedLlmGateway {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedLlmGateway {
    pub fn new(replies: impl IntoIterator<Item = String>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
        }
    }

    /// A gateway with no scripted replies; every call fails, which drives
    /// the pipeline through its deterministic fallbacks.
    pub fn offline() -> Self {
        Self::new([])
    }
}

#[async_trait]
impl LlmGateway for ScriptedLlmGateway {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        debug!(prompt_len = prompt.len(), "scripted gateway called");
        let mut replies = self.replies.lock().await;
        replies
            .pop_front()
            .ok_or_else(|| GatewayError::ConnectionError("reply script exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order() {
        let gateway = ScriptedLlmGateway::new(["one".to_string(), "two".to_string()]);
        assert_eq!(gateway.complete("p").await.unwrap(), "one");
        assert_eq!(gateway.complete("p").await.unwrap(), "two");
        assert!(gateway.complete("p").await.is_err());
    }

    #[tokio::test]
    async fn test_offline_always_errors() {
        let gateway = ScriptedLlmGateway::offline();
        assert!(matches!(
            gateway.complete("p").await,
            Err(GatewayError::ConnectionError(_))
        ));
    }
}
