//! Execution parameters for external calls.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeouts and the retry budget applied to every external call (language
/// model, agent/tool invocation). Retries cover transient failures only;
/// routing and validation outcomes are never retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionParams {
    /// Per-call timeout for language-model completions, seconds.
    pub llm_timeout_secs: u64,
    /// Per-call timeout for agent/tool invocations, seconds.
    pub agent_timeout_secs: u64,
    /// Total attempts per external call (1 initial + retries).
    pub max_attempts: u32,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            llm_timeout_secs: 30,
            agent_timeout_secs: 60,
            max_attempts: 2,
        }
    }
}

impl ExecutionParams {
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs)
    }
}
