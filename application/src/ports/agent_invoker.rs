//! Agent invoker port
//!
//! Defines how the executor runs a subtask on a selected agent. The agent
//! receives concrete, typed arguments (the subtask itself) rather than an
//! implicit context object, and must report every tool invocation it made.

use async_trait::async_trait;
use concierge_domain::{AgentId, Subtask, ToolOutputRecord};
use thiserror::Error;

/// Errors raised by agent/tool execution.
#[derive(Error, Debug)]
pub enum InvokerError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Tool '{tool}' failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("Agent failed: {0}")]
    AgentFailed(String),

    #[error("Timeout")]
    Timeout,
}

impl InvokerError {
    /// Transient failures qualify for the executor's bounded retry budget.
    pub fn is_transient(&self) -> bool {
        matches!(self, InvokerError::Timeout)
    }
}

/// What an agent produced for one subtask: its answer text plus the raw
/// record of every tool it invoked along the way. Tool records are captured
/// before the final text is accepted, which is what lets the validator treat
/// them as ground truth.
#[derive(Debug, Clone)]
pub struct AgentInvocation {
    pub text: String,
    pub tool_records: Vec<ToolOutputRecord>,
}

impl AgentInvocation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_records: Vec::new(),
        }
    }

    pub fn with_tool_record(mut self, record: ToolOutputRecord) -> Self {
        self.tool_records.push(record);
        self
    }
}

/// Port for executing a subtask on an agent.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(
        &self,
        agent: &AgentId,
        subtask: &Subtask,
    ) -> Result<AgentInvocation, InvokerError>;
}
