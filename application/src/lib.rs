//! Application layer for concierge
//!
//! Use cases that orchestrate the domain pipeline through ports. The ports
//! define what the application needs from the outside world (a language
//! model gateway, an agent registry, an agent invoker, a progress notifier);
//! the infrastructure layer supplies the adapters.

pub mod analytics;
pub mod config;
pub mod load;
pub mod ports;
pub mod use_cases;

pub use analytics::{AnalyticsSnapshot, PipelineAnalytics};
pub use config::ExecutionParams;
pub use load::{LoadGuard, LoadTracker};
pub use ports::agent_invoker::{AgentInvocation, AgentInvoker, InvokerError};
pub use ports::agent_registry::AgentRegistryPort;
pub use ports::llm_gateway::{GatewayError, LlmGateway};
pub use ports::progress::{NoPipelineProgress, PipelineProgress};
pub use use_cases::aggregate::aggregate;
pub use use_cases::classify_intent::{ClassificationSource, ClassifyIntentUseCase};
pub use use_cases::decompose_request::{DecompositionSource, DecomposeRequestUseCase};
pub use use_cases::execute_subtask::{ExecuteSubtaskUseCase, ExecutionReport};
pub use use_cases::handle_request::{HandleRequestUseCase, PipelineError, PipelineResponse};
