//! Ports: interfaces the infrastructure layer implements.

pub mod agent_invoker;
pub mod agent_registry;
pub mod llm_gateway;
pub mod progress;
