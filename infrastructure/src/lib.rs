//! Infrastructure layer for concierge
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod invoker;
pub mod llm;
pub mod logging;
pub mod registry;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig, LoggingConfig};
pub use invoker::{FixtureAgentInvoker, PlayerRecord};
pub use llm::ScriptedLlmGateway;
pub use logging::init_logging;
pub use registry::{default_graph, InMemoryAgentRegistry};
