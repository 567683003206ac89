//! Agent registry adapters

mod in_memory;

pub use in_memory::{default_graph, InMemoryAgentRegistry};
