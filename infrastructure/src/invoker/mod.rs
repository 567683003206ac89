//! Agent invoker adapters

mod fixture;

pub use fixture::{FixtureAgentInvoker, PlayerRecord};
