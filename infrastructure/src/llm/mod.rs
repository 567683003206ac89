//! Language-model gateway adapters

mod scripted;

pub use scripted::ScriptedLlmGateway;
