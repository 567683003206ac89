//! Capability-based agent routing.

pub mod scorer;
