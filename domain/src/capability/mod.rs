//! Capability catalogue: hierarchy graph and agent proficiency profiles.

pub mod entities;
pub mod graph;
pub mod profile;
