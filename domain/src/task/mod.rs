//! Subtasks and request decomposition.

pub mod decomposition;
pub mod entities;
