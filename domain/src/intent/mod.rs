//! Intent classification: result types and reply parsing.

pub mod entities;
pub mod parser;
