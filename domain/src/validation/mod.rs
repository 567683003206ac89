//! Anti-hallucination validation of agent text against tool outputs.

pub mod entities;
pub mod extract;
pub mod validator;
