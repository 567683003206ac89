//! Complexity assessment of classified requests.

pub mod assessor;
