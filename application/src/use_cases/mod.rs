//! Application use cases

pub mod aggregate;
pub mod classify_intent;
pub mod decompose_request;
pub mod execute_subtask;
pub mod handle_request;
mod shared;
