//! Per-request pipeline context threaded through all steps.

pub mod context;
