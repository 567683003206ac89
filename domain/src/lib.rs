//! Domain layer for concierge
//!
//! This crate contains the core request-orchestration logic: the capability
//! graph, agent profiles, intent classification types, complexity assessment,
//! task decomposition, capability-based routing, and the anti-hallucination
//! validator. It has no dependencies on infrastructure or transport concerns.
//!
//! # Core Concepts
//!
//! ## Capability graph
//!
//! Agents declare proficiency over capabilities arranged in an acyclic
//! hierarchy. Routing grades how closely an agent's declared skills relate
//! to a subtask's required capabilities by walking the graph.
//!
//! ## Grounding
//!
//! Every tool invocation is captured as a [`ToolOutputRecord`]; the validator
//! cross-checks agent text against those records and rebuilds ungrounded
//! answers from the structured data alone.

pub mod capability;
pub mod complexity;
pub mod core;
pub mod intent;
pub mod pipeline;
pub mod routing;
pub mod task;
pub mod validation;

// Re-export commonly used types
pub use capability::{
    entities::{Capability, CapabilityCategory, CapabilityLevel},
    graph::{CapabilityGraph, CapabilityGraphBuilder, RelationStrength},
    profile::{AgentProfile, CapabilityBinding, MAX_PRIMARY},
};
pub use complexity::assessor::{
    assess, detect_dependencies, ComplexityConfig, ComplexityResult, ComplexityTier,
};
pub use core::{
    error::DomainError,
    ids::{AgentId, CapabilityId, RequestId, SubtaskId},
};
pub use intent::{
    entities::{Intent, IntentResult},
    parser::{keyword_classify, parse_intent_json, parse_intent_response},
};
pub use pipeline::context::{
    ChannelKind, PipelineContext, PipelineStep, SessionInfo, StepOutcome, StepRecord,
};
pub use routing::scorer::{score_agent, select_agent, RouterConfig, RoutingDecision};
pub use task::{
    decomposition::{
        can_decompose, fallback_decompose, parse_decomposition, template_decompose,
        MAX_DECOMPOSITION_DEPTH,
    },
    entities::{Subtask, SubtaskOutcome},
};
pub use validation::{
    entities::{ToolOutputRecord, ValidationIssue, ValidationIssueKind, ValidationResult},
    validator::{safe_response, validate, CORRECTION_NOTE},
};
