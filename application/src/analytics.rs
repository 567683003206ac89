//! Pipeline analytics aggregate.
//!
//! Process-lifetime counters keyed by composite strings. Mutated only by the
//! pipeline driver immediately after each step completes; pipeline steps
//! never touch it, they return data and the driver records it. Updates are
//! short lock-protected increments; readers get a detached snapshot.

use concierge_domain::{PipelineStep, StepOutcome, ValidationIssueKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Counters {
    step_executions: BTreeMap<String, u64>,
    agent_usage: BTreeMap<String, u64>,
    tool_usage: BTreeMap<String, u64>,
    hallucination_detections: BTreeMap<String, u64>,
    routing_failures: BTreeMap<String, u64>,
}

/// Read-only export of the aggregate for external monitoring. No control
/// path depends on it.
#[derive(Debug, Clone, Serialize, Default)]
pub struct AnalyticsSnapshot {
    pub step_executions: BTreeMap<String, u64>,
    pub agent_usage: BTreeMap<String, u64>,
    pub tool_usage: BTreeMap<String, u64>,
    pub hallucination_detections: BTreeMap<String, u64>,
    pub routing_failures: BTreeMap<String, u64>,
}

/// Shared, lock-protected analytics aggregate.
#[derive(Debug, Default)]
pub struct PipelineAnalytics {
    counters: Mutex<Counters>,
}

impl PipelineAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_step(&self, step: PipelineStep, outcome: StepOutcome) {
        let key = format!("{}:{:?}", step.as_str(), outcome).to_lowercase();
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        *counters.step_executions.entry(key).or_default() += 1;
    }

    pub fn record_agent_usage(&self, agent: &str, intent: &str) {
        let key = format!("{agent}:{intent}");
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        *counters.agent_usage.entry(key).or_default() += 1;
    }

    pub fn record_tool_usage(&self, tool: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        *counters.tool_usage.entry(tool.to_string()).or_default() += 1;
    }

    pub fn record_hallucination(&self, agent: &str, kind: ValidationIssueKind) {
        let key = format!("{agent}:{}", kind.as_str());
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        *counters.hallucination_detections.entry(key).or_default() += 1;
    }

    pub fn record_routing_failure(&self, subtask: &str, capability_summary: &str) {
        let key = format!("{subtask}:{capability_summary}");
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        *counters.routing_failures.entry(key).or_default() += 1;
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        AnalyticsSnapshot {
            step_executions: counters.step_executions.clone(),
            agent_usage: counters.agent_usage.clone(),
            tool_usage: counters.tool_usage.clone(),
            hallucination_detections: counters.hallucination_detections.clone(),
            routing_failures: counters.routing_failures.clone(),
        }
    }
}
