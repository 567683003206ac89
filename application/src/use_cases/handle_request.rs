//! Request handling pipeline driver.
//!
//! Runs one request through the full step sequence: classification,
//! complexity assessment, decomposition, routing, execution, validation,
//! aggregation. The driver owns the [`PipelineContext`] for the run and is
//! the only writer to analytics; everything it calls is either pure domain
//! logic or an injected port.

use crate::analytics::PipelineAnalytics;
use crate::config::ExecutionParams;
use crate::load::LoadTracker;
use crate::ports::agent_invoker::AgentInvoker;
use crate::ports::agent_registry::AgentRegistryPort;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::PipelineProgress;
use crate::use_cases::aggregate::aggregate;
use crate::use_cases::classify_intent::{ClassificationSource, ClassifyIntentUseCase};
use crate::use_cases::decompose_request::DecomposeRequestUseCase;
use crate::use_cases::execute_subtask::{ExecuteSubtaskUseCase, ExecutionReport};
use crate::use_cases::shared::check_cancelled;
use chrono::{DateTime, Utc};
use concierge_domain::{
    assess, safe_response, select_agent, validate, CapabilityGraph, ComplexityConfig, DomainError,
    IntentResult, PipelineContext, PipelineStep, RouterConfig, RoutingDecision, SessionInfo,
    StepOutcome, Subtask, SubtaskOutcome,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that abort a pipeline run.
///
/// These are the fatal cases only. Recoverable failures (unparseable model
/// replies, routing misses, non-critical subtask failures, hallucination
/// detections) are absorbed into the response and the step trace instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Request cancelled")]
    Cancelled,

    #[error("Decomposition depth limit reached")]
    DecompositionDepthExceeded,

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Final output of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResponse {
    /// The validated, aggregated answer for the user.
    pub text: String,
    /// Full run context including the step trace.
    pub context: PipelineContext,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Orchestrates the full request pipeline.
pub struct HandleRequestUseCase<G: LlmGateway, I: AgentInvoker> {
    classifier: ClassifyIntentUseCase<G>,
    decomposer: DecomposeRequestUseCase<G>,
    executor: ExecuteSubtaskUseCase<I>,
    registry: Arc<dyn AgentRegistryPort>,
    graph: Arc<CapabilityGraph>,
    complexity_config: ComplexityConfig,
    router_config: RouterConfig,
    analytics: Arc<PipelineAnalytics>,
    loads: Arc<LoadTracker>,
    progress: Arc<dyn PipelineProgress>,
    cancellation: Option<CancellationToken>,
}

impl<G: LlmGateway, I: AgentInvoker> HandleRequestUseCase<G, I> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gateway: Arc<G>,
        invoker: Arc<I>,
        registry: Arc<dyn AgentRegistryPort>,
        graph: Arc<CapabilityGraph>,
        params: ExecutionParams,
        complexity_config: ComplexityConfig,
        router_config: RouterConfig,
        analytics: Arc<PipelineAnalytics>,
        progress: Arc<dyn PipelineProgress>,
    ) -> Self {
        let loads = Arc::new(LoadTracker::new());
        Self {
            classifier: ClassifyIntentUseCase::new(
                gateway.clone(),
                params.llm_timeout(),
                params.max_attempts,
            ),
            decomposer: DecomposeRequestUseCase::new(
                gateway,
                graph.clone(),
                params.llm_timeout(),
                params.max_attempts,
            ),
            executor: ExecuteSubtaskUseCase::new(
                invoker,
                loads.clone(),
                params.agent_timeout(),
                params.max_attempts,
            ),
            registry,
            graph,
            complexity_config,
            router_config,
            analytics,
            loads,
            progress,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Handle one user request end to end.
    pub async fn handle(
        &self,
        request_text: impl Into<String>,
        session: SessionInfo,
    ) -> Result<PipelineResponse, PipelineError> {
        let started_at = Utc::now();
        let mut ctx = PipelineContext::new(request_text, session);
        ctx.ensure_valid()?;
        info!(request = %ctx.request_id, "pipeline started");

        // Classification never fails the run; the classifier falls back to
        // the default intent on any model trouble.
        check_cancelled(&self.cancellation)?;
        self.progress.on_step_start(PipelineStep::Classification);
        let t = Instant::now();
        let (intent, source) = self.classifier.classify(&ctx.request_text, &ctx.session).await;
        let outcome = match source {
            ClassificationSource::Fallback => StepOutcome::Recovered,
            _ => StepOutcome::Ok,
        };
        self.finish_step(
            &mut ctx,
            PipelineStep::Classification,
            t,
            outcome,
            Some(format!("intent={} source={source:?}", intent.intent)),
        );
        ctx.intent = Some(intent);

        check_cancelled(&self.cancellation)?;
        self.progress.on_step_start(PipelineStep::ComplexityAssessment);
        let t = Instant::now();
        let fallback_intent = IntentResult::fallback();
        let complexity = assess(
            &self.complexity_config,
            ctx.intent.as_ref().unwrap_or(&fallback_intent),
            &ctx.session,
            &ctx.request_text,
        );
        self.finish_step(
            &mut ctx,
            PipelineStep::ComplexityAssessment,
            t,
            StepOutcome::Ok,
            Some(format!("tier={} score={:.2}", complexity.tier.as_str(), complexity.score)),
        );
        ctx.complexity = Some(complexity);

        check_cancelled(&self.cancellation)?;
        self.progress.on_step_start(PipelineStep::Decomposition);
        let t = Instant::now();
        let intent_ref = ctx.intent.clone().unwrap_or_else(IntentResult::fallback);
        let (subtasks, decomposition_source) = self
            .decomposer
            .decompose(&ctx.request_text, &intent_ref, &ctx.request_id, ctx.decomposition_depth)
            .await?;
        ctx.decomposition_depth = 1;
        self.finish_step(
            &mut ctx,
            PipelineStep::Decomposition,
            t,
            StepOutcome::Ok,
            Some(format!(
                "subtasks={} source={decomposition_source:?}",
                subtasks.len()
            )),
        );
        ctx.subtasks = subtasks;

        check_cancelled(&self.cancellation)?;
        let decisions = self.route_all(&mut ctx);

        check_cancelled(&self.cancellation)?;
        let reports = self.execute_all(&mut ctx, &decisions).await?;

        check_cancelled(&self.cancellation)?;
        let outcomes = self.validate_all(&mut ctx, &decisions, reports);

        check_cancelled(&self.cancellation)?;
        self.progress.on_step_start(PipelineStep::Aggregation);
        let t = Instant::now();
        let text = aggregate(&outcomes);
        self.finish_step(&mut ctx, PipelineStep::Aggregation, t, StepOutcome::Ok, None);

        info!(request = %ctx.request_id, "pipeline completed");
        Ok(PipelineResponse {
            text,
            context: ctx,
            started_at,
            completed_at: Utc::now(),
        })
    }

    /// Route every subtask, recording fallback routing as analytics data.
    fn route_all(&self, ctx: &mut PipelineContext) -> Vec<RoutingDecision> {
        self.progress.on_step_start(PipelineStep::Routing);
        let t = Instant::now();
        let profiles = self.registry.profiles();
        let fallback = self.registry.fallback_agent();
        let loads = self.loads.loads();
        let intent_name = ctx
            .intent
            .as_ref()
            .map(|i| i.intent.to_string())
            .unwrap_or_default();

        let mut decisions = Vec::with_capacity(ctx.subtasks.len());
        let mut any_fallback = false;
        for subtask in &ctx.subtasks {
            let decision = select_agent(
                &self.router_config,
                &self.graph,
                &profiles,
                subtask,
                &loads,
                &fallback,
            );
            if decision.fallback_used {
                any_fallback = true;
                let summary = capability_summary(subtask);
                warn!(
                    subtask = %subtask.id,
                    capabilities = %summary,
                    "no qualified agent, routing to fallback"
                );
                self.analytics
                    .record_routing_failure(subtask.id.as_str(), &summary);
            }
            self.progress
                .on_subtask_routed(subtask, &decision.agent, decision.fallback_used);
            self.analytics
                .record_agent_usage(decision.agent.as_str(), &intent_name);
            ctx.selected_agents
                .insert(subtask.id.clone(), decision.agent.clone());
            decisions.push(decision);
        }

        let outcome = if any_fallback {
            StepOutcome::Recovered
        } else {
            StepOutcome::Ok
        };
        self.finish_step(ctx, PipelineStep::Routing, t, outcome, None);
        decisions
    }

    /// Execute every subtask sequentially on its selected agent.
    ///
    /// Individual failures are contained in the reports; the step is marked
    /// failed only when a critical subtask failed.
    async fn execute_all(
        &self,
        ctx: &mut PipelineContext,
        decisions: &[RoutingDecision],
    ) -> Result<Vec<ExecutionReport>, PipelineError> {
        self.progress.on_step_start(PipelineStep::Execution);
        let t = Instant::now();
        let subtasks = ctx.subtasks.clone();

        let mut reports = Vec::with_capacity(subtasks.len());
        let mut critical_failed = false;
        let mut any_failed = false;
        for (subtask, decision) in subtasks.iter().zip(decisions) {
            check_cancelled(&self.cancellation)?;
            let report = self.executor.execute(subtask, &decision.agent).await;
            self.progress.on_subtask_complete(subtask, report.success);
            for record in &report.tool_records {
                self.analytics.record_tool_usage(&record.tool_name);
                ctx.tool_outputs.push(record.clone());
            }
            if !report.success {
                any_failed = true;
                critical_failed |= subtask.critical;
            }
            reports.push(report);
        }

        let outcome = if critical_failed {
            StepOutcome::Failed
        } else if any_failed {
            StepOutcome::Recovered
        } else {
            StepOutcome::Ok
        };
        self.finish_step(ctx, PipelineStep::Execution, t, outcome, None);
        Ok(reports)
    }

    /// Validate each successful subtask's text against its own tool outputs,
    /// rewriting inconsistent answers from ground truth.
    fn validate_all(
        &self,
        ctx: &mut PipelineContext,
        decisions: &[RoutingDecision],
        reports: Vec<ExecutionReport>,
    ) -> Vec<SubtaskOutcome> {
        self.progress.on_step_start(PipelineStep::Validation);
        let t = Instant::now();
        let subtasks = ctx.subtasks.clone();

        let mut outcomes = Vec::with_capacity(reports.len());
        let mut any_corrected = false;
        for ((subtask, decision), report) in subtasks.iter().zip(decisions).zip(reports) {
            if !report.success {
                let reason = report
                    .failure_reason
                    .unwrap_or_else(|| "execution failed".to_string());
                outcomes.push(SubtaskOutcome::failure(subtask, reason));
                continue;
            }

            let result = validate(&report.text, &report.tool_records);
            self.progress.on_validation(subtask, &result);
            if result.consistent {
                outcomes.push(SubtaskOutcome::success(subtask, report.text));
            } else {
                any_corrected = true;
                for issue in &result.issues {
                    warn!(
                        subtask = %subtask.id,
                        agent = %decision.agent,
                        kind = issue.kind.as_str(),
                        "hallucination detected: {}",
                        issue.message
                    );
                    self.analytics
                        .record_hallucination(decision.agent.as_str(), issue.kind);
                }
                let corrected = safe_response(&report.tool_records);
                outcomes.push(SubtaskOutcome::success(subtask, corrected).corrected());
            }
        }

        let outcome = if any_corrected {
            StepOutcome::Recovered
        } else {
            StepOutcome::Ok
        };
        self.finish_step(ctx, PipelineStep::Validation, t, outcome, None);
        outcomes
    }

    fn finish_step(
        &self,
        ctx: &mut PipelineContext,
        step: PipelineStep,
        started: Instant,
        outcome: StepOutcome,
        detail: Option<String>,
    ) {
        let duration_ms = started.elapsed().as_millis() as u64;
        ctx.record_step(step, duration_ms, outcome, detail);
        self.analytics.record_step(step, outcome);
        self.progress.on_step_complete(step, duration_ms);
    }
}

fn capability_summary(subtask: &Subtask) -> String {
    if subtask.required_capabilities.is_empty() {
        return "(none)".to_string();
    }
    subtask
        .required_capabilities
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
