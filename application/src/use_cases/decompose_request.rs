//! Decompose Request use case.
//!
//! Expands one request into ordered subtasks. Template decomposition handles
//! well-known intents without a model call; novel requests go to the
//! model-driven decomposer; parse failures and gateway errors fall back to
//! the rule-based single-subtask decomposer. Decomposition runs at most once
//! per request (depth guard).

use crate::ports::llm_gateway::LlmGateway;
use crate::use_cases::handle_request::PipelineError;
use crate::use_cases::shared::complete_with_retry;
use concierge_domain::{
    can_decompose, fallback_decompose, parse_decomposition, template_decompose, CapabilityGraph,
    IntentResult, RequestId, Subtask,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Which strategy produced the subtasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompositionSource {
    Template,
    Model,
    Fallback,
}

pub struct DecomposeRequestUseCase<G: LlmGateway> {
    gateway: Arc<G>,
    graph: Arc<CapabilityGraph>,
    timeout: Duration,
    max_attempts: u32,
}

impl<G: LlmGateway> DecomposeRequestUseCase<G> {
    pub fn new(
        gateway: Arc<G>,
        graph: Arc<CapabilityGraph>,
        timeout: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            gateway,
            graph,
            timeout,
            max_attempts,
        }
    }

    /// Decompose one request into subtasks.
    ///
    /// `depth` is the context's decomposition depth; anything past the limit
    /// is refused outright, which is what keeps subtasks from ever being
    /// re-decomposed.
    pub async fn decompose(
        &self,
        request_text: &str,
        intent: &IntentResult,
        request_id: &RequestId,
        depth: u8,
    ) -> Result<(Vec<Subtask>, DecompositionSource), PipelineError> {
        if !can_decompose(depth) {
            return Err(PipelineError::DecompositionDepthExceeded);
        }

        if let Some(subtasks) = template_decompose(intent, request_id) {
            debug!(
                "decomposed '{}' into {} subtask(s) via template",
                intent.intent,
                subtasks.len()
            );
            return Ok((subtasks, DecompositionSource::Template));
        }

        let prompt = build_prompt(request_text, intent, &self.graph);
        match complete_with_retry(self.gateway.as_ref(), &prompt, self.timeout, self.max_attempts)
            .await
        {
            Ok(reply) => {
                if let Some(subtasks) = parse_decomposition(&reply, request_id) {
                    debug!("model proposed {} subtask(s)", subtasks.len());
                    return Ok((subtasks, DecompositionSource::Model));
                }
                warn!("decomposition reply unparseable, using rule-based fallback");
            }
            Err(e) => {
                warn!("decomposition gateway error: {e}, using rule-based fallback");
            }
        }

        let subtasks = fallback_decompose(request_text, &self.graph, request_id);
        Ok((subtasks, DecompositionSource::Fallback))
    }
}

fn build_prompt(request_text: &str, intent: &IntentResult, graph: &CapabilityGraph) -> String {
    let mut capabilities: Vec<&str> = graph.all().map(|c| c.id.as_str()).collect();
    capabilities.sort();

    format!(
        "Break the user request into ordered subtasks.\n\
         Intent: {}\n\
         Known capabilities: {}\n\
         Request: {request_text}\n\n\
         Reply with a single JSON object:\n\
         {{\"subtasks\": [{{\"id\": \"st-1\", \"description\": \"...\", \
         \"capabilities\": [\"...\"], \"parameters\": {{}}, \"critical\": false}}]}}",
        intent.intent,
        capabilities.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use async_trait::async_trait;
    use concierge_domain::{Capability, CapabilityCategory, CapabilityLevel, Intent};

    struct CannedGateway(Result<String, ()>);

    #[async_trait]
    impl LlmGateway for CannedGateway {
        async fn complete(&self, _prompt: &str) -> Result<String, GatewayError> {
            self.0
                .clone()
                .map_err(|_| GatewayError::RequestFailed("down".to_string()))
        }
    }

    fn graph() -> Arc<CapabilityGraph> {
        Arc::new(
            CapabilityGraph::builder()
                .add(
                    Capability::new(
                        "player_lookup",
                        CapabilityLevel::Operational,
                        CapabilityCategory::DataManagement,
                    )
                    .with_keyword("player"),
                )
                .build()
                .unwrap(),
        )
    }

    fn use_case(reply: Result<String, ()>) -> DecomposeRequestUseCase<CannedGateway> {
        DecomposeRequestUseCase::new(
            Arc::new(CannedGateway(reply)),
            graph(),
            Duration::from_secs(5),
            2,
        )
    }

    #[tokio::test]
    async fn test_template_intent_skips_gateway() {
        let uc = use_case(Err(()));
        let intent = IntentResult::new(Intent::LIST_PLAYERS, 0.9);
        let (subtasks, source) = uc
            .decompose("list players", &intent, &RequestId::new("req-1"), 0)
            .await
            .unwrap();
        assert_eq!(source, DecompositionSource::Template);
        assert_eq!(subtasks.len(), 1);
    }

    #[tokio::test]
    async fn test_model_breakdown_parsed() {
        let reply = r#"{"subtasks": [
            {"id": "st-1", "description": "Find the player", "capabilities": ["player_lookup"], "critical": true},
            {"id": "st-2", "description": "Draft a summary", "capabilities": []}
        ]}"#;
        let uc = use_case(Ok(reply.to_string()));
        let intent = IntentResult::new("novel_intent", 0.6);
        let (subtasks, source) = uc
            .decompose("do the novel thing", &intent, &RequestId::new("req-1"), 0)
            .await
            .unwrap();
        assert_eq!(source, DecompositionSource::Model);
        assert_eq!(subtasks.len(), 2);
        assert!(subtasks[0].critical);
    }

    #[tokio::test]
    async fn test_gateway_error_falls_back_to_single_subtask() {
        let uc = use_case(Err(()));
        let intent = IntentResult::new("novel_intent", 0.6);
        let (subtasks, source) = uc
            .decompose(
                "find that player for me",
                &intent,
                &RequestId::new("req-1"),
                0,
            )
            .await
            .unwrap();
        assert_eq!(source, DecompositionSource::Fallback);
        assert_eq!(subtasks.len(), 1);
        // Keyword matching against the graph tagged the capability
        assert_eq!(subtasks[0].required_capabilities.len(), 1);
    }

    #[tokio::test]
    async fn test_depth_guard_refuses_re_decomposition() {
        let uc = use_case(Ok("irrelevant".to_string()));
        let intent = IntentResult::new(Intent::LIST_PLAYERS, 0.9);
        let result = uc
            .decompose("list players", &intent, &RequestId::new("req-1"), 1)
            .await;
        assert!(matches!(
            result,
            Err(PipelineError::DecompositionDepthExceeded)
        ));
    }
}
