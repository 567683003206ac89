//! Classify Intent use case.
//!
//! Maps raw request text plus minimal session context to an [`IntentResult`].
//! Never fails outward: on gateway error or an unparseable reply it degrades
//! to the low-confidence `general_query` fallback, which callers must
//! tolerate.

use crate::ports::llm_gateway::LlmGateway;
use crate::use_cases::shared::complete_with_retry;
use concierge_domain::{keyword_classify, parse_intent_response, IntentResult, SessionInfo};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Which strategy produced the intent. The driver records this as the step
/// outcome (`Fallback` maps to a recovered step).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    FastPath,
    Model,
    Fallback,
}

pub struct ClassifyIntentUseCase<G: LlmGateway> {
    gateway: Arc<G>,
    timeout: Duration,
    max_attempts: u32,
}

impl<G: LlmGateway> ClassifyIntentUseCase<G> {
    pub fn new(gateway: Arc<G>, timeout: Duration, max_attempts: u32) -> Self {
        Self {
            gateway,
            timeout,
            max_attempts,
        }
    }

    /// Classify one request. Pure over its inputs plus a single LLM call.
    pub async fn classify(
        &self,
        request_text: &str,
        session: &SessionInfo,
    ) -> (IntentResult, ClassificationSource) {
        // Deterministic fast path for well-known commands
        if let Some(result) = keyword_classify(request_text) {
            debug!("intent '{}' via keyword fast path", result.intent);
            return (result, ClassificationSource::FastPath);
        }

        let prompt = build_prompt(request_text, session);
        match complete_with_retry(self.gateway.as_ref(), &prompt, self.timeout, self.max_attempts)
            .await
        {
            Ok(reply) => match parse_intent_response(&reply) {
                Some(result) => {
                    debug!(
                        "intent '{}' via model (confidence {:.2})",
                        result.intent, result.confidence
                    );
                    (result, ClassificationSource::Model)
                }
                None => {
                    warn!("classifier reply unparseable, using default intent");
                    (IntentResult::fallback(), ClassificationSource::Fallback)
                }
            },
            Err(e) => {
                warn!("classifier gateway error: {e}, using default intent");
                (IntentResult::fallback(), ClassificationSource::Fallback)
            }
        }
    }
}

fn build_prompt(request_text: &str, session: &SessionInfo) -> String {
    let channel = if session.is_group_channel() {
        "group"
    } else {
        "direct"
    };
    let prior = session
        .prior_turn_summary
        .as_deref()
        .unwrap_or("(none)");

    format!(
        "Classify the user request into an intent.\n\
         Channel: {channel}\n\
         Previous turn: {prior}\n\
         Request: {request_text}\n\n\
         Reply with a single JSON object:\n\
         {{\"intent\": \"label\", \"entities\": {{}}, \"confidence\": 0.0}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use async_trait::async_trait;
    use concierge_domain::ChannelKind;

    struct CannedGateway(Result<String, ()>);

    #[async_trait]
    impl LlmGateway for CannedGateway {
        async fn complete(&self, _prompt: &str) -> Result<String, GatewayError> {
            self.0
                .clone()
                .map_err(|_| GatewayError::RequestFailed("down".to_string()))
        }
    }

    fn session() -> SessionInfo {
        SessionInfo::new("user-1", "session-1", ChannelKind::Direct)
    }

    fn use_case(reply: Result<String, ()>) -> ClassifyIntentUseCase<CannedGateway> {
        ClassifyIntentUseCase::new(
            Arc::new(CannedGateway(reply)),
            Duration::from_secs(5),
            2,
        )
    }

    #[tokio::test]
    async fn test_fast_path_skips_gateway() {
        // Gateway would fail, but the fast path never calls it
        let uc = use_case(Err(()));
        let (result, source) = uc.classify("list players", &session()).await;
        assert_eq!(source, ClassificationSource::FastPath);
        assert_eq!(result.intent.as_str(), "list_players");
    }

    #[tokio::test]
    async fn test_model_path_parses_reply() {
        let uc = use_case(Ok(
            r#"{"intent": "transfer_player", "entities": {"player_name": "Alice"}, "confidence": 0.8}"#
                .to_string(),
        ));
        let (result, source) = uc.classify("move Alice to the seniors", &session()).await;
        assert_eq!(source, ClassificationSource::Model);
        assert_eq!(result.intent.as_str(), "transfer_player");
        assert_eq!(result.entity_count(), 1);
    }

    #[tokio::test]
    async fn test_gateway_error_degrades_to_default() {
        let uc = use_case(Err(()));
        let (result, source) = uc.classify("do something novel", &session()).await;
        assert_eq!(source, ClassificationSource::Fallback);
        assert!(result.intent.is_general_query());
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_unparseable_reply_degrades_to_default() {
        let uc = use_case(Ok("I'm not sure what they want.".to_string()));
        let (result, source) = uc.classify("do something novel", &session()).await;
        assert_eq!(source, ClassificationSource::Fallback);
        assert!(result.intent.is_general_query());
    }
}
