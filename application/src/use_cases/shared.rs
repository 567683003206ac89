//! Shared utilities for use cases.
//!
//! Cancellation checking and the retrying, timeout-bounded gateway call used
//! by the classify and decompose use cases.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::use_cases::handle_request::PipelineError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Check if cancellation has been requested.
///
/// Returns `Err(PipelineError::Cancelled)` if the token exists and is
/// cancelled. The driver calls this between steps, never mid-step.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), PipelineError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(PipelineError::Cancelled);
    }
    Ok(())
}

/// Call the gateway with a per-call timeout and a bounded retry budget.
///
/// Only transient failures (connection errors, timeouts) are retried, and at
/// most `max_attempts` calls are made in total.
pub(crate) async fn complete_with_retry<G: LlmGateway>(
    gateway: &G,
    prompt: &str,
    timeout: Duration,
    max_attempts: u32,
) -> Result<String, GatewayError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = match tokio::time::timeout(timeout, gateway.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout),
        };

        match result {
            Ok(text) => return Ok(text),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                debug!("transient gateway error (attempt {attempt}): {e}, retrying");
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyGateway {
        calls: AtomicU32,
        fail_first: u32,
        transient: bool,
    }

    #[async_trait]
    impl LlmGateway for FlakyGateway {
        async fn complete(&self, _prompt: &str) -> Result<String, GatewayError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                if self.transient {
                    Err(GatewayError::ConnectionError("reset".to_string()))
                } else {
                    Err(GatewayError::RequestFailed("bad".to_string()))
                }
            } else {
                Ok("ok".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_transient_errors_retried_within_budget() {
        let gateway = FlakyGateway {
            calls: AtomicU32::new(0),
            fail_first: 1,
            transient: true,
        };
        let result =
            complete_with_retry(&gateway, "p", Duration::from_secs(5), 2).await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_transient_errors_fail_immediately() {
        let gateway = FlakyGateway {
            calls: AtomicU32::new(0),
            fail_first: 1,
            transient: false,
        };
        let result =
            complete_with_retry(&gateway, "p", Duration::from_secs(5), 3).await;
        assert!(result.is_err());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_returns_last_error() {
        let gateway = FlakyGateway {
            calls: AtomicU32::new(0),
            fail_first: 10,
            transient: true,
        };
        let result =
            complete_with_retry(&gateway, "p", Duration::from_secs(5), 2).await;
        assert!(matches!(result, Err(GatewayError::ConnectionError(_))));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_check_cancelled() {
        assert!(check_cancelled(&None).is_ok());

        let token = CancellationToken::new();
        assert!(check_cancelled(&Some(token.clone())).is_ok());
        token.cancel();
        assert!(matches!(
            check_cancelled(&Some(token)),
            Err(PipelineError::Cancelled)
        ));
    }
}
