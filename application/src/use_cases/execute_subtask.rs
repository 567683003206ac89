//! Subtask execution with per-subtask failure containment.

use crate::load::LoadTracker;
use crate::ports::agent_invoker::{AgentInvoker, InvokerError};
use concierge_domain::{AgentId, Subtask, ToolOutputRecord};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of running one subtask against its selected agent.
///
/// Execution failures are contained here rather than propagated: a failed
/// subtask produces a report with `success == false` and the pipeline
/// decides what that means based on the subtask's criticality.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub agent: AgentId,
    pub text: String,
    pub tool_records: Vec<ToolOutputRecord>,
    pub success: bool,
    pub failure_reason: Option<String>,
}

impl ExecutionReport {
    fn succeeded(agent: AgentId, text: String, tool_records: Vec<ToolOutputRecord>) -> Self {
        Self {
            agent,
            text,
            tool_records,
            success: true,
            failure_reason: None,
        }
    }

    fn failed(agent: AgentId, reason: String) -> Self {
        Self {
            agent,
            text: String::new(),
            tool_records: Vec::new(),
            success: false,
            failure_reason: Some(reason),
        }
    }
}

/// Runs one subtask against its selected agent, holding a load slot for the
/// duration and retrying transient failures within a bounded budget.
pub struct ExecuteSubtaskUseCase<I: AgentInvoker> {
    invoker: Arc<I>,
    loads: Arc<LoadTracker>,
    timeout: Duration,
    max_attempts: u32,
}

impl<I: AgentInvoker> ExecuteSubtaskUseCase<I> {
    pub fn new(invoker: Arc<I>, loads: Arc<LoadTracker>, timeout: Duration, max_attempts: u32) -> Self {
        Self {
            invoker,
            loads,
            timeout,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Executes `subtask` on `agent`. Never returns an error: failures are
    /// captured in the report so one subtask cannot take down its siblings.
    pub async fn execute(&self, subtask: &Subtask, agent: &AgentId) -> ExecutionReport {
        let _slot = self.loads.assign(agent);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let call = self.invoker.invoke(agent, subtask);
            let result = match tokio::time::timeout(self.timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(InvokerError::Timeout),
            };

            match result {
                Ok(invocation) => {
                    debug!(
                        subtask = %subtask.id,
                        agent = %agent,
                        tools = invocation.tool_records.len(),
                        "subtask completed"
                    );
                    return ExecutionReport::succeeded(
                        agent.clone(),
                        invocation.text,
                        invocation.tool_records,
                    );
                }
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    warn!(
                        subtask = %subtask.id,
                        agent = %agent,
                        attempt,
                        error = %err,
                        "transient execution failure, retrying"
                    );
                }
                Err(err) => {
                    warn!(subtask = %subtask.id, agent = %agent, error = %err, "subtask failed");
                    return ExecutionReport::failed(agent.clone(), err.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_invoker::AgentInvocation;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingInvoker {
        calls: AtomicUsize,
        fail_first: bool,
        transient: bool,
    }

    #[async_trait]
    impl AgentInvoker for CountingInvoker {
        async fn invoke(
            &self,
            _agent: &AgentId,
            _subtask: &Subtask,
        ) -> Result<AgentInvocation, InvokerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && call == 0 {
                if self.transient {
                    return Err(InvokerError::Timeout);
                }
                return Err(InvokerError::AgentFailed("tool crashed".to_string()));
            }
            Ok(AgentInvocation::new("done".to_string()))
        }
    }

    fn subtask() -> Subtask {
        Subtask::new("st-1", "list players", concierge_domain::RequestId::new("req-1"))
    }

    fn use_case(invoker: CountingInvoker) -> ExecuteSubtaskUseCase<CountingInvoker> {
        ExecuteSubtaskUseCase::new(
            Arc::new(invoker),
            Arc::new(LoadTracker::new()),
            Duration::from_secs(5),
            2,
        )
    }

    #[tokio::test]
    async fn test_successful_execution() {
        let uc = use_case(CountingInvoker {
            calls: AtomicUsize::new(0),
            fail_first: false,
            transient: false,
        });
        let report = uc.execute(&subtask(), &AgentId::new("operations")).await;
        assert!(report.success);
        assert_eq!(report.text, "done");
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let uc = use_case(CountingInvoker {
            calls: AtomicUsize::new(0),
            fail_first: true,
            transient: true,
        });
        let report = uc.execute(&subtask(), &AgentId::new("operations")).await;
        assert!(report.success);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_contained() {
        let uc = use_case(CountingInvoker {
            calls: AtomicUsize::new(0),
            fail_first: true,
            transient: false,
        });
        let report = uc.execute(&subtask(), &AgentId::new("operations")).await;
        assert!(!report.success);
        assert!(report.failure_reason.is_some());
        // permanent failures must not be retried
        assert_eq!(uc.invoker.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_released_after_execution() {
        let loads = Arc::new(LoadTracker::new());
        let uc = ExecuteSubtaskUseCase::new(
            Arc::new(CountingInvoker {
                calls: AtomicUsize::new(0),
                fail_first: false,
                transient: false,
            }),
            loads.clone(),
            Duration::from_secs(5),
            2,
        );
        let agent = AgentId::new("operations");
        uc.execute(&subtask(), &agent).await;
        assert_eq!(loads.load_of(&agent), 0);
    }
}
