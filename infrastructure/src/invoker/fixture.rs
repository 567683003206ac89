//! Fixture agent invoker.
//!
//! Simulates the agent side of the pipeline against an in-memory dataset:
//! each invocation performs the tool calls the subtask's capabilities imply,
//! captures them as [`ToolOutputRecord`]s, and writes a summary grounded in
//! those records. Scripted texts can be queued to stand in for an agent that
//! embellishes beyond its tool data, which is what exercises the validator.

use async_trait::async_trait;
use concierge_application::{AgentInvocation, AgentInvoker, InvokerError};
use concierge_domain::{AgentId, Subtask, ToolOutputRecord};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub name: String,
    pub status: String,
}

pub struct FixtureAgentInvoker {
    players: Vec<PlayerRecord>,
    payments: Vec<PlayerRecord>,
    scripted_texts: Mutex<VecDeque<String>>,
}

impl FixtureAgentInvoker {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            payments: Vec::new(),
            scripted_texts: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_player(mut self, name: impl Into<String>, status: impl Into<String>) -> Self {
        self.players.push(PlayerRecord {
            name: name.into(),
            status: status.into(),
        });
        self
    }

    pub fn with_payment(mut self, name: impl Into<String>, status: impl Into<String>) -> Self {
        self.payments.push(PlayerRecord {
            name: name.into(),
            status: status.into(),
        });
        self
    }

    /// Queue a canned response text. The next invocation uses it verbatim in
    /// place of the generated summary, while still returning the real tool
    /// records, so ungrounded claims in it are detectable downstream.
    pub fn with_scripted_text(self, text: impl Into<String>) -> Self {
        {
            let mut texts = self
                .scripted_texts
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            texts.push_back(text.into());
        }
        self
    }

    /// A small roster shared by the demo and the integration tests.
    pub fn demo_dataset() -> Self {
        Self::new()
            .with_player("Alice", "active")
            .with_player("Bob", "active")
            .with_player("Cara", "active")
            .with_player("Dave", "pending")
            .with_payment("Alice", "paid")
            .with_payment("Dave", "unpaid")
    }

    fn next_scripted_text(&self) -> Option<String> {
        self.scripted_texts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
    }

    fn records_json(records: &[PlayerRecord]) -> serde_json::Value {
        json!(records
            .iter()
            .map(|r| json!({ "name": r.name, "status": r.status }))
            .collect::<Vec<_>>())
    }

    fn summarize(records: &[PlayerRecord], noun: &str) -> String {
        if records.is_empty() {
            return format!("No {noun}s found.");
        }
        let listing = records
            .iter()
            .map(|r| format!("{} ({})", r.name, r.status))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Found {} {noun}s: {listing}.", records.len())
    }
}

impl Default for FixtureAgentInvoker {
    fn default() -> Self {
        Self::demo_dataset()
    }
}

#[async_trait]
impl AgentInvoker for FixtureAgentInvoker {
    async fn invoke(
        &self,
        agent: &AgentId,
        subtask: &Subtask,
    ) -> Result<AgentInvocation, InvokerError> {
        debug!(agent = %agent, subtask = %subtask.id, "fixture invocation");
        let capabilities: Vec<&str> = subtask
            .required_capabilities
            .iter()
            .map(|c| c.as_str())
            .collect();

        let (text, records) = if capabilities
            .iter()
            .any(|c| matches!(*c, "player_lookup" | "member_lookup" | "record_lookup"))
        {
            let mut record =
                ToolOutputRecord::new("list_players", Self::records_json(&self.players));
            for (key, value) in &subtask.parameters {
                record = record.with_input(key.clone(), value.clone());
            }
            (Self::summarize(&self.players, "player"), vec![record])
        } else if capabilities.contains(&"payment_lookup") {
            let record =
                ToolOutputRecord::new("payment_lookup", Self::records_json(&self.payments));
            (Self::summarize(&self.payments, "record"), vec![record])
        } else if capabilities.contains(&"payment_creation") {
            let player = subtask.parameters.get("player_name").and_then(|v| v.as_str());
            let record = ToolOutputRecord::new(
                "create_payment",
                json!({ "created": true, "player": player }),
            )
            .with_input("player_name", player.unwrap_or_default());
            let text = match player {
                Some(name) => format!("Payment created for {name}."),
                None => "Payment created as requested.".to_string(),
            };
            (text, vec![record])
        } else if capabilities.contains(&"event_scheduling") {
            let record = ToolOutputRecord::new(
                "schedule_event",
                json!({ "scheduled": true, "description": subtask.description }),
            );
            ("The event has been scheduled.".to_string(), vec![record])
        } else {
            (
                "I can help with roster questions, payments, and scheduling.".to_string(),
                Vec::new(),
            )
        };

        let text = self.next_scripted_text().unwrap_or(text);
        let mut invocation = AgentInvocation::new(text);
        for record in records {
            invocation = invocation.with_tool_record(record);
        }
        Ok(invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_domain::{validate, RequestId};

    fn subtask(capability: &str) -> Subtask {
        Subtask::new("st-1", "test", RequestId::new("req-1")).with_capability(capability)
    }

    #[tokio::test]
    async fn test_player_lookup_returns_grounded_summary() {
        let invoker = FixtureAgentInvoker::demo_dataset();
        let invocation = invoker
            .invoke(&AgentId::new("operations"), &subtask("player_lookup"))
            .await
            .unwrap();

        assert_eq!(invocation.tool_records.len(), 1);
        assert_eq!(invocation.tool_records[0].tool_name, "list_players");
        // generated summaries must pass the validator as-is
        let result = validate(&invocation.text, &invocation.tool_records);
        assert!(result.consistent);
    }

    #[tokio::test]
    async fn test_scripted_text_takes_precedence() {
        let invoker =
            FixtureAgentInvoker::demo_dataset().with_scripted_text("Found 99 players, all stars.");
        let invocation = invoker
            .invoke(&AgentId::new("operations"), &subtask("player_lookup"))
            .await
            .unwrap();
        assert!(invocation.text.contains("99"));
        // tool records still reflect the real data
        let result = validate(&invocation.text, &invocation.tool_records);
        assert!(!result.consistent);
    }

    #[tokio::test]
    async fn test_general_subtask_uses_no_tools() {
        let invoker = FixtureAgentInvoker::demo_dataset();
        let invocation = invoker
            .invoke(&AgentId::new("concierge_general"), &subtask("general_assistance"))
            .await
            .unwrap();
        assert!(invocation.tool_records.is_empty());
    }
}
