//! Validation ground truth and result types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw record of one tool invocation, captured by the executor before the
/// agent's final text is produced. The validator's sole source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutputRecord {
    pub tool_name: String,
    pub inputs: HashMap<String, serde_json::Value>,
    /// Structured output as returned by the tool (object or array).
    pub structured_output: serde_json::Value,
    /// Text rendering the tool produced, if any.
    pub raw_text: Option<String>,
}

impl ToolOutputRecord {
    pub fn new(tool_name: impl Into<String>, structured_output: serde_json::Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            inputs: HashMap::new(),
            structured_output,
            raw_text: None,
        }
    }

    pub fn with_input(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    pub fn with_raw_text(mut self, text: impl Into<String>) -> Self {
        self.raw_text = Some(text.into());
        self
    }
}

/// Kind of inconsistency the validator can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssueKind {
    /// Text references entity content but no entity-producing tool ran.
    ToolUsageMissing,
    /// An entity named in the text is absent from tool outputs.
    FabricatedEntity,
    /// A count claimed in the text exceeds the tool-reported count.
    CountInflation,
    /// Status tallies in the text disagree with tool-derived tallies.
    StatusMismatch,
}

impl ValidationIssueKind {
    pub fn as_str(&self) -> &str {
        match self {
            ValidationIssueKind::ToolUsageMissing => "tool_usage_missing",
            ValidationIssueKind::FabricatedEntity => "fabricated_entity",
            ValidationIssueKind::CountInflation => "count_inflation",
            ValidationIssueKind::StatusMismatch => "status_mismatch",
        }
    }
}

/// A detected inconsistency between agent text and tool ground truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: ValidationIssueKind,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(kind: ValidationIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of validating one agent response against tool outputs.
///
/// Immutable; re-validation produces a new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub consistent: bool,
    pub issues: Vec<ValidationIssue>,
    pub tools_used: Vec<String>,
    pub recommendations: Vec<String>,
}

impl ValidationResult {
    pub fn consistent(tools_used: Vec<String>) -> Self {
        Self {
            consistent: true,
            issues: Vec::new(),
            tools_used,
            recommendations: Vec::new(),
        }
    }

    pub fn inconsistent(
        issues: Vec<ValidationIssue>,
        tools_used: Vec<String>,
        recommendations: Vec<String>,
    ) -> Self {
        Self {
            consistent: issues.is_empty(),
            issues,
            tools_used,
            recommendations,
        }
    }

    pub fn has_issue(&self, kind: ValidationIssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }
}
