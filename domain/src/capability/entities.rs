//! Capability domain entities

use crate::core::ids::CapabilityId;
use serde::{Deserialize, Serialize};

/// Hierarchy level of a capability, strictly ordered from broad to narrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityLevel {
    /// Basic skills every agent builds on (e.g. text understanding)
    Foundational,
    /// Day-to-day operations (e.g. record lookup)
    Operational,
    /// Multi-step coordination (e.g. payment reconciliation)
    Tactical,
    /// Cross-domain planning
    Strategic,
    /// Narrow expert skills
    Specialized,
}

impl CapabilityLevel {
    pub fn as_str(&self) -> &str {
        match self {
            CapabilityLevel::Foundational => "foundational",
            CapabilityLevel::Operational => "operational",
            CapabilityLevel::Tactical => "tactical",
            CapabilityLevel::Strategic => "strategic",
            CapabilityLevel::Specialized => "specialized",
        }
    }
}

impl std::fmt::Display for CapabilityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Functional category tag of a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityCategory {
    Communication,
    DataManagement,
    Financial,
    Scheduling,
    Analysis,
    General,
}

impl CapabilityCategory {
    pub fn as_str(&self) -> &str {
        match self {
            CapabilityCategory::Communication => "communication",
            CapabilityCategory::DataManagement => "data_management",
            CapabilityCategory::Financial => "financial",
            CapabilityCategory::Scheduling => "scheduling",
            CapabilityCategory::Analysis => "analysis",
            CapabilityCategory::General => "general",
        }
    }
}

impl std::fmt::Display for CapabilityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named, hierarchically related skill an agent may possess.
///
/// Relations (`parents`, `children`, `dependencies`) reference other
/// capability ids; they are indexed into adjacency lists when the capability
/// is inserted into a [`CapabilityGraph`](super::graph::CapabilityGraph).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    /// Unique identifier (e.g. "player_lookup")
    pub id: CapabilityId,
    /// Hierarchy level
    pub level: CapabilityLevel,
    /// Functional category
    pub category: CapabilityCategory,
    /// Free-text keywords used for fuzzy matching against request text
    pub keywords: Vec<String>,
    /// Broader capabilities this one refines
    pub parents: Vec<CapabilityId>,
    /// Narrower capabilities refining this one
    pub children: Vec<CapabilityId>,
    /// Capabilities this one depends on
    pub dependencies: Vec<CapabilityId>,
}

impl Capability {
    pub fn new(
        id: impl Into<CapabilityId>,
        level: CapabilityLevel,
        category: CapabilityCategory,
    ) -> Self {
        Self {
            id: id.into(),
            level,
            category,
            keywords: Vec::new(),
            parents: Vec::new(),
            children: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    pub fn with_keywords(
        mut self,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn with_parent(mut self, parent: impl Into<CapabilityId>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<CapabilityId>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_dependency(mut self, dep: impl Into<CapabilityId>) -> Self {
        self.dependencies.push(dep.into());
        self
    }

    /// Case-insensitive keyword hit test against free text.
    pub fn matches_text(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(CapabilityLevel::Foundational < CapabilityLevel::Operational);
        assert!(CapabilityLevel::Operational < CapabilityLevel::Tactical);
        assert!(CapabilityLevel::Tactical < CapabilityLevel::Strategic);
        assert!(CapabilityLevel::Strategic < CapabilityLevel::Specialized);
    }

    #[test]
    fn test_capability_builder() {
        let cap = Capability::new(
            "player_lookup",
            CapabilityLevel::Operational,
            CapabilityCategory::DataManagement,
        )
        .with_keywords(["player", "roster", "member"])
        .with_parent("data_access")
        .with_dependency("text_understanding");

        assert_eq!(cap.id.as_str(), "player_lookup");
        assert_eq!(cap.keywords.len(), 3);
        assert_eq!(cap.parents, vec![CapabilityId::new("data_access")]);
    }

    #[test]
    fn test_matches_text_case_insensitive() {
        let cap = Capability::new(
            "player_lookup",
            CapabilityLevel::Operational,
            CapabilityCategory::DataManagement,
        )
        .with_keyword("Roster");

        assert!(cap.matches_text("show me the roster please"));
        assert!(!cap.matches_text("create a payment"));
    }
}
