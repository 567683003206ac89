//! Capability graph — an adjacency-indexed acyclic hierarchy.
//!
//! The graph is immutable after [`CapabilityGraphBuilder::build`] and shared
//! read-only across concurrent requests. Routing uses
//! [`CapabilityGraph::relationship`] to grade how closely an agent's declared
//! capability relates to a required one.

use super::entities::Capability;
use crate::core::error::DomainError;
use crate::core::ids::CapabilityId;
use std::collections::{HashMap, HashSet, VecDeque};

/// Strength of the relationship between two capabilities, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelationStrength {
    Unrelated,
    SameCategory,
    Dependency,
    Sibling,
    Ancestor,
    DirectParentChild,
    Exact,
}

impl RelationStrength {
    /// Numeric multiplier used by the router's hierarchical match term.
    pub fn multiplier(&self) -> f64 {
        match self {
            RelationStrength::Exact => 1.0,
            RelationStrength::DirectParentChild => 0.8,
            RelationStrength::Ancestor => 0.6,
            RelationStrength::Sibling => 0.4,
            RelationStrength::Dependency => 0.3,
            RelationStrength::SameCategory => 0.2,
            RelationStrength::Unrelated => 0.0,
        }
    }
}

/// Immutable catalogue of capabilities with indexed adjacency.
#[derive(Debug, Clone, Default)]
pub struct CapabilityGraph {
    nodes: HashMap<CapabilityId, Capability>,
    parents: HashMap<CapabilityId, Vec<CapabilityId>>,
    children: HashMap<CapabilityId, Vec<CapabilityId>>,
    dependencies: HashMap<CapabilityId, Vec<CapabilityId>>,
}

impl CapabilityGraph {
    pub fn builder() -> CapabilityGraphBuilder {
        CapabilityGraphBuilder::default()
    }

    pub fn get(&self, id: &CapabilityId) -> Option<&Capability> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &CapabilityId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &Capability> {
        self.nodes.values()
    }

    pub fn parents_of(&self, id: &CapabilityId) -> &[CapabilityId] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children_of(&self, id: &CapabilityId) -> &[CapabilityId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Capabilities whose keywords match the given free text, sorted by id
    /// for deterministic fallback decomposition.
    pub fn match_keywords(&self, text: &str) -> Vec<CapabilityId> {
        let mut hits: Vec<CapabilityId> = self
            .nodes
            .values()
            .filter(|cap| cap.matches_text(text))
            .map(|cap| cap.id.clone())
            .collect();
        hits.sort();
        hits
    }

    /// Grade the relationship between two capabilities.
    ///
    /// Checks, strongest first: identity, direct parent/child, non-adjacent
    /// ancestor/descendant, sibling via shared parent, declared dependency
    /// (either direction), same category.
    pub fn relationship(&self, a: &CapabilityId, b: &CapabilityId) -> RelationStrength {
        if a == b {
            return RelationStrength::Exact;
        }
        let (Some(node_a), Some(node_b)) = (self.nodes.get(a), self.nodes.get(b)) else {
            return RelationStrength::Unrelated;
        };

        if self.parents_of(a).contains(b) || self.parents_of(b).contains(a) {
            return RelationStrength::DirectParentChild;
        }

        if self.is_ancestor(a, b) || self.is_ancestor(b, a) {
            return RelationStrength::Ancestor;
        }

        let parents_a: HashSet<&CapabilityId> = self.parents_of(a).iter().collect();
        if self.parents_of(b).iter().any(|p| parents_a.contains(p)) {
            return RelationStrength::Sibling;
        }

        let deps_a = self.dependencies.get(a).map(Vec::as_slice).unwrap_or(&[]);
        let deps_b = self.dependencies.get(b).map(Vec::as_slice).unwrap_or(&[]);
        if deps_a.contains(b) || deps_b.contains(a) {
            return RelationStrength::Dependency;
        }

        if node_a.category == node_b.category {
            return RelationStrength::SameCategory;
        }

        RelationStrength::Unrelated
    }

    /// Breadth-first walk up the parent edges from `descendant`.
    fn is_ancestor(&self, ancestor: &CapabilityId, descendant: &CapabilityId) -> bool {
        let mut seen: HashSet<&CapabilityId> = HashSet::new();
        let mut queue: VecDeque<&CapabilityId> = VecDeque::new();
        queue.push_back(descendant);

        while let Some(current) = queue.pop_front() {
            for parent in self.parents_of(current) {
                if parent == ancestor {
                    return true;
                }
                if seen.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }
        false
    }
}

/// Builder that validates the hierarchy before producing an immutable graph.
#[derive(Debug, Default)]
pub struct CapabilityGraphBuilder {
    capabilities: Vec<Capability>,
}

impl CapabilityGraphBuilder {
    pub fn add(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Index adjacency (symmetrizing declared parent/child edges) and reject
    /// unknown references and parent/child cycles.
    pub fn build(self) -> Result<CapabilityGraph, DomainError> {
        let mut graph = CapabilityGraph::default();

        for cap in &self.capabilities {
            graph.nodes.insert(cap.id.clone(), cap.clone());
        }

        for cap in &self.capabilities {
            for parent in &cap.parents {
                if !graph.nodes.contains_key(parent) {
                    return Err(DomainError::UnknownCapability(parent.to_string()));
                }
                Self::link(&mut graph.parents, &cap.id, parent);
                Self::link(&mut graph.children, parent, &cap.id);
            }
            for child in &cap.children {
                if !graph.nodes.contains_key(child) {
                    return Err(DomainError::UnknownCapability(child.to_string()));
                }
                Self::link(&mut graph.children, &cap.id, child);
                Self::link(&mut graph.parents, child, &cap.id);
            }
            for dep in &cap.dependencies {
                if !graph.nodes.contains_key(dep) {
                    return Err(DomainError::UnknownCapability(dep.to_string()));
                }
                Self::link(&mut graph.dependencies, &cap.id, dep);
            }
        }

        for id in graph.nodes.keys() {
            if graph.is_ancestor(id, id) {
                return Err(DomainError::GraphCycle(id.to_string()));
            }
        }

        Ok(graph)
    }

    fn link(
        index: &mut HashMap<CapabilityId, Vec<CapabilityId>>,
        from: &CapabilityId,
        to: &CapabilityId,
    ) {
        let entry = index.entry(from.clone()).or_default();
        if !entry.contains(to) {
            entry.push(to.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::entities::{CapabilityCategory, CapabilityLevel};

    fn cap(id: &str, category: CapabilityCategory) -> Capability {
        Capability::new(id, CapabilityLevel::Operational, category)
    }

    fn sample_graph() -> CapabilityGraph {
        CapabilityGraph::builder()
            .add(cap("data_access", CapabilityCategory::DataManagement))
            .add(
                cap("record_lookup", CapabilityCategory::DataManagement)
                    .with_parent("data_access"),
            )
            .add(
                cap("player_lookup", CapabilityCategory::DataManagement)
                    .with_parent("record_lookup")
                    .with_keyword("player"),
            )
            .add(
                cap("team_lookup", CapabilityCategory::DataManagement)
                    .with_parent("record_lookup"),
            )
            .add(
                cap("payment_creation", CapabilityCategory::Financial)
                    .with_dependency("player_lookup"),
            )
            .add(cap("invoicing", CapabilityCategory::Financial))
            .add(cap("chat_reply", CapabilityCategory::Communication))
            .build()
            .unwrap()
    }

    #[test]
    fn test_relationship_grades() {
        let g = sample_graph();
        let id = CapabilityId::new;

        assert_eq!(
            g.relationship(&id("player_lookup"), &id("player_lookup")),
            RelationStrength::Exact
        );
        assert_eq!(
            g.relationship(&id("player_lookup"), &id("record_lookup")),
            RelationStrength::DirectParentChild
        );
        assert_eq!(
            g.relationship(&id("player_lookup"), &id("data_access")),
            RelationStrength::Ancestor
        );
        assert_eq!(
            g.relationship(&id("player_lookup"), &id("team_lookup")),
            RelationStrength::Sibling
        );
        assert_eq!(
            g.relationship(&id("payment_creation"), &id("player_lookup")),
            RelationStrength::Dependency
        );
        assert_eq!(
            g.relationship(&id("payment_creation"), &id("invoicing")),
            RelationStrength::SameCategory
        );
        assert_eq!(
            g.relationship(&id("player_lookup"), &id("chat_reply")),
            RelationStrength::Unrelated
        );
    }

    #[test]
    fn test_relationship_is_symmetric() {
        let g = sample_graph();
        let a = CapabilityId::new("record_lookup");
        let b = CapabilityId::new("player_lookup");
        assert_eq!(g.relationship(&a, &b), g.relationship(&b, &a));
    }

    #[test]
    fn test_multiplier_order() {
        assert!(RelationStrength::Exact.multiplier() > RelationStrength::DirectParentChild.multiplier());
        assert!(RelationStrength::DirectParentChild.multiplier() > RelationStrength::Ancestor.multiplier());
        assert!(RelationStrength::Ancestor.multiplier() > RelationStrength::Sibling.multiplier());
        assert!(RelationStrength::Sibling.multiplier() > RelationStrength::Dependency.multiplier());
        assert!(RelationStrength::Dependency.multiplier() > RelationStrength::SameCategory.multiplier());
        assert_eq!(RelationStrength::Unrelated.multiplier(), 0.0);
    }

    #[test]
    fn test_cycle_rejected() {
        let result = CapabilityGraph::builder()
            .add(cap("a", CapabilityCategory::General).with_parent("b"))
            .add(cap("b", CapabilityCategory::General).with_parent("a"))
            .build();

        assert!(matches!(result, Err(DomainError::GraphCycle(_))));
    }

    #[test]
    fn test_unknown_reference_rejected() {
        let result = CapabilityGraph::builder()
            .add(cap("a", CapabilityCategory::General).with_parent("missing"))
            .build();

        assert!(matches!(result, Err(DomainError::UnknownCapability(_))));
    }

    #[test]
    fn test_declared_child_edges_are_symmetrized() {
        let g = CapabilityGraph::builder()
            .add(cap("base", CapabilityCategory::General).with_child("leaf"))
            .add(cap("leaf", CapabilityCategory::General))
            .build()
            .unwrap();

        assert_eq!(g.parents_of(&CapabilityId::new("leaf")), &[CapabilityId::new("base")]);
        assert_eq!(
            g.relationship(&CapabilityId::new("base"), &CapabilityId::new("leaf")),
            RelationStrength::DirectParentChild
        );
    }

    #[test]
    fn test_match_keywords_deterministic() {
        let g = sample_graph();
        let hits = g.match_keywords("list all players");
        assert_eq!(hits, vec![CapabilityId::new("player_lookup")]);
        assert!(g.match_keywords("unrelated text").is_empty());
    }
}
