//! In-flight load accounting for routing.
//!
//! The router's load-balance term is the only in-process concurrency signal.
//! Counts are updated atomically when a subtask is assigned and released by
//! an RAII guard, so load is dropped on every exit path, including errors.

use concierge_domain::AgentId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct LoadTracker {
    counts: Mutex<HashMap<AgentId, Arc<AtomicUsize>>>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current in-flight subtask count per agent.
    pub fn loads(&self) -> HashMap<AgentId, usize> {
        let counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        counts
            .iter()
            .map(|(agent, count)| (agent.clone(), count.load(Ordering::Relaxed)))
            .collect()
    }

    pub fn load_of(&self, agent: &AgentId) -> usize {
        let counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        counts
            .get(agent)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Assign a subtask to an agent, incrementing its load until the returned
    /// guard is dropped.
    pub fn assign(&self, agent: &AgentId) -> LoadGuard {
        let count = {
            let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
            counts.entry(agent.clone()).or_default().clone()
        };
        count.fetch_add(1, Ordering::SeqCst);
        LoadGuard { count }
    }
}

/// Releases one unit of agent load on drop.
#[derive(Debug)]
pub struct LoadGuard {
    count: Arc<AtomicUsize>,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}
