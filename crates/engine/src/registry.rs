//! Top-level entry point: looks up or lazily spawns the per-agent actor for
//! every operation, so callers never need to know whether an agent's queue
//! already has a live task.

use crate::deadline::DeadlineWheel;
use crate::metrics::{EngineMetrics, EngineMetricsSnapshot};
use crate::queue::{self, AgentQueueConfig, AgentQueueHandle, QueueSummary};
use rcd_core::{AgentId, Clock};
use rcd_storage::Store;
use rcd_validator::Policy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct QueueEngine {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    policy: Arc<Policy>,
    deadlines: DeadlineWheel,
    metrics: Arc<EngineMetrics>,
    agent_config: AgentQueueConfig,
    agents: Mutex<HashMap<AgentId, AgentQueueHandle>>,
    next_agent_index: AtomicUsize,
}

impl QueueEngine {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, policy: Policy) -> Self {
        let deadlines = DeadlineWheel::spawn(Arc::clone(&clock));
        Self {
            store,
            clock,
            policy: Arc::new(policy),
            deadlines,
            metrics: Arc::new(EngineMetrics::default()),
            agent_config: AgentQueueConfig::default(),
            agents: Mutex::new(HashMap::new()),
            next_agent_index: AtomicUsize::new(0),
        }
    }

    pub fn metrics(&self) -> EngineMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn policy(&self) -> Arc<Policy> {
        Arc::clone(&self.policy)
    }

    /// Returns the handle for `agent_id`, spawning its actor on first use.
    /// A queue exists — and is kept warm — for every agent the coordinator
    /// has ever seen, online or not, so offline submission (spec.md §4.4)
    /// always has somewhere to land.
    pub fn queue_for(&self, agent_id: AgentId) -> AgentQueueHandle {
        let mut agents = self.agents.lock();
        if let Some(handle) = agents.get(&agent_id) {
            return handle.clone();
        }
        let agent_index = self.next_agent_index.fetch_add(1, Ordering::Relaxed);
        let handle = queue::spawn(
            agent_id,
            agent_index,
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            Arc::clone(&self.policy),
            self.deadlines.clone(),
            Arc::clone(&self.metrics),
            self.agent_config.clone(),
        );
        agents.insert(agent_id, handle.clone());
        handle
    }

    pub fn existing_queue_for(&self, agent_id: &AgentId) -> Option<AgentQueueHandle> {
        self.agents.lock().get(agent_id).cloned()
    }

    pub async fn summary_for(&self, agent_id: &AgentId) -> Option<QueueSummary> {
        let handle = self.existing_queue_for(agent_id)?;
        Some(handle.summary().await)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
