//! Agent identity and connection status.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

crate::define_id! {
    /// Identifier for a managed agent, derived deterministically from its
    /// bearer token at authentication time (see `rcd-session::auth`).
    pub struct AgentId("agt-");
}

/// Connection status of an agent as seen by the coordinator.
///
/// `Online` iff a live session is currently bound to this agent; this is an
/// overlay computed from the session registry, not a field persisted
/// independently of that fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentStatus {
    Online,
    Offline,
}

crate::simple_display! {
    AgentStatus {
        Online => "online",
        Offline => "offline",
    }
}

/// A managed agent and the bookkeeping the coordinator keeps about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: AgentId,
    pub status: AgentStatus,
    pub first_seen_ms: i64,
    pub last_connected_ms: Option<i64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Agent {
    pub fn new(agent_id: AgentId, first_seen_ms: i64) -> Self {
        Self {
            agent_id,
            status: AgentStatus::Offline,
            first_seen_ms,
            last_connected_ms: None,
            metadata: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
