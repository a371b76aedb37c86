//! Enforces "exactly one live session per `agent_id`": registering a second
//! session for an already-bound agent closes the first one first.

use parking_lot::Mutex;
use rcd_core::AgentId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::state::CloseReason;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<AgentId, mpsc::UnboundedSender<CloseReason>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the session owning `close_tx` as the live session for
    /// `agent_id`. If another session was already registered for this
    /// agent, it is told to close with [`CloseReason::Superseded`] before
    /// the new one takes over the slot.
    pub fn register(&self, agent_id: AgentId, close_tx: mpsc::UnboundedSender<CloseReason>) {
        let mut sessions = self.sessions.lock();
        if let Some(previous) = sessions.insert(agent_id, close_tx) {
            let _ = previous.send(CloseReason::Superseded);
        }
    }

    /// Removes `agent_id`'s registration, but only if it still points at
    /// `close_tx` — a session superseded earlier must not clobber the
    /// registration of the session that replaced it.
    pub fn unregister(&self, agent_id: AgentId, close_tx: &mpsc::UnboundedSender<CloseReason>) {
        let mut sessions = self.sessions.lock();
        if let Some(current) = sessions.get(&agent_id) {
            if current.same_channel(close_tx) {
                sessions.remove(&agent_id);
            }
        }
    }

    pub fn is_online(&self, agent_id: &AgentId) -> bool {
        self.sessions.lock().contains_key(agent_id)
    }

    pub fn online_agent_ids(&self) -> Vec<AgentId> {
        self.sessions.lock().keys().copied().collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
