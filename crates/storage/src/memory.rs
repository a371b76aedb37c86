//! In-process [`Store`] used by engine/session unit tests and by `rcd-cli`
//! demos — no filesystem, no SQL, just a mutex-guarded map mirroring the
//! SQLite schema's semantics exactly.

use crate::error::StoreError;
use crate::filter::{ListFilter, Statistics, StatsFilter, TransitionPatch};
use crate::store::Store;
use async_trait::async_trait;
use rcd_core::{Agent, AgentId, AgentStatus, Command, CommandId, CommandStatus};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
struct Inner {
    agents: HashMap<AgentId, Agent>,
    commands: HashMap<CommandId, Command>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_patch(command: &mut Command, to: CommandStatus, patch: TransitionPatch) {
    command.status = to;
    if let Some(v) = patch.sent_at_ms {
        command.sent_at_ms = Some(v);
    }
    if let Some(v) = patch.completed_at_ms {
        command.completed_at_ms = Some(v);
    }
    if let Some(v) = patch.stdout {
        command.stdout = v;
    }
    if let Some(v) = patch.stderr {
        command.stderr = v;
    }
    if let Some(v) = patch.exit_code {
        command.exit_code = Some(v);
    }
    if let Some(v) = patch.execution_time_seconds {
        command.execution_time_seconds = Some(v);
    }
    if let Some(v) = patch.error_message {
        command.error_message = Some(v);
    }
    if let Some(v) = patch.output_truncated {
        command.output_truncated = v;
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_agent(
        &self,
        agent_id: &AgentId,
        metadata: BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner
            .agents
            .entry(*agent_id)
            .and_modify(|a| a.metadata = metadata.clone())
            .or_insert_with(|| {
                let mut agent = Agent::new(*agent_id, 0);
                agent.metadata = metadata;
                agent
            });
        Ok(())
    }

    async fn mark_agent(&self, agent_id: &AgentId, status: AgentStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let agent = inner.agents.get_mut(agent_id).ok_or(StoreError::UnknownAgent(*agent_id))?;
        agent.status = status;
        Ok(())
    }

    async fn get_agent(&self, agent_id: &AgentId) -> Result<Option<Agent>, StoreError> {
        Ok(self.inner.lock().agents.get(agent_id).cloned())
    }

    async fn list_agents(&self) -> Result<Vec<Agent>, StoreError> {
        let mut agents: Vec<Agent> = self.inner.lock().agents.values().cloned().collect();
        agents.sort_by_key(|a| a.first_seen_ms);
        Ok(agents)
    }

    async fn insert_command(&self, command: Command) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.commands.contains_key(&command.command_id) {
            return Err(StoreError::CommandConflict);
        }
        inner.commands.insert(command.command_id, command);
        Ok(())
    }

    async fn transition(
        &self,
        command_id: CommandId,
        from: &[CommandStatus],
        to: CommandStatus,
        patch: TransitionPatch,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock();
        let Some(command) = inner.commands.get_mut(&command_id) else {
            return Err(StoreError::CommandNotFound);
        };
        if !from.contains(&command.status) {
            return Ok(false);
        }
        apply_patch(command, to, patch);
        Ok(true)
    }

    async fn get_command(&self, command_id: CommandId) -> Result<Option<Command>, StoreError> {
        Ok(self.inner.lock().commands.get(&command_id).cloned())
    }

    async fn list_commands(&self, filter: ListFilter) -> Result<Vec<Command>, StoreError> {
        let inner = self.inner.lock();
        let mut commands: Vec<Command> = inner
            .commands
            .values()
            .filter(|c| filter.agent_id.as_deref().map_or(true, |id| c.agent_id.as_str() == id))
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .filter(|c| filter.created_after_ms.map_or(true, |t| c.created_at_ms >= t))
            .filter(|c| filter.created_before_ms.map_or(true, |t| c.created_at_ms <= t))
            .cloned()
            .collect();
        commands.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        let limit = filter.limit.max(1) as usize;
        Ok(commands.into_iter().skip(filter.offset as usize).take(limit).collect())
    }

    async fn pending_for_agent(&self, agent_id: &AgentId) -> Result<Vec<Command>, StoreError> {
        let inner = self.inner.lock();
        let mut commands: Vec<Command> = inner
            .commands
            .values()
            .filter(|c| c.agent_id == *agent_id && c.status == CommandStatus::Pending)
            .cloned()
            .collect();
        commands.sort_by_key(|c| c.dispatch_key());
        Ok(commands)
    }

    async fn in_flight_commands(&self) -> Result<Vec<Command>, StoreError> {
        Ok(self
            .inner
            .lock()
            .commands
            .values()
            .filter(|c| matches!(c.status, CommandStatus::Sent | CommandStatus::Executing))
            .cloned()
            .collect())
    }

    async fn purge_older_than(&self, cutoff_ms: i64) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock();
        let before = inner.commands.len();
        inner
            .commands
            .retain(|_, c| !(c.status.is_terminal() && c.created_at_ms < cutoff_ms));
        Ok((before - inner.commands.len()) as u64)
    }

    async fn statistics(&self, filter: StatsFilter) -> Result<Statistics, StoreError> {
        let inner = self.inner.lock();
        let matching: Vec<&Command> = inner
            .commands
            .values()
            .filter(|c| filter.agent_id.as_deref().map_or(true, |id| c.agent_id.as_str() == id))
            .filter(|c| filter.created_after_ms.map_or(true, |t| c.created_at_ms >= t))
            .filter(|c| filter.created_before_ms.map_or(true, |t| c.created_at_ms <= t))
            .collect();

        let mut counts_by_status = BTreeMap::new();
        for command in &matching {
            *counts_by_status.entry(command.status).or_insert(0u64) += 1;
        }

        let completed_times: Vec<f64> = matching
            .iter()
            .filter(|c| c.status == CommandStatus::Completed)
            .filter_map(|c| c.execution_time_seconds)
            .collect();
        let average_execution_time_seconds = if completed_times.is_empty() {
            None
        } else {
            Some(completed_times.iter().sum::<f64>() / completed_times.len() as f64)
        };

        Ok(Statistics { counts_by_status, average_execution_time_seconds })
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
