use crate::error::StoreError;
use crate::filter::{ListFilter, Statistics, StatsFilter, TransitionPatch};
use async_trait::async_trait;
use rcd_core::{Agent, AgentId, AgentStatus, Command, CommandId, CommandStatus};
use std::collections::BTreeMap;

/// The durable record of every agent and command. Implementations must make
/// every method atomic with respect to concurrent callers — in particular,
/// [`Store::transition`] is a compare-and-set: under any race, exactly one
/// caller observes `true`.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn upsert_agent(
        &self,
        agent_id: &AgentId,
        metadata: BTreeMap<String, String>,
    ) -> Result<(), StoreError>;

    async fn mark_agent(&self, agent_id: &AgentId, status: AgentStatus) -> Result<(), StoreError>;

    async fn get_agent(&self, agent_id: &AgentId) -> Result<Option<Agent>, StoreError>;

    async fn list_agents(&self) -> Result<Vec<Agent>, StoreError>;

    async fn insert_command(&self, command: Command) -> Result<(), StoreError>;

    /// Compare-and-set: succeeds (returns `true`) only if the command's
    /// current status is one of `from`. `patch` fields are written
    /// alongside `to` in the same atomic step.
    async fn transition(
        &self,
        command_id: CommandId,
        from: &[CommandStatus],
        to: CommandStatus,
        patch: TransitionPatch,
    ) -> Result<bool, StoreError>;

    async fn get_command(&self, command_id: CommandId) -> Result<Option<Command>, StoreError>;

    async fn list_commands(&self, filter: ListFilter) -> Result<Vec<Command>, StoreError>;

    /// All `pending` commands for `agent_id`, ordered `(-priority, created_at)`
    /// — the order the in-memory queue must rebuild itself in in [`Store::pending_for_agent`]
    /// callers.
    async fn pending_for_agent(&self, agent_id: &AgentId) -> Result<Vec<Command>, StoreError>;

    /// All commands still in `sent`/`executing` — used at coordinator
    /// startup to apply the restart policy from SPEC_FULL.md §9.
    async fn in_flight_commands(&self) -> Result<Vec<Command>, StoreError>;

    async fn purge_older_than(&self, cutoff_ms: i64) -> Result<u64, StoreError>;

    async fn statistics(&self, filter: StatsFilter) -> Result<Statistics, StoreError>;
}
