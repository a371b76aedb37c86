//! DTOs for the REST surface described in spec.md §4.5 / §6. These are the
//! JSON shapes the coordinator's axum handlers accept and return; kept
//! separate from the domain types in `rcd-core` so the wire format can
//! evolve independently of storage/engine internals.

use rcd_core::{AgentId, AgentStatus, CommandId, CommandStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub command: String,
    #[serde(default)]
    pub timeout: Option<u32>,
    #[serde(default)]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub command_id: CommandId,
    pub status: CommandStatus,
    pub effective_timeout_seconds: u32,
    pub effective_priority: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSubmitRequest {
    pub agent_ids: Vec<String>,
    pub command: String,
    #[serde(default)]
    pub timeout: Option<u32>,
    #[serde(default)]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSubmitResult {
    pub agent_id: AgentId,
    pub outcome: BulkOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BulkOutcome {
    Submitted { command_id: CommandId },
    Rejected { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandView {
    pub command_id: CommandId,
    pub agent_id: AgentId,
    pub command: String,
    pub timeout_seconds: u32,
    pub priority: i32,
    pub status: CommandStatus,
    pub created_at_ms: i64,
    pub sent_at_ms: Option<i64>,
    pub completed_at_ms: Option<i64>,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub execution_time_seconds: Option<f64>,
    pub error_message: Option<String>,
    pub output_truncated: bool,
}

impl From<rcd_core::Command> for CommandView {
    fn from(c: rcd_core::Command) -> Self {
        Self {
            command_id: c.command_id,
            agent_id: c.agent_id,
            command: c.command,
            timeout_seconds: c.timeout_seconds,
            priority: c.priority,
            status: c.status,
            created_at_ms: c.created_at_ms,
            sent_at_ms: c.sent_at_ms,
            completed_at_ms: c.completed_at_ms,
            stdout: c.stdout,
            stderr: c.stderr,
            exit_code: c.exit_code,
            execution_time_seconds: c.execution_time_seconds,
            error_message: c.error_message,
            output_truncated: c.output_truncated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentView {
    pub agent_id: AgentId,
    pub status: AgentStatus,
    pub first_seen_ms: i64,
    pub last_connected_ms: Option<i64>,
    pub metadata: std::collections::BTreeMap<String, String>,
    pub pending_count: usize,
    pub in_flight_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommandFilter {
    pub agent_id: Option<String>,
    pub status: Option<CommandStatus>,
    pub created_after_ms: Option<i64>,
    pub created_before_ms: Option<i64>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSummary {
    pub agent_id: AgentId,
    pub online: bool,
    pub pending: Vec<CommandView>,
    pub in_flight: Vec<CommandView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub counts_by_status: std::collections::BTreeMap<String, u64>,
    pub average_execution_time_seconds: Option<f64>,
    pub late_result_drops: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupRequest {
    pub older_than_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub deleted: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExportQuery {
    #[serde(flatten)]
    pub filter: CommandFilter,
    #[serde(default = "default_export_format")]
    pub format: ExportFormat,
}

fn default_export_format() -> ExportFormat {
    ExportFormat::Json
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub uptime_seconds: u64,
    pub online_agents: usize,
    pub known_agents: usize,
    pub queued_commands: usize,
    pub in_flight_commands: usize,
    pub store_reachable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub reason: Option<String>,
}
