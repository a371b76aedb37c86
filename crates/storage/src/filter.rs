use rcd_core::CommandStatus;

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub agent_id: Option<String>,
    pub status: Option<CommandStatus>,
    pub created_after_ms: Option<i64>,
    pub created_before_ms: Option<i64>,
    pub limit: u32,
    pub offset: u32,
}

impl ListFilter {
    pub fn for_agent(agent_id: impl Into<String>) -> Self {
        Self { agent_id: Some(agent_id.into()), limit: 100, ..Default::default() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatsFilter {
    pub agent_id: Option<String>,
    pub created_after_ms: Option<i64>,
    pub created_before_ms: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub counts_by_status: std::collections::BTreeMap<CommandStatus, u64>,
    pub average_execution_time_seconds: Option<f64>,
}

/// Fields a `transition` call may update alongside the status itself.
/// Every field is additive-only: `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct TransitionPatch {
    pub sent_at_ms: Option<i64>,
    pub completed_at_ms: Option<i64>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: Option<i32>,
    pub execution_time_seconds: Option<f64>,
    pub error_message: Option<String>,
    pub output_truncated: Option<bool>,
}
