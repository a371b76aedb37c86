//! SQLite-backed [`Store`]. `rusqlite::Connection` is `Send` but not `Sync`
//! and not `await`-safe, so every operation is shipped to a blocking thread
//! via `spawn_blocking` while holding a `parking_lot::Mutex` for the
//! duration of that one statement — the single-writer serialization
//! spec.md §5 asks the store to provide.

use crate::error::StoreError;
use crate::filter::{ListFilter, Statistics, StatsFilter, TransitionPatch};
use crate::store::Store;
use async_trait::async_trait;
use rcd_core::{Agent, AgentId, AgentStatus, Command, CommandId, CommandStatus};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

const MIGRATION: &str = include_str!("../migrations/0001_init.sql");

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening sqlite store");
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(MIGRATION)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(MIGRATION)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("blocking task panicked: {e}")))?
        .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

fn row_to_command(row: &rusqlite::Row) -> rusqlite::Result<Command> {
    let status_str: String = row.get("status")?;
    Ok(Command {
        command_id: CommandId::from_string(row.get::<_, String>("command_id")?),
        agent_id: AgentId::from_string(row.get::<_, String>("agent_id")?),
        command: row.get("command")?,
        timeout_seconds: row.get("timeout_seconds")?,
        priority: row.get("priority")?,
        status: parse_status(&status_str),
        created_at_ms: row.get("created_at")?,
        sent_at_ms: row.get("sent_at")?,
        completed_at_ms: row.get("completed_at")?,
        stdout: row.get("stdout")?,
        stderr: row.get("stderr")?,
        exit_code: row.get("exit_code")?,
        execution_time_seconds: row.get("execution_time_seconds")?,
        error_message: row.get("error_message")?,
        output_truncated: row.get::<_, i64>("output_truncated")? != 0,
    })
}

fn status_str(status: CommandStatus) -> &'static str {
    match status {
        CommandStatus::Pending => "pending",
        CommandStatus::Sent => "sent",
        CommandStatus::Executing => "executing",
        CommandStatus::Completed => "completed",
        CommandStatus::Failed => "failed",
        CommandStatus::Timeout => "timeout",
        CommandStatus::Cancelled => "cancelled",
    }
}

fn parse_status(s: &str) -> CommandStatus {
    match s {
        "pending" => CommandStatus::Pending,
        "sent" => CommandStatus::Sent,
        "executing" => CommandStatus::Executing,
        "completed" => CommandStatus::Completed,
        "timeout" => CommandStatus::Timeout,
        "cancelled" => CommandStatus::Cancelled,
        _ => CommandStatus::Failed,
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn upsert_agent(
        &self,
        agent_id: &AgentId,
        metadata: BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        let agent_id = agent_id.to_string();
        let metadata_json = serde_json::to_string(&metadata).unwrap_or_else(|_| "{}".into());
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO agents (agent_id, status, first_seen, metadata)
                 VALUES (?1, 'offline', strftime('%s','now') * 1000, ?2)
                 ON CONFLICT(agent_id) DO UPDATE SET metadata = excluded.metadata",
                params![agent_id, metadata_json],
            )?;
            Ok(())
        })
        .await
    }

    async fn mark_agent(&self, agent_id: &AgentId, status: AgentStatus) -> Result<(), StoreError> {
        let agent_id = agent_id.to_string();
        let status_str = if status == AgentStatus::Online { "online" } else { "offline" };
        self.blocking(move |conn| {
            if status_str == "online" {
                conn.execute(
                    "UPDATE agents SET status = ?1, last_connected = strftime('%s','now') * 1000
                     WHERE agent_id = ?2",
                    params![status_str, agent_id],
                )?;
            } else {
                conn.execute(
                    "UPDATE agents SET status = ?1 WHERE agent_id = ?2",
                    params![status_str, agent_id],
                )?;
            }
            Ok(())
        })
        .await
    }

    async fn get_agent(&self, agent_id: &AgentId) -> Result<Option<Agent>, StoreError> {
        let agent_id_s = agent_id.to_string();
        self.blocking(move |conn| {
            conn.query_row(
                "SELECT agent_id, status, first_seen, last_connected, metadata FROM agents WHERE agent_id = ?1",
                params![agent_id_s],
                row_to_agent,
            )
            .optional()
        })
        .await
    }

    async fn list_agents(&self) -> Result<Vec<Agent>, StoreError> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(
                "SELECT agent_id, status, first_seen, last_connected, metadata FROM agents ORDER BY first_seen",
            )?;
            let rows = stmt.query_map([], row_to_agent)?;
            rows.collect()
        })
        .await
    }

    async fn insert_command(&self, command: Command) -> Result<(), StoreError> {
        let result = self
            .blocking(move |conn| {
                conn.execute(
                    "INSERT INTO commands
                        (command_id, agent_id, command, timeout_seconds, priority, status,
                         created_at, stdout, stderr, output_truncated)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, '', '', 0)",
                    params![
                        command.command_id.to_string(),
                        command.agent_id.to_string(),
                        command.command,
                        command.timeout_seconds,
                        command.priority,
                        status_str(command.status),
                        command.created_at_ms,
                    ],
                )
            })
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(StoreError::Unavailable(msg)) if msg.contains("UNIQUE constraint failed") => {
                Err(StoreError::CommandConflict)
            }
            Err(e) => Err(e),
        }
    }

    async fn transition(
        &self,
        command_id: CommandId,
        from: &[CommandStatus],
        to: CommandStatus,
        patch: TransitionPatch,
    ) -> Result<bool, StoreError> {
        let from_list: Vec<&'static str> = from.iter().copied().map(status_str).collect();
        let to_str = status_str(to);
        let command_id_s = command_id.to_string();

        self.blocking(move |conn| {
            let sql = build_transition_sql(from_list.len(), &patch);

            let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            values.push(Box::new(to_str.to_string()));
            for v in patch.clone_for_binding() {
                values.push(v.boxed());
            }
            values.push(Box::new(command_id_s.clone()));
            for f in &from_list {
                values.push(Box::new(f.to_string()));
            }

            let params_dyn: Vec<&dyn rusqlite::ToSql> =
                values.iter().map(|b| b.as_ref()).collect();
            let affected = conn.execute(&sql, params_dyn.as_slice())?;
            let applied = affected > 0;
            tracing::debug!(%command_id_s, to = to_str, applied, "command transition");
            Ok(applied)
        })
        .await
    }

    async fn get_command(&self, command_id: CommandId) -> Result<Option<Command>, StoreError> {
        let id = command_id.to_string();
        self.blocking(move |conn| {
            conn.query_row(
                "SELECT * FROM commands WHERE command_id = ?1",
                params![id],
                row_to_command,
            )
            .optional()
        })
        .await
    }

    async fn list_commands(&self, filter: ListFilter) -> Result<Vec<Command>, StoreError> {
        self.blocking(move |conn| {
            let mut sql = String::from("SELECT * FROM commands WHERE 1=1");
            let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(agent_id) = &filter.agent_id {
                sql.push_str(" AND agent_id = ?");
                values.push(Box::new(agent_id.clone()));
            }
            if let Some(status) = filter.status {
                sql.push_str(" AND status = ?");
                values.push(Box::new(status_str(status).to_string()));
            }
            if let Some(after) = filter.created_after_ms {
                sql.push_str(" AND created_at >= ?");
                values.push(Box::new(after));
            }
            if let Some(before) = filter.created_before_ms {
                sql.push_str(" AND created_at <= ?");
                values.push(Box::new(before));
            }
            sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");
            values.push(Box::new(filter.limit.max(1) as i64));
            values.push(Box::new(filter.offset as i64));

            let mut stmt = conn.prepare(&sql)?;
            let params_dyn: Vec<&dyn rusqlite::ToSql> =
                values.iter().map(|b| b.as_ref()).collect();
            let rows = stmt.query_map(params_dyn.as_slice(), row_to_command)?;
            rows.collect()
        })
        .await
    }

    async fn pending_for_agent(&self, agent_id: &AgentId) -> Result<Vec<Command>, StoreError> {
        let agent_id = agent_id.to_string();
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM commands WHERE agent_id = ?1 AND status = 'pending'
                 ORDER BY priority DESC, created_at ASC",
            )?;
            let rows = stmt.query_map(params![agent_id], row_to_command)?;
            rows.collect()
        })
        .await
    }

    async fn in_flight_commands(&self) -> Result<Vec<Command>, StoreError> {
        self.blocking(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM commands WHERE status IN ('sent', 'executing')")?;
            let rows = stmt.query_map([], row_to_command)?;
            rows.collect()
        })
        .await
    }

    async fn purge_older_than(&self, cutoff_ms: i64) -> Result<u64, StoreError> {
        self.blocking(move |conn| {
            let affected = conn.execute(
                "DELETE FROM commands
                 WHERE status IN ('completed', 'failed', 'timeout', 'cancelled')
                   AND created_at < ?1",
                params![cutoff_ms],
            )?;
            Ok(affected as u64)
        })
        .await
    }

    async fn statistics(&self, filter: StatsFilter) -> Result<Statistics, StoreError> {
        self.blocking(move |conn| {
            let mut where_sql = String::from("WHERE 1=1");
            let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            if let Some(agent_id) = &filter.agent_id {
                where_sql.push_str(" AND agent_id = ?");
                values.push(Box::new(agent_id.clone()));
            }
            if let Some(after) = filter.created_after_ms {
                where_sql.push_str(" AND created_at >= ?");
                values.push(Box::new(after));
            }
            if let Some(before) = filter.created_before_ms {
                where_sql.push_str(" AND created_at <= ?");
                values.push(Box::new(before));
            }

            let sql = format!("SELECT status, COUNT(*) FROM commands {where_sql} GROUP BY status");
            let mut stmt = conn.prepare(&sql)?;
            let params_dyn: Vec<&dyn rusqlite::ToSql> =
                values.iter().map(|b| b.as_ref()).collect();
            let mut counts = std::collections::BTreeMap::new();
            let rows = stmt.query_map(params_dyn.as_slice(), |row| {
                let status: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((parse_status(&status), count as u64))
            })?;
            for row in rows {
                let (status, count) = row?;
                counts.insert(status, count);
            }

            let avg_sql = format!(
                "SELECT AVG(execution_time_seconds) FROM commands {where_sql} AND status = 'completed'"
            );
            let mut avg_stmt = conn.prepare(&avg_sql)?;
            let params_dyn: Vec<&dyn rusqlite::ToSql> =
                values.iter().map(|b| b.as_ref()).collect();
            let average: Option<f64> = avg_stmt.query_row(params_dyn.as_slice(), |row| row.get(0))?;

            Ok(Statistics { counts_by_status: counts, average_execution_time_seconds: average })
        })
        .await
    }
}

fn row_to_agent(row: &rusqlite::Row) -> rusqlite::Result<Agent> {
    let status_str: String = row.get("status")?;
    let metadata_json: String = row.get("metadata")?;
    let metadata: BTreeMap<String, String> = serde_json::from_str(&metadata_json).unwrap_or_default();
    Ok(Agent {
        agent_id: AgentId::from_string(row.get::<_, String>("agent_id")?),
        status: if status_str == "online" { AgentStatus::Online } else { AgentStatus::Offline },
        first_seen_ms: row.get("first_seen")?,
        last_connected_ms: row.get("last_connected")?,
        metadata,
    })
}

/// Build `SET` clause fragments for the fields present in `patch`, in a
/// fixed order so the positional-parameter SQL built by
/// [`build_transition_sql`] always matches [`TransitionPatch::clone_for_binding`].
fn patch_assignments(patch: &TransitionPatch) -> String {
    let mut sql = String::new();
    for (name, present) in patch_field_order(patch) {
        if present {
            sql.push_str(", ");
            sql.push_str(name);
            sql.push_str(" = ?");
        }
    }
    sql
}

fn patch_field_order(patch: &TransitionPatch) -> [(&'static str, bool); 8] {
    [
        ("sent_at", patch.sent_at_ms.is_some()),
        ("completed_at", patch.completed_at_ms.is_some()),
        ("stdout", patch.stdout.is_some()),
        ("stderr", patch.stderr.is_some()),
        ("exit_code", patch.exit_code.is_some()),
        ("execution_time_seconds", patch.execution_time_seconds.is_some()),
        ("error_message", patch.error_message.is_some()),
        ("output_truncated", patch.output_truncated.is_some()),
    ]
}

trait PatchBinding {
    fn clone_for_binding(&self) -> Vec<DynValue>;
}

enum DynValue {
    I64(i64),
    F64(f64),
    Text(String),
    Bool(bool),
}

impl DynValue {
    fn boxed(&self) -> Box<dyn rusqlite::ToSql> {
        match self {
            DynValue::I64(v) => Box::new(*v),
            DynValue::F64(v) => Box::new(*v),
            DynValue::Text(v) => Box::new(v.clone()),
            DynValue::Bool(v) => Box::new(*v as i64),
        }
    }
}

impl PatchBinding for TransitionPatch {
    fn clone_for_binding(&self) -> Vec<DynValue> {
        let mut values = Vec::new();
        if let Some(v) = self.sent_at_ms {
            values.push(DynValue::I64(v));
        }
        if let Some(v) = self.completed_at_ms {
            values.push(DynValue::I64(v));
        }
        if let Some(v) = &self.stdout {
            values.push(DynValue::Text(v.clone()));
        }
        if let Some(v) = &self.stderr {
            values.push(DynValue::Text(v.clone()));
        }
        if let Some(v) = self.exit_code {
            values.push(DynValue::I64(v as i64));
        }
        if let Some(v) = self.execution_time_seconds {
            values.push(DynValue::F64(v));
        }
        if let Some(v) = &self.error_message {
            values.push(DynValue::Text(v.clone()));
        }
        if let Some(v) = self.output_truncated {
            values.push(DynValue::Bool(v));
        }
        values
    }
}

fn build_transition_sql(from_count: usize, patch: &TransitionPatch) -> String {
    let assignments = patch_assignments(patch);
    let placeholders = vec!["?"; from_count].join(", ");
    format!(
        "UPDATE commands SET status = ?{assignments} WHERE command_id = ? AND status IN ({placeholders})"
    )
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
