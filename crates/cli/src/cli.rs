use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "rcdctl", about = "Thin REST client for the dispatch fabric coordinator")]
pub struct Cli {
    /// Coordinator base URL.
    #[arg(long, env = "RCD_CLI_SERVER", default_value = "http://127.0.0.1:8443")]
    pub server: String,

    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Coordinator liveness and queue depth snapshot.
    Health,
    /// List known agents.
    Agents,
    /// Show one agent plus its pending/in-flight queue.
    Agent { agent_id: String },
    /// Submit a command to one agent.
    Submit {
        agent_id: String,
        command: String,
        #[arg(long)]
        timeout: Option<u32>,
        #[arg(long)]
        priority: Option<i32>,
    },
    /// Submit the same command to several agents at once.
    BulkSubmit {
        #[arg(long = "agent", required = true)]
        agent_ids: Vec<String>,
        command: String,
        #[arg(long)]
        timeout: Option<u32>,
        #[arg(long)]
        priority: Option<i32>,
    },
    /// List commands, optionally filtered by agent/status.
    Commands {
        #[arg(long)]
        agent_id: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 100)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show one command's full record.
    Command { command_id: String },
    /// Cancel a pending command.
    Cancel { command_id: String },
    /// Coordinator-wide status counts and the `late_result_drops` counter.
    Stats,
    /// Purge terminal commands older than N days.
    Cleanup {
        #[arg(long)]
        older_than_days: u32,
    },
    /// Stream the full command history as NDJSON or CSV.
    Export {
        #[arg(long, default_value = "json")]
        format: String,
    },
}
