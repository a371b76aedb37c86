use rcd_core::CommandStatus;
use rcd_wire::api::{BulkSubmitRequest, CommandFilter, SubmitRequest};

use crate::cli::{Cli, Command};
use crate::client::{ClientError, CoordinatorClient};
use crate::exit_error::ExitError;
use crate::output::{self, OutputFormat};

pub async fn run(cli: Cli) -> Result<(), ExitError> {
    let client = CoordinatorClient::new(cli.server);
    let format = cli.output;

    match cli.command {
        Command::Health => {
            let snapshot = client.health().await.map_err(to_exit_error)?;
            output::show(format, &snapshot, |s| {
                println!(
                    "uptime={}s online={}/{} queued={} in_flight={} store_reachable={}",
                    s.uptime_seconds,
                    s.online_agents,
                    s.known_agents,
                    s.queued_commands,
                    s.in_flight_commands,
                    s.store_reachable
                );
            })
            .map_err(to_exit_error_anyhow)
        }
        Command::Agents => {
            let agents = client.list_agents().await.map_err(to_exit_error)?;
            output::list(format, &agents, "No agents known", |a| {
                println!(
                    "{}  {}  pending={} in_flight={}",
                    a.agent_id, a.status, a.pending_count, a.in_flight_count
                );
            })
            .map_err(to_exit_error_anyhow)
        }
        Command::Agent { agent_id } => {
            let agent = client.get_agent(&agent_id).await.map_err(to_exit_error)?;
            let queue = client.agent_queue(&agent_id).await.map_err(to_exit_error)?;
            output::show(format, &(agent, queue), |pair| {
                let (a, q) = pair;
                println!("{}  {}", a.agent_id, a.status);
                println!("pending: {}", q.pending.len());
                println!("in_flight: {}", q.in_flight.len());
            })
            .map_err(to_exit_error_anyhow)
        }
        Command::Submit { agent_id, command, timeout, priority } => {
            let req = SubmitRequest { command, timeout, priority };
            let resp = client.submit(&agent_id, &req).await.map_err(to_exit_error)?;
            output::show(format, &resp, |r| {
                println!("{}  status={}  timeout={}s", r.command_id, r.status, r.effective_timeout_seconds);
            })
            .map_err(to_exit_error_anyhow)
        }
        Command::BulkSubmit { agent_ids, command, timeout, priority } => {
            let req = BulkSubmitRequest { agent_ids, command, timeout, priority };
            let results = client.bulk_submit(&req).await.map_err(to_exit_error)?;
            output::list(format, &results, "No agents targeted", |r| match &r.outcome {
                rcd_wire::api::BulkOutcome::Submitted { command_id } => {
                    println!("{}  submitted  {}", r.agent_id, command_id)
                }
                rcd_wire::api::BulkOutcome::Rejected { reason } => {
                    println!("{}  rejected  {}", r.agent_id, reason)
                }
            })
            .map_err(to_exit_error_anyhow)
        }
        Command::Commands { agent_id, status, limit, offset } => {
            let filter = CommandFilter {
                agent_id,
                status: status.as_deref().map(parse_status).transpose()?,
                created_after_ms: None,
                created_before_ms: None,
                limit,
                offset,
            };
            let rows = client.list_commands(&filter).await.map_err(to_exit_error)?;
            output::list(format, &rows, "No commands found", |c| {
                println!("{}  {}  {}  {}", c.command_id, c.agent_id, c.status, c.command);
            })
            .map_err(to_exit_error_anyhow)
        }
        Command::Command { command_id } => {
            let c = client.get_command(&command_id).await.map_err(to_exit_error)?;
            output::show(format, &c, |c| {
                println!("{}  agent={}  status={}", c.command_id, c.agent_id, c.status);
                println!("command: {}", c.command);
                if let Some(code) = c.exit_code {
                    println!("exit_code: {code}");
                }
                if !c.stdout.is_empty() {
                    println!("--- stdout ---\n{}", c.stdout);
                }
                if !c.stderr.is_empty() {
                    println!("--- stderr ---\n{}", c.stderr);
                }
            })
            .map_err(to_exit_error_anyhow)
        }
        Command::Cancel { command_id } => {
            client.cancel_command(&command_id).await.map_err(to_exit_error)?;
            println!("cancelled {command_id}");
            Ok(())
        }
        Command::Stats => {
            let stats = client.statistics().await.map_err(to_exit_error)?;
            output::show(format, &stats, |s| {
                for (status, count) in &s.counts_by_status {
                    println!("{status}: {count}");
                }
                if let Some(avg) = s.average_execution_time_seconds {
                    println!("average_execution_time_seconds: {avg:.3}");
                }
                println!("late_result_drops: {}", s.late_result_drops);
            })
            .map_err(to_exit_error_anyhow)
        }
        Command::Cleanup { older_than_days } => {
            let resp = client.cleanup(older_than_days).await.map_err(to_exit_error)?;
            output::show(format, &resp, |r| println!("deleted {} commands", r.deleted))
                .map_err(to_exit_error_anyhow)
        }
        Command::Export { format: export_format } => {
            let body = client.export(&export_format).await.map_err(to_exit_error)?;
            print!("{body}");
            Ok(())
        }
    }
}

fn parse_status(s: &str) -> Result<CommandStatus, ExitError> {
    match s {
        "pending" => Ok(CommandStatus::Pending),
        "sent" => Ok(CommandStatus::Sent),
        "executing" => Ok(CommandStatus::Executing),
        "completed" => Ok(CommandStatus::Completed),
        "failed" => Ok(CommandStatus::Failed),
        "timeout" => Ok(CommandStatus::Timeout),
        "cancelled" => Ok(CommandStatus::Cancelled),
        other => Err(ExitError::new(2, format!("unknown status {other:?}"))),
    }
}

fn to_exit_error(e: ClientError) -> ExitError {
    match e {
        ClientError::Api { status, message } => ExitError::new(1, format!("{status}: {message}")),
        ClientError::Request(e) => ExitError::new(1, format!("request failed: {e}")),
    }
}

fn to_exit_error_anyhow(e: anyhow::Error) -> ExitError {
    ExitError::new(1, e.to_string())
}
