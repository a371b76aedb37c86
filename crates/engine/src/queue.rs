//! Per-agent queue actor: the only task allowed to mutate that agent's
//! `pending`/`in_flight` state, per the Design Notes' ban on a shared
//! mutable object graph. All callers — the API, the session, the deadline
//! wheel — talk to it through [`AgentQueueHandle`] messages.

use crate::deadline::{DeadlineFired, DeadlineWheel};
use crate::error::EngineError;
use crate::metrics::EngineMetrics;
use crate::sink::{DispatchOutcome, SessionSink};
use crate::waiter::{terminal_patch_for, terminal_status_for, InFlight};
use rcd_core::{AgentId, Clock, Command, CommandId, CommandStatus};
use rcd_storage::{Store, StoreError, TransitionPatch};
use rcd_validator::Policy;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

pub const DEFAULT_GRACE_SECONDS: u32 = 5;
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 1_000;

#[derive(Debug, Clone, Default)]
pub struct QueueSummary {
    pub pending: usize,
    pub in_flight: usize,
    pub bound: bool,
}

pub(crate) enum QueueMsg {
    Submit { command: Command, reply: oneshot::Sender<Result<Command, EngineError>> },
    Bind { sink: Arc<dyn SessionSink>, reply: oneshot::Sender<()> },
    Unbind { reply: oneshot::Sender<()> },
    Cancel { command_id: CommandId, reply: oneshot::Sender<Result<(), EngineError>> },
    Resolve { command_id: CommandId, outcome: DispatchOutcome },
    Summary { reply: oneshot::Sender<QueueSummary> },
}

struct PendingEntry(Command);

impl PartialEq for PendingEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0.dispatch_key() == other.0.dispatch_key()
    }
}
impl Eq for PendingEntry {}
impl PartialOrd for PendingEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for PendingEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.dispatch_key().cmp(&other.0.dispatch_key())
    }
}

/// Handle callers use to talk to one agent's queue actor. Cheap to clone;
/// the actor task itself owns all mutable state.
#[derive(Clone)]
pub struct AgentQueueHandle {
    tx: mpsc::Sender<QueueMsg>,
}

impl AgentQueueHandle {
    pub async fn submit(&self, command: Command) -> Result<Command, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(QueueMsg::Submit { command, reply })
            .await
            .map_err(|_| EngineError::ShuttingDown)?;
        rx.await.map_err(|_| EngineError::ShuttingDown)?
    }

    pub async fn bind(&self, sink: Arc<dyn SessionSink>) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(QueueMsg::Bind { sink, reply }).await.is_ok() {
            let _ = rx.await;
        }
    }

    pub async fn unbind(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(QueueMsg::Unbind { reply }).await.is_ok() {
            let _ = rx.await;
        }
    }

    pub async fn cancel(&self, command_id: CommandId) -> Result<(), EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(QueueMsg::Cancel { command_id, reply })
            .await
            .map_err(|_| EngineError::ShuttingDown)?;
        rx.await.map_err(|_| EngineError::ShuttingDown)?
    }

    /// Called by a session actor when a `result`/`error` frame arrives.
    pub async fn resolve(&self, command_id: CommandId, outcome: DispatchOutcome) {
        let _ = self.tx.send(QueueMsg::Resolve { command_id, outcome }).await;
    }

    pub async fn summary(&self) -> QueueSummary {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(QueueMsg::Summary { reply }).await.is_ok() {
            rx.await.unwrap_or_default()
        } else {
            QueueSummary::default()
        }
    }

    pub(crate) fn sender(&self) -> mpsc::Sender<QueueMsg> {
        self.tx.clone()
    }
}

#[derive(Clone)]
pub struct AgentQueueConfig {
    pub grace_seconds: u32,
    pub max_queue_size: usize,
}

impl Default for AgentQueueConfig {
    fn default() -> Self {
        Self { grace_seconds: DEFAULT_GRACE_SECONDS, max_queue_size: DEFAULT_MAX_QUEUE_SIZE }
    }
}

/// Spawns the actor task for one agent and returns a handle to it.
pub(crate) fn spawn(
    agent_id: AgentId,
    agent_index: usize,
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    policy: Arc<Policy>,
    deadlines: DeadlineWheel,
    metrics: Arc<EngineMetrics>,
    config: AgentQueueConfig,
) -> AgentQueueHandle {
    let (tx, rx) = mpsc::channel(256);
    let fired_rx = deadlines.register_agent(agent_index);

    let actor = Actor {
        agent_id,
        agent_index,
        store,
        clock,
        policy,
        deadlines,
        metrics,
        config,
        pending: BinaryHeap::new(),
        pending_ids: HashSet::new(),
        cancelled_pending: HashSet::new(),
        in_flight: HashMap::new(),
        sink: None,
        next_generation: 0,
    };

    tokio::spawn(actor.run(rx, fired_rx));
    AgentQueueHandle { tx }
}

struct Actor {
    agent_id: AgentId,
    agent_index: usize,
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    policy: Arc<Policy>,
    deadlines: DeadlineWheel,
    metrics: Arc<EngineMetrics>,
    config: AgentQueueConfig,
    pending: BinaryHeap<Reverse<PendingEntry>>,
    pending_ids: HashSet<CommandId>,
    cancelled_pending: HashSet<CommandId>,
    in_flight: HashMap<CommandId, InFlight>,
    sink: Option<Arc<dyn SessionSink>>,
    next_generation: u64,
}

impl Actor {
    async fn run(mut self, mut rx: mpsc::Receiver<QueueMsg>, mut fired_rx: mpsc::UnboundedReceiver<DeadlineFired>) {
        // Rebuild in-memory pending from the store in case the coordinator
        // restarted with this agent's queue already populated.
        if let Ok(rows) = self.store.pending_for_agent(&self.agent_id).await {
            for command in rows {
                self.pending_ids.insert(command.command_id);
                self.pending.push(Reverse(PendingEntry(command)));
            }
        }

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    match msg {
                        Some(msg) => self.handle(msg).await,
                        None => return,
                    }
                }
                Some(fired) = fired_rx.recv() => {
                    self.handle_deadline(fired).await;
                }
            }
        }
    }

    async fn handle(&mut self, msg: QueueMsg) {
        match msg {
            QueueMsg::Submit { command, reply } => {
                let result = self.submit(command).await;
                let _ = reply.send(result);
            }
            QueueMsg::Bind { sink, reply } => {
                self.bind(sink).await;
                let _ = reply.send(());
            }
            QueueMsg::Unbind { reply } => {
                self.unbind().await;
                let _ = reply.send(());
            }
            QueueMsg::Cancel { command_id, reply } => {
                let result = self.cancel(command_id).await;
                let _ = reply.send(result);
            }
            QueueMsg::Resolve { command_id, outcome } => {
                self.resolve(command_id, outcome).await;
            }
            QueueMsg::Summary { reply } => {
                let _ = reply.send(QueueSummary {
                    pending: self.pending_ids.len(),
                    in_flight: self.in_flight.len(),
                    bound: self.sink.is_some(),
                });
            }
        }
    }

    async fn submit(&mut self, mut command: Command) -> Result<Command, EngineError> {
        if self.pending_ids.len() >= self.config.max_queue_size {
            return Err(EngineError::QueueFull);
        }
        let accepted =
            rcd_validator::validate(&command.command, Some(command.timeout_seconds), &self.policy)?;
        command.timeout_seconds = accepted.effective_timeout_seconds;

        self.store.insert_command(command.clone()).await.map_err(|e| match e {
            StoreError::CommandConflict => EngineError::CommandConflict(command.command_id),
            other => EngineError::StoreUnavailable(other),
        })?;

        self.pending_ids.insert(command.command_id);
        self.pending.push(Reverse(PendingEntry(command.clone())));
        tracing::debug!(agent_id = %self.agent_id, command_id = %command.command_id, "command queued");
        self.try_dispatch().await;
        Ok(command)
    }

    async fn bind(&mut self, sink: Arc<dyn SessionSink>) {
        self.sink = Some(sink);
        if let Ok(rows) = self.store.pending_for_agent(&self.agent_id).await {
            for command in rows {
                if self.pending_ids.insert(command.command_id) {
                    self.pending.push(Reverse(PendingEntry(command)));
                }
            }
        }
        self.try_dispatch().await;
    }

    async fn unbind(&mut self) {
        self.sink = None;
        let in_flight: Vec<CommandId> = self.in_flight.keys().copied().collect();
        if !in_flight.is_empty() {
            tracing::warn!(agent_id = %self.agent_id, count = in_flight.len(), "session lost, failing in-flight commands");
        }
        for command_id in in_flight {
            self.in_flight.remove(&command_id);
            let now_ms = self.clock.unix_ms();
            let _ = self
                .store
                .transition(
                    command_id,
                    &[CommandStatus::Sent, CommandStatus::Executing],
                    CommandStatus::Failed,
                    TransitionPatch {
                        completed_at_ms: Some(now_ms),
                        error_message: Some("session lost".to_string()),
                        ..Default::default()
                    },
                )
                .await;
            EngineMetrics::incr(&self.metrics.commands_failed);
        }
    }

    async fn cancel(&mut self, command_id: CommandId) -> Result<(), EngineError> {
        if self.in_flight.contains_key(&command_id) {
            return Err(EngineError::AlreadyDispatched(command_id));
        }
        if !self.pending_ids.remove(&command_id) {
            return Err(EngineError::CommandNotFound(command_id));
        }
        self.cancelled_pending.insert(command_id);
        let ok = self
            .store
            .transition(command_id, &[CommandStatus::Pending], CommandStatus::Cancelled, TransitionPatch::default())
            .await
            .map_err(EngineError::StoreUnavailable)?;
        if ok {
            EngineMetrics::incr(&self.metrics.commands_cancelled);
        }
        Ok(())
    }

    async fn resolve(&mut self, command_id: CommandId, outcome: DispatchOutcome) {
        let Some(_in_flight) = self.in_flight.remove(&command_id) else {
            // Unknown or already-resolved command: either a stray `result`
            // for a timed-out command (late arrival) or a duplicate frame.
            EngineMetrics::incr(&self.metrics.late_result_drops);
            return;
        };

        let now_ms = self.clock.unix_ms();
        let to = terminal_status_for(&outcome);
        let patch = terminal_patch_for(&outcome, now_ms);
        let _ = self
            .store
            .transition(command_id, &[CommandStatus::Sent, CommandStatus::Executing], to, patch)
            .await;

        match to {
            CommandStatus::Completed => EngineMetrics::incr(&self.metrics.commands_completed),
            CommandStatus::Failed => EngineMetrics::incr(&self.metrics.commands_failed),
            _ => {}
        }

        self.try_dispatch().await;
    }

    async fn handle_deadline(&mut self, fired: DeadlineFired) {
        let Some(in_flight) = self.in_flight.get(&fired.command_id) else {
            return;
        };
        if in_flight.generation != fired.generation {
            return;
        }
        self.in_flight.remove(&fired.command_id);

        let now_ms = self.clock.unix_ms();
        let _ = self
            .store
            .transition(
                fired.command_id,
                &[CommandStatus::Sent, CommandStatus::Executing],
                CommandStatus::Timeout,
                TransitionPatch {
                    completed_at_ms: Some(now_ms),
                    error_message: Some("deadline exceeded".to_string()),
                    ..Default::default()
                },
            )
            .await;
        EngineMetrics::incr(&self.metrics.commands_timed_out);
        self.try_dispatch().await;
    }

    async fn try_dispatch(&mut self) {
        let Some(sink) = self.sink.clone() else { return };

        loop {
            let Some(Reverse(PendingEntry(command))) = self.pending.pop() else { return };
            self.pending_ids.remove(&command.command_id);
            if self.cancelled_pending.remove(&command.command_id) {
                continue;
            }

            let now_ms = self.clock.unix_ms();
            let sent_ok = match self
                .store
                .transition(
                    command.command_id,
                    &[CommandStatus::Pending],
                    CommandStatus::Sent,
                    TransitionPatch { sent_at_ms: Some(now_ms), ..Default::default() },
                )
                .await
            {
                Ok(ok) => ok,
                Err(_) => false,
            };
            if !sent_ok {
                // Lost the CAS race (e.g. cancelled concurrently); the
                // store is authoritative, so just drop this pop and move on.
                continue;
            }

            let generation = self.next_generation;
            self.next_generation += 1;
            let deadline_ms = now_ms + (command.timeout_seconds as i64 + self.config.grace_seconds as i64) * 1000;
            self.in_flight.insert(
                command.command_id,
                InFlight { command_id: command.command_id, generation, deadline_ms },
            );
            self.deadlines.register(self.agent_index, command.command_id, generation, deadline_ms);

            let send_result = sink
                .send_command(command.command_id, &command.command, command.timeout_seconds, command.priority)
                .await;

            if send_result.is_err() {
                let command_id = command.command_id;
                self.in_flight.remove(&command_id);
                let _ = self
                    .store
                    .transition(
                        command_id,
                        &[CommandStatus::Sent],
                        CommandStatus::Pending,
                        TransitionPatch::default(),
                    )
                    .await;
                self.pending_ids.insert(command_id);
                self.pending.push(Reverse(PendingEntry(command)));
                self.sink = None;
                tracing::warn!(agent_id = %self.agent_id, command_id = %command_id, "send failed, command returned to pending");
                return;
            }

            EngineMetrics::incr(&self.metrics.commands_dispatched);
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
