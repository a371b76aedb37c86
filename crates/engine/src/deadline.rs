//! A single shared timer wheel for all in-flight command deadlines, so that
//! N outstanding waiters cost one sleeping task instead of N. Each agent
//! actor registers a route once and is then notified directly when one of
//! its deadlines fires.

use rcd_core::{Clock, CommandId};
use parking_lot::Mutex;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy)]
pub struct DeadlineFired {
    pub command_id: CommandId,
    pub generation: u64,
}

struct Entry {
    deadline_ms: i64,
    agent_index: usize,
    command_id: CommandId,
    generation: u64,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline_ms == other.deadline_ms
    }
}
impl Eq for Entry {}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.deadline_ms.cmp(&other.deadline_ms)
    }
}

struct Shared {
    heap: Mutex<BinaryHeap<Reverse<Entry>>>,
    routes: Mutex<HashMap<usize, mpsc::UnboundedSender<DeadlineFired>>>,
    wake: mpsc::UnboundedSender<()>,
}

#[derive(Clone)]
pub struct DeadlineWheel {
    shared: Arc<Shared>,
}

impl DeadlineWheel {
    #[allow(clippy::expect_used)]
    pub fn spawn(clock: Arc<dyn Clock>) -> Self {
        let (wake_tx, mut wake_rx) = mpsc::unbounded_channel::<()>();
        let shared = Arc::new(Shared {
            heap: Mutex::new(BinaryHeap::new()),
            routes: Mutex::new(HashMap::new()),
            wake: wake_tx,
        });

        let driver_shared = Arc::clone(&shared);
        tokio::spawn(async move {
            loop {
                let next_sleep = {
                    let heap = driver_shared.heap.lock();
                    heap.peek().map(|Reverse(e)| e.deadline_ms)
                };

                let sleep_duration = match next_sleep {
                    Some(deadline_ms) => {
                        let remaining = (deadline_ms - clock.unix_ms()).max(0);
                        Duration::from_millis(remaining as u64)
                    }
                    None => Duration::from_secs(3600),
                };

                tokio::select! {
                    _ = tokio::time::sleep(sleep_duration) => {}
                    woken = wake_rx.recv() => {
                        if woken.is_none() {
                            return;
                        }
                        continue;
                    }
                }

                let now_ms = clock.unix_ms();
                let mut fired = Vec::new();
                {
                    let mut heap = driver_shared.heap.lock();
                    while let Some(Reverse(entry)) = heap.peek() {
                        if entry.deadline_ms > now_ms {
                            break;
                        }
                        let Reverse(entry) = heap.pop().expect("peeked entry must pop");
                        fired.push(entry);
                    }
                }

                let routes = driver_shared.routes.lock();
                for entry in fired {
                    if let Some(route) = routes.get(&entry.agent_index) {
                        let _ = route.send(DeadlineFired {
                            command_id: entry.command_id,
                            generation: entry.generation,
                        });
                    }
                }
            }
        });

        Self { shared }
    }

    /// Registers an agent actor's route for fired deadlines. Must be called
    /// once before [`DeadlineWheel::register`] is used with this index.
    pub fn register_agent(&self, agent_index: usize) -> mpsc::UnboundedReceiver<DeadlineFired> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.shared.routes.lock().insert(agent_index, tx);
        rx
    }

    pub fn register(&self, agent_index: usize, command_id: CommandId, generation: u64, deadline_ms: i64) {
        self.shared.heap.lock().push(Reverse(Entry { deadline_ms, agent_index, command_id, generation }));
        let _ = self.shared.wake.send(());
    }
}

#[cfg(test)]
#[path = "deadline_tests.rs"]
mod tests;
