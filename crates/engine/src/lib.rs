//! The queue engine: per-agent ordered command queues bound to sessions,
//! backed by the durable store, timed by one shared deadline wheel.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod deadline;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod registry;
pub mod sink;
pub mod waiter;

pub use error::EngineError;
pub use metrics::{EngineMetrics, EngineMetricsSnapshot};
pub use queue::{AgentQueueConfig, AgentQueueHandle, QueueSummary};
pub use registry::QueueEngine;
pub use sink::{DispatchOutcome, SendError, SessionSink};
