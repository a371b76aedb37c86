//! rcd-core: shared domain types for the remote command dispatch fabric.
//!
//! Everything here is pure data plus the lifecycle rules that both the
//! coordinator and the agent runtime need to agree on — no I/O.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod macros;

pub mod agent;
pub mod clock;
pub mod command;
pub mod id;

pub use agent::{Agent, AgentId, AgentStatus};
pub use clock::{Clock, FakeClock, SystemClock};
pub use command::{Command, CommandId, CommandStatus};
pub use id::IdBuf;
