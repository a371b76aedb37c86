//! The durable lifecycle store: every agent and command the coordinator
//! knows about, with the compare-and-set [`Store::transition`] that
//! guarantees a command is acted on exactly once.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod filter;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use error::StoreError;
pub use filter::{ListFilter, Statistics, StatsFilter, TransitionPatch};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::Store;
