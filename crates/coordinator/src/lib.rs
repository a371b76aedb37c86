//! rcd-coordinator: the Dispatcher/API component — REST surface, agent
//! socket entry point, and the top-level wiring that turns `rcd-engine` and
//! `rcd-session` into one running service.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod routes;
pub mod startup;

pub use config::CoordinatorConfig;
pub use context::CoordinatorContext;
pub use error::ApiError;
pub use routes::build_router;
