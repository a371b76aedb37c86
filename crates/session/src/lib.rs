//! rcd-session: one actor per live agent WebSocket — authentication, the
//! keep-alive/liveness clock, frame routing, and session supersession.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod auth;
pub mod connection;
pub mod error;
pub mod registry;
pub mod sink;
pub mod state;

pub use auth::TokenIndex;
pub use connection::{accept, SessionConfig};
pub use error::SessionError;
pub use registry::SessionRegistry;
pub use sink::WsSink;
pub use state::CloseReason;
