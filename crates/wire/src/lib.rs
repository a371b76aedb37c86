//! rcd-wire: the closed frame protocol spoken over an agent's WebSocket,
//! plus the JSON DTOs spoken over the REST surface.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod api;
pub mod frame;

pub use frame::{decode, encode, DecodeError, Frame, Outcome};
