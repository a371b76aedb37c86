//! rcd-validator: the admission & safety policy check.
//!
//! This crate is linked by both the coordinator and the agent runtime so
//! that "identical decision on both ends" is a property of the build graph,
//! not a promise kept by hand-syncing two implementations.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod policy;
pub mod rejection;
pub mod validate;

pub use policy::Policy;
pub use rejection::Rejection;
pub use validate::{clamp_timeout, validate, Accepted};
