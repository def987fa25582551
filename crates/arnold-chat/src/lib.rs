//! arnold-chat: streaming conversation controller
//!
//! Owns the ordered message list and reconciles streaming run events into
//! the in-progress assistant reply. Pure state machine, no I/O: the caller
//! dispatches the returned history to an agent client and feeds the
//! resulting events back in.

pub mod controller;
pub mod message;

pub use controller::{Controller, DEFAULT_GREETING, ERROR_REPLY};
pub use message::{Message, Role};
