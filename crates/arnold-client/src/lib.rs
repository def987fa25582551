//! arnold-client: streaming agent-protocol client
//!
//! Talks to a remote agent endpoint over HTTP + SSE. The caller sets the
//! outbound conversation history, starts a run, and consumes a stream of
//! run events. Text deltas are accumulated internally so every content
//! event carries the full text-so-far, not a fragment.

pub mod assembler;
pub mod client;
pub mod error;
pub mod events;
pub mod types;

pub use assembler::RunAssembler;
pub use client::{HttpAgent, RunConfig, RunEventStream};
pub use error::Error;
pub use events::{RunEvent, WireEvent};
pub use types::{AgentMessage, Role, ToolCall, ToolStatus};
