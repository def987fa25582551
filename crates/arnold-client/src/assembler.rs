//! Folds wire events into subscriber-facing run events.
//!
//! The endpoint streams text as deltas; subscribers want the full
//! accumulated text on every update. The assembler keeps the running text
//! buffer and the in-flight tool calls, and maps each wire event to at most
//! one `RunEvent`.

use crate::events::{RunEvent, WireEvent};
use crate::types::{ToolCall, ToolStatus};

/// Stateful wire-event to run-event translator for a single run
#[derive(Debug, Default)]
pub struct RunAssembler {
    /// Accumulated text of the current reply
    buffer: String,
    /// Tool calls seen this run, in start order
    tool_calls: Vec<ToolCall>,
}

impl RunAssembler {
    /// Create an assembler for a new run
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated reply text so far
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Process one wire event, returning the run event to deliver (if any)
    pub fn process(&mut self, event: WireEvent) -> Option<RunEvent> {
        match event {
            WireEvent::RunStarted { .. } => Some(RunEvent::RunStarted),

            WireEvent::TextMessageStart { .. } => {
                // A fresh reply message; discard any previous buffer.
                self.buffer.clear();
                None
            }

            WireEvent::TextMessageContent { delta, .. } => {
                self.buffer.push_str(&delta);
                Some(RunEvent::TextContent {
                    buffer: self.buffer.clone(),
                })
            }

            WireEvent::TextMessageEnd { .. } => None,

            WireEvent::ToolCallStart {
                tool_call_id,
                tool_call_name,
            } => {
                let call = ToolCall::started(tool_call_id, tool_call_name);
                self.tool_calls.push(call.clone());
                Some(RunEvent::ToolCallUpdate { call })
            }

            WireEvent::ToolCallArgs { tool_call_id, delta } => {
                let call = self.find_call(&tool_call_id)?;
                call.args.push_str(&delta);
                Some(RunEvent::ToolCallUpdate { call: call.clone() })
            }

            WireEvent::ToolCallEnd { tool_call_id } => {
                let call = self.find_call(&tool_call_id)?;
                call.status = ToolStatus::Complete;
                Some(RunEvent::ToolCallUpdate { call: call.clone() })
            }

            WireEvent::ToolCallResult {
                tool_call_id,
                content,
            } => {
                let call = self.find_call(&tool_call_id)?;
                call.result = Some(content);
                call.status = ToolStatus::Complete;
                Some(RunEvent::ToolCallUpdate { call: call.clone() })
            }

            WireEvent::RunFinished { .. } => Some(RunEvent::RunFinished),

            WireEvent::RunError { message } => Some(RunEvent::RunError { message }),
        }
    }

    fn find_call(&mut self, id: &str) -> Option<&mut ToolCall> {
        let call = self.tool_calls.iter_mut().find(|c| c.id == id);
        if call.is_none() {
            tracing::debug!("event for unknown tool call {}, ignoring", id);
        }
        call
    }
}
