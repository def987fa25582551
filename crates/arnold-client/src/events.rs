//! Run event types
//!
//! `WireEvent` mirrors the SSE payloads sent by the endpoint. `RunEvent` is
//! what consumers see: deltas already folded into accumulated text, tool
//! calls already assembled.

use serde::{Deserialize, Serialize};

use crate::types::ToolCall;

/// Raw protocol events as they appear on the wire (one JSON object per SSE
/// `data:` line, tagged by `type`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WireEvent {
    #[serde(rename_all = "camelCase")]
    RunStarted {
        #[serde(default)]
        thread_id: Option<String>,
        #[serde(default)]
        run_id: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    TextMessageStart {
        #[serde(default)]
        message_id: Option<String>,
    },

    /// A text fragment. A missing delta means an empty fragment.
    #[serde(rename_all = "camelCase")]
    TextMessageContent {
        #[serde(default)]
        message_id: Option<String>,
        #[serde(default)]
        delta: String,
    },

    #[serde(rename_all = "camelCase")]
    TextMessageEnd {
        #[serde(default)]
        message_id: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    ToolCallStart {
        tool_call_id: String,
        tool_call_name: String,
    },

    #[serde(rename_all = "camelCase")]
    ToolCallArgs {
        tool_call_id: String,
        #[serde(default)]
        delta: String,
    },

    #[serde(rename_all = "camelCase")]
    ToolCallEnd { tool_call_id: String },

    #[serde(rename_all = "camelCase")]
    ToolCallResult {
        tool_call_id: String,
        #[serde(default)]
        content: String,
    },

    #[serde(rename_all = "camelCase")]
    RunFinished {
        #[serde(default)]
        thread_id: Option<String>,
        #[serde(default)]
        run_id: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    RunError {
        #[serde(default)]
        message: String,
    },
}

/// Events delivered to the run subscriber
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// The endpoint acknowledged the run
    RunStarted,

    /// The in-progress reply text, full text-so-far (not a delta)
    TextContent { buffer: String },

    /// A tool call started, progressed, or completed; carries the current
    /// snapshot, upsert by `call.id`
    ToolCallUpdate { call: ToolCall },

    /// The run completed successfully
    RunFinished,

    /// The run failed
    RunError { message: String },
}

impl RunEvent {
    /// Check if this event ends the run
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::RunFinished | RunEvent::RunError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_started() {
        let event: WireEvent =
            serde_json::from_str(r#"{"type":"RUN_STARTED","threadId":"t1","runId":"r1"}"#).unwrap();
        assert!(matches!(event, WireEvent::RunStarted { .. }));
    }

    #[test]
    fn parses_text_content_delta() {
        let event: WireEvent = serde_json::from_str(
            r#"{"type":"TEXT_MESSAGE_CONTENT","messageId":"m1","delta":"Hi"}"#,
        )
        .unwrap();
        match event {
            WireEvent::TextMessageContent { delta, .. } => assert_eq!(delta, "Hi"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn missing_delta_defaults_to_empty() {
        let event: WireEvent =
            serde_json::from_str(r#"{"type":"TEXT_MESSAGE_CONTENT","messageId":"m1"}"#).unwrap();
        match event {
            WireEvent::TextMessageContent { delta, .. } => assert_eq!(delta, ""),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn parses_tool_call_events() {
        let start: WireEvent = serde_json::from_str(
            r#"{"type":"TOOL_CALL_START","toolCallId":"tc1","toolCallName":"search"}"#,
        )
        .unwrap();
        match start {
            WireEvent::ToolCallStart { tool_call_name, .. } => {
                assert_eq!(tool_call_name, "search")
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let args: WireEvent = serde_json::from_str(
            r#"{"type":"TOOL_CALL_ARGS","toolCallId":"tc1","delta":"{\"q\":"}"#,
        )
        .unwrap();
        assert!(matches!(args, WireEvent::ToolCallArgs { .. }));
    }

    #[test]
    fn parses_run_error() {
        let event: WireEvent =
            serde_json::from_str(r#"{"type":"RUN_ERROR","message":"boom"}"#).unwrap();
        match event {
            WireEvent::RunError { message } => assert_eq!(message, "boom"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn run_error_without_message_defaults_empty() {
        let event: WireEvent = serde_json::from_str(r#"{"type":"RUN_ERROR"}"#).unwrap();
        match event {
            WireEvent::RunError { message } => assert_eq!(message, ""),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn unknown_event_type_fails_to_parse() {
        // The client skips these rather than failing the run.
        assert!(serde_json::from_str::<WireEvent>(r#"{"type":"STATE_SNAPSHOT"}"#).is_err());
    }

    #[test]
    fn terminal_events() {
        assert!(RunEvent::RunFinished.is_terminal());
        assert!(RunEvent::RunError { message: "x".into() }.is_terminal());
        assert!(!RunEvent::RunStarted.is_terminal());
        assert!(!RunEvent::TextContent { buffer: "x".into() }.is_terminal());
    }
}
