//! Transcript message types

use arnold_client::ToolCall;
use serde::{Deserialize, Serialize};

/// Role of a transcript message.
///
/// `Tool` is declared for forward compatibility with tool-result messages;
/// the controller never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    /// Map to the agent protocol's role vocabulary
    pub fn to_wire(self) -> arnold_client::Role {
        match self {
            Role::User => arnold_client::Role::User,
            Role::Assistant => arnold_client::Role::Assistant,
            Role::Tool => arnold_client::Role::Tool,
        }
    }
}

/// One turn's content in the transcript.
///
/// Ids are assigned from a per-session monotonic counter and double as the
/// reconciliation key while a reply is streaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    /// Text body; empty while a placeholder awaits its first content event
    pub content: String,
    /// True while content is still being appended for this message
    pub streaming: bool,
    /// Tool calls attached to this message. Declared extension point; the
    /// controller leaves it empty.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    /// Create a user message
    pub fn user(id: u64, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            streaming: false,
            tool_calls: Vec::new(),
        }
    }

    /// Create a finalized assistant message
    pub fn assistant(id: u64, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: content.into(),
            streaming: false,
            tool_calls: Vec::new(),
        }
    }

    /// Create the empty streaming placeholder for a new turn
    pub fn placeholder(id: u64) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: String::new(),
            streaming: true,
            tool_calls: Vec::new(),
        }
    }
}
