//! Wire-level message and tool-call types

use serde::{Deserialize, Serialize};

/// Role of a message as understood by the agent endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// A single message in the outbound conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    /// Message identifier, unique within the conversation
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl AgentMessage {
    /// Create a user message
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Status of a tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Running,
    Complete,
}

/// A tool invocation reported by the agent during a run.
///
/// `args` is the raw argument text as streamed by the endpoint; it is not
/// parsed here. `result` is present once the endpoint reports one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: String,
    pub result: Option<String>,
    pub status: ToolStatus,
}

impl ToolCall {
    /// A freshly started tool call with no arguments yet
    pub fn started(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args: String::new(),
            result: None,
            status: ToolStatus::Running,
        }
    }
}
