//! UI widgets

pub mod input_box;
pub mod message_list;
pub mod spinner;
pub mod tool_call;

pub use input_box::InputBox;
pub use message_list::{ChatMessage, MessageList, MessageRole};
pub use spinner::Spinner;
pub use tool_call::{ToolCallPanel, ToolCallView};
