//! Message list widget for the chat transcript

use crate::theme::Theme;
use crate::widgets::tool_call::{ToolCallPanel, ToolCallView};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use textwrap;

/// Role of a displayed message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

/// A single message as displayed in the transcript
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    /// Whether the content is an error fallback
    pub is_error: bool,
    /// Whether this message is still receiving content
    pub is_streaming: bool,
    pub tool_calls: Vec<ToolCallView>,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            is_error: false,
            is_streaming: false,
            tool_calls: Vec::new(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            is_error: false,
            is_streaming: false,
            tool_calls: Vec::new(),
        }
    }
}

/// Widget for displaying the transcript
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    theme: &'a Theme,
    scroll: usize,
    tools_expanded: bool,
}

impl<'a> MessageList<'a> {
    /// Create a new message list
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            scroll: 0,
            tools_expanded: false,
        }
    }

    /// Set scroll offset
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Expand tool-call panels
    pub fn tools_expanded(mut self, expanded: bool) -> Self {
        self.tools_expanded = expanded;
        self
    }

    fn render_message(&self, msg: &ChatMessage, width: usize) -> Vec<Line<'static>> {
        message_lines(msg, self.theme, width, self.tools_expanded)
    }
}

/// Produce the lines for one message at the given width
pub fn message_lines(
    msg: &ChatMessage,
    theme: &Theme,
    width: usize,
    tools_expanded: bool,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (role_text, role_style, prefix) = match msg.role {
        MessageRole::User => ("You", theme.accent_bold(), "▶ "),
        MessageRole::Assistant => (
            "Assistant",
            theme.success_style().add_modifier(Modifier::BOLD),
            "◀ ",
        ),
        MessageRole::Tool => ("Tool", theme.tool_style(), "⚙ "),
    };

    // The block cursor marks a reply still in progress.
    let header = if msg.is_streaming {
        format!("{}{} ▌", prefix, role_text)
    } else {
        format!("{}{}", prefix, role_text)
    };
    lines.push(Line::from(Span::styled(header, role_style)));

    let content_width = width.saturating_sub(2);

    if msg.content.is_empty() && msg.is_streaming {
        // Placeholder ellipsis until the first content event lands.
        lines.push(Line::from(Span::styled("  …".to_string(), theme.dim_style())));
    } else {
        let content_style = if msg.is_error {
            theme.error_style()
        } else {
            theme.base_style()
        };
        for wrapped in textwrap::wrap(&msg.content, content_width) {
            lines.push(Line::from(Span::styled(
                format!("  {}", wrapped),
                content_style,
            )));
        }
    }

    for call in &msg.tool_calls {
        let panel = ToolCallPanel::new(call, tools_expanded, theme);
        for line in panel.lines(content_width) {
            let mut spans = vec![Span::raw("  ")];
            spans.extend(line.spans);
            lines.push(Line::from(spans));
        }
    }

    // Empty line between messages
    lines.push(Line::from(""));

    lines
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let mut all_lines: Vec<Line> = Vec::new();
        for msg in self.messages {
            all_lines.extend(self.render_message(msg, width));
        }

        let visible_lines: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        let paragraph = Paragraph::new(visible_lines).wrap(Wrap { trim: false });
        paragraph.render(area, buf);
    }
}

/// Total rendered height of the transcript at the given width
pub fn calculate_message_height(
    messages: &[ChatMessage],
    theme: &Theme,
    width: usize,
    tools_expanded: bool,
) -> usize {
    messages
        .iter()
        .map(|msg| message_lines(msg, theme, width, tools_expanded).len())
        .sum()
}
