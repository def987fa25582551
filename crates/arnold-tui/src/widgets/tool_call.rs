//! Collapsible tool-call panel
//!
//! Shows a one-line header with the tool name and a running/complete
//! indicator. When expanded, the raw argument and result text are shown
//! beneath it.

use crate::theme::Theme;
use ratatui::text::{Line, Span};
use textwrap;

/// Display record for one tool invocation
#[derive(Debug, Clone)]
pub struct ToolCallView {
    pub id: String,
    pub name: String,
    /// Raw argument text as streamed by the agent
    pub args: String,
    pub result: Option<String>,
    pub complete: bool,
}

/// Renders a tool call as a block of lines
pub struct ToolCallPanel<'a> {
    call: &'a ToolCallView,
    expanded: bool,
    theme: &'a Theme,
}

impl<'a> ToolCallPanel<'a> {
    /// Create a panel for a tool call
    pub fn new(call: &'a ToolCallView, expanded: bool, theme: &'a Theme) -> Self {
        Self {
            call,
            expanded,
            theme,
        }
    }

    /// Produce the panel's lines at the given width
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let indicator = if self.call.complete { "✓" } else { "⋯" };
        let chevron = if self.expanded { "▾" } else { "▸" };
        let header = format!("⚙ {} {} {}", self.call.name, indicator, chevron);

        let header_style = if self.call.complete {
            self.theme.tool_style()
        } else {
            self.theme.accent_style()
        };
        lines.push(Line::from(Span::styled(header, header_style)));

        if !self.expanded {
            return lines;
        }

        let body_width = width.saturating_sub(4);

        if !self.call.args.is_empty() {
            lines.push(Line::from(Span::styled(
                "  Input:".to_string(),
                self.theme.dim_style(),
            )));
            for wrapped in textwrap::wrap(&self.call.args, body_width) {
                lines.push(Line::from(Span::styled(
                    format!("    {}", wrapped),
                    self.theme.base_style(),
                )));
            }
        }

        if let Some(result) = &self.call.result {
            lines.push(Line::from(Span::styled(
                "  Output:".to_string(),
                self.theme.dim_style(),
            )));
            for wrapped in textwrap::wrap(result, body_width) {
                lines.push(Line::from(Span::styled(
                    format!("    {}", wrapped),
                    self.theme.base_style(),
                )));
            }
        }

        lines
    }
}
