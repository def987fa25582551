//! TUI implementation for arnold
//!
//! Single-task event loop: terminal input, run events, and animation ticks
//! are multiplexed with `select!`, and all conversation state lives in the
//! controller. The presentation layer owns only scroll position, the input
//! buffer, and which tool panels are expanded.

use std::io;
use std::time::{Duration, Instant};

use arnold_chat::{Controller, ERROR_REPLY, Message, Role};
use arnold_client::{HttpAgent, RunConfig, RunEvent, ToolCall, ToolStatus};
use arnold_tui::{
    Theme,
    input::{Action, event_to_action},
    widgets::{
        ChatMessage, InputBox, MessageList, MessageRole, Spinner, ToolCallView,
        message_list::calculate_message_height,
    },
};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

/// Commands the input handler can hand back to the event loop
enum UiCommand {
    /// User submitted input
    Submit(String),
    /// User requested quit
    Quit,
}

/// TUI presentation state
struct TuiState {
    /// Input box
    input: InputBox,
    /// Current scroll position
    scroll: usize,
    /// Whether tool-call panels are expanded
    tools_expanded: bool,
    /// Current status message
    status: String,
    /// Theme
    theme: Theme,
    /// Spinner start time for animation
    spinner_start: Instant,
    /// Tool calls reported during the current run, in start order
    tool_calls: Vec<ToolCallView>,
}

impl TuiState {
    fn new(theme: Theme) -> Self {
        let mut input = InputBox::new().with_placeholder("Type your message...");
        input.set_focused(true);

        Self {
            input,
            scroll: 0,
            tools_expanded: false,
            status: "Ready".to_string(),
            theme,
            spinner_start: Instant::now(),
            tool_calls: Vec::new(),
        }
    }

    fn begin_turn(&mut self) {
        self.tool_calls.clear();
        self.spinner_start = Instant::now();
        self.status = "Thinking...".to_string();
        self.scroll_to_bottom();
    }

    fn end_turn(&mut self) {
        self.status = "Ready".to_string();
        self.scroll_to_bottom();
    }

    fn scroll_to_bottom(&mut self) {
        // Resolved to the real offset during render.
        self.scroll = usize::MAX;
    }

    /// Upsert a tool-call snapshot by id
    fn record_tool_call(&mut self, call: &ToolCall) {
        let view = ToolCallView {
            id: call.id.clone(),
            name: call.name.clone(),
            args: call.args.clone(),
            result: call.result.clone(),
            complete: call.status == ToolStatus::Complete,
        };
        match self.tool_calls.iter_mut().find(|t| t.id == call.id) {
            Some(existing) => *existing = view,
            None => self.tool_calls.push(view),
        }
    }

    /// Handle a keyboard action; `in_flight` selects the restricted keymap
    fn handle_action(&mut self, action: Action, width: u16, in_flight: bool) -> Option<UiCommand> {
        match action {
            Action::Submit => {
                // A second submit while a run is live is a silent no-op;
                // the typed text stays in the input box.
                if in_flight {
                    return None;
                }
                let content = self.input.content().trim().to_string();
                if content.is_empty() {
                    return None;
                }
                self.input.clear();
                self.scroll_to_bottom();
                Some(UiCommand::Submit(content))
            }
            Action::Quit | Action::Interrupt => Some(UiCommand::Quit),
            Action::Escape => {
                if in_flight {
                    None
                } else {
                    Some(UiCommand::Quit)
                }
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                None
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                None
            }
            Action::ToggleTools => {
                self.tools_expanded = !self.tools_expanded;
                None
            }
            other => {
                self.input.handle_action(&other, width);
                None
            }
        }
    }

    /// Build the view records for the transcript
    fn view_messages(&self, controller: &Controller) -> Vec<ChatMessage> {
        let mut views: Vec<ChatMessage> = controller.messages().iter().map(to_view).collect();

        // Tool calls from the current run display under the latest reply.
        if !self.tool_calls.is_empty() {
            if let Some(reply) = views
                .iter_mut()
                .rev()
                .find(|m| m.role == MessageRole::Assistant)
            {
                reply.tool_calls = self.tool_calls.clone();
            }
        }

        views
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame, controller: &Controller) {
        let size = frame.area();

        // Layout: messages (flex), status bar (1), input (3)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(size);

        self.render_messages(frame, chunks[0], controller);
        self.render_status(frame, chunks[1], controller);
        self.input
            .render(chunks[2], frame.buffer_mut(), &self.theme);
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect, controller: &Controller) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(" arnold ");

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let views = self.view_messages(controller);

        let content_height = calculate_message_height(
            &views,
            &self.theme,
            inner.width as usize,
            self.tools_expanded,
        );

        if self.scroll == usize::MAX {
            self.scroll = content_height.saturating_sub(inner.height as usize);
        } else {
            self.scroll = self
                .scroll
                .min(content_height.saturating_sub(inner.height as usize));
        }

        let list = MessageList::new(&views, &self.theme)
            .scroll(self.scroll)
            .tools_expanded(self.tools_expanded);
        frame.render_widget(list, inner);

        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);

            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, controller: &Controller) {
        if controller.in_flight() {
            let spinner =
                Spinner::new(&self.status, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let left_content = self.status.as_str();
        let right_content = "Ctrl+T: tools │ PgUp/Dn: scroll │ Ctrl+C: quit";

        let left_width = left_content.chars().count();
        let right_width = right_content.chars().count();
        let available = area.width as usize;

        let line = if left_width + right_width + 2 <= available {
            let spacing = available - left_width - right_width;
            Line::from(vec![
                Span::styled(left_content.to_string(), self.theme.dim_style()),
                Span::raw(" ".repeat(spacing)),
                Span::styled(right_content, Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::from(Span::styled(left_content.to_string(), self.theme.dim_style()))
        };

        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Map a transcript message to its view record
fn to_view(msg: &Message) -> ChatMessage {
    let role = match msg.role {
        Role::User => MessageRole::User,
        Role::Assistant => MessageRole::Assistant,
        Role::Tool => MessageRole::Tool,
    };
    let is_error = msg.role == Role::Assistant && !msg.streaming && msg.content == ERROR_REPLY;

    ChatMessage {
        role,
        content: msg.content.clone(),
        is_error,
        is_streaming: msg.streaming,
        tool_calls: msg
            .tool_calls
            .iter()
            .map(|call| ToolCallView {
                id: call.id.clone(),
                name: call.name.clone(),
                args: call.args.clone(),
                result: call.result.clone(),
                complete: call.status == ToolStatus::Complete,
            })
            .collect(),
    }
}

/// Run the TUI application
pub async fn run_tui(
    controller: &mut Controller,
    agent: &mut HttpAgent,
    theme: Theme,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, controller, agent, theme).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut Controller,
    agent: &mut HttpAgent,
    theme: Theme,
) -> anyhow::Result<()> {
    let mut state = TuiState::new(theme);
    let mut event_stream = EventStream::new();

    // Tick interval for animations (80ms for smooth spinner)
    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));

    // Submitted input is picked up at the top of the next iteration.
    let mut pending_prompt: Option<String> = None;

    loop {
        if let Some(content) = pending_prompt.take() {
            let Some(history) = controller.submit(&content) else {
                continue;
            };
            state.begin_turn();
            agent.set_messages(history);

            match agent.run(&RunConfig::default()).await {
                Err(e) => {
                    tracing::warn!("failed to dispatch run: {}", e);
                    controller.dispatch_failed();
                }
                Ok(mut events) => {
                    // Drive the run to its terminal event. Input stays live,
                    // but submits are rejected until the turn ends.
                    loop {
                        terminal.draw(|frame| state.render(frame, controller))?;
                        let width = terminal.size()?.width;

                        tokio::select! {
                            biased;

                            event = events.next() => {
                                match event {
                                    Some(event) => {
                                        if let RunEvent::ToolCallUpdate { call } = &event {
                                            state.record_tool_call(call);
                                        }
                                        if matches!(event, RunEvent::TextContent { .. }) {
                                            state.scroll_to_bottom();
                                        }
                                        let is_terminal = event.is_terminal();
                                        controller.apply(&event);
                                        if is_terminal {
                                            break;
                                        }
                                    }
                                    None => {
                                        // Stream closed without a terminal event.
                                        controller.dispatch_failed();
                                        break;
                                    }
                                }
                            }

                            event = event_stream.next() => {
                                if let Some(UiCommand::Quit) =
                                    handle_terminal_event(&mut state, event, width, true)?
                                {
                                    return Ok(());
                                }
                            }

                            _ = tick_interval.tick() => {}
                        }
                    }
                }
            }

            state.end_turn();
            terminal.draw(|frame| state.render(frame, controller))?;
            continue;
        }

        terminal.draw(|frame| state.render(frame, controller))?;
        let width = terminal.size()?.width;

        tokio::select! {
            event = event_stream.next() => {
                match handle_terminal_event(&mut state, event, width, false)? {
                    Some(UiCommand::Quit) => return Ok(()),
                    Some(UiCommand::Submit(text)) => pending_prompt = Some(text),
                    None => {}
                }
            }

            _ = tick_interval.tick() => {}
        }
    }
}

fn handle_terminal_event(
    state: &mut TuiState,
    event: Option<io::Result<Event>>,
    width: u16,
    in_flight: bool,
) -> anyhow::Result<Option<UiCommand>> {
    match event {
        Some(Ok(event)) => Ok(event_to_action(event)
            .and_then(|action| state.handle_action(action, width, in_flight))),
        Some(Err(e)) => Err(anyhow::anyhow!("event error: {}", e)),
        None => Ok(Some(UiCommand::Quit)),
    }
}
