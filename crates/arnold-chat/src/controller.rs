//! The turn state machine.
//!
//! One turn: `submit` appends the user message and an empty streaming
//! placeholder and hands back the outbound history; the caller runs the
//! agent and feeds every event to `apply`. A terminal event (or
//! `dispatch_failed` when the run call itself rejects) finalizes the
//! placeholder and re-arms the controller.

use arnold_client::{AgentMessage, RunEvent};

use crate::message::{Message, Role};

/// Greeting seeded as the first assistant message
pub const DEFAULT_GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";

/// Shown in place of the reply when a run fails
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Streaming conversation controller.
///
/// Invariants: at most one message has `streaming == true`; a finalized
/// message is never mutated again; at most one run is in flight.
pub struct Controller {
    messages: Vec<Message>,
    in_flight: bool,
    /// Id of the placeholder receiving content events, while a run is live
    active_id: Option<u64>,
    /// Next id to hand out; ids are strictly increasing within a session
    next_id: u64,
}

impl Controller {
    /// Create a controller seeded with a greeting assistant message
    pub fn new(greeting: impl Into<String>) -> Self {
        let mut controller = Self {
            messages: Vec::new(),
            in_flight: false,
            active_id: None,
            next_id: 1,
        };
        let id = controller.take_id();
        controller.messages.push(Message::assistant(id, greeting));
        controller
    }

    /// The conversation, in display order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether a run is currently in flight
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Submit user input, starting a turn.
    ///
    /// Returns the history to send upstream, or `None` when the input is
    /// blank after trimming or a run is already in flight (silent no-op in
    /// both cases; nothing is queued).
    ///
    /// The history replays every prior user message plus the greeting, then
    /// the new user message. Intermediate assistant replies are not sent
    /// upstream.
    pub fn submit(&mut self, text: &str) -> Option<Vec<AgentMessage>> {
        let text = text.trim();
        if text.is_empty() || self.in_flight {
            return None;
        }

        let mut history = self.outbound_history();

        let user_id = self.take_id();
        self.messages.push(Message::user(user_id, text));

        let placeholder_id = self.take_id();
        self.messages.push(Message::placeholder(placeholder_id));

        self.in_flight = true;
        self.active_id = Some(placeholder_id);

        history.push(AgentMessage::user(user_id.to_string(), text));

        tracing::debug!(
            user_id,
            placeholder_id,
            history_len = history.len(),
            "turn started"
        );

        Some(history)
    }

    /// Apply a run event to the conversation
    pub fn apply(&mut self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted => {
                tracing::trace!("run started");
            }
            RunEvent::TextContent { buffer } => {
                let Some(message) = self.active_message() else {
                    tracing::debug!("content event with no active message, ignoring");
                    return;
                };
                // Last write wins; the buffer is the full text-so-far.
                message.content = buffer.clone();
            }
            RunEvent::ToolCallUpdate { call } => {
                // Inactive extension point: tool calls are not reconciled
                // into the transcript yet.
                tracing::trace!(tool = %call.name, "tool call update");
            }
            RunEvent::RunFinished => {
                self.finalize(None);
            }
            RunEvent::RunError { message } => {
                tracing::warn!("run error: {}", message);
                self.finalize(Some(ERROR_REPLY));
            }
        }
    }

    /// Record that the run invocation itself failed.
    ///
    /// Same outcome as a run-error event: the placeholder must never be
    /// left streaming.
    pub fn dispatch_failed(&mut self) {
        self.finalize(Some(ERROR_REPLY));
    }

    /// History replayed upstream: prior user messages plus the greeting
    fn outbound_history(&self) -> Vec<AgentMessage> {
        let greeting_id = self
            .messages
            .iter()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.id);

        self.messages
            .iter()
            .filter(|m| m.role == Role::User || Some(m.id) == greeting_id)
            .map(|m| AgentMessage {
                id: m.id.to_string(),
                role: m.role.to_wire(),
                content: m.content.clone(),
            })
            .collect()
    }

    fn finalize(&mut self, replace_content: Option<&str>) {
        if let Some(id) = self.active_id.take() {
            if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
                if message.streaming {
                    if let Some(content) = replace_content {
                        message.content = content.to_string();
                    }
                    message.streaming = false;
                }
            }
        }
        self.in_flight = false;
    }

    fn active_message(&mut self) -> Option<&mut Message> {
        let id = self.active_id?;
        self.messages
            .iter_mut()
            .find(|m| m.id == id && m.streaming)
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(buffer: &str) -> RunEvent {
        RunEvent::TextContent {
            buffer: buffer.to_string(),
        }
    }

    #[test]
    fn starts_with_greeting() {
        let controller = Controller::default();
        assert_eq!(controller.messages().len(), 1);
        let greeting = &controller.messages()[0];
        assert_eq!(greeting.role, Role::Assistant);
        assert_eq!(greeting.content, DEFAULT_GREETING);
        assert!(!greeting.streaming);
        assert!(!controller.in_flight());
    }

    #[test]
    fn submit_appends_user_and_placeholder() {
        let mut controller = Controller::default();
        let history = controller.submit("Hello");
        assert!(history.is_some());

        assert_eq!(controller.messages().len(), 3);
        let user = &controller.messages()[1];
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, "Hello");
        assert!(!user.streaming);

        let placeholder = &controller.messages()[2];
        assert_eq!(placeholder.role, Role::Assistant);
        assert_eq!(placeholder.content, "");
        assert!(placeholder.streaming);

        assert!(controller.in_flight());
    }

    #[test]
    fn content_then_finish_completes_turn() {
        let mut controller = Controller::default();
        controller.submit("Hello").unwrap();

        controller.apply(&content("Hi there!"));
        controller.apply(&RunEvent::RunFinished);

        let reply = controller.messages().last().unwrap();
        assert_eq!(reply.content, "Hi there!");
        assert!(!reply.streaming);
        assert!(!controller.in_flight());
    }

    #[test]
    fn error_before_any_content_shows_error_reply() {
        let mut controller = Controller::default();
        controller.submit("Hello").unwrap();

        controller.apply(&RunEvent::RunError {
            message: "connection reset".into(),
        });

        let reply = controller.messages().last().unwrap();
        assert_eq!(reply.content, ERROR_REPLY);
        assert!(!reply.streaming);
        assert!(!controller.in_flight());
    }

    #[test]
    fn submit_while_in_flight_is_a_no_op() {
        let mut controller = Controller::default();
        controller.submit("first").unwrap();
        let len = controller.messages().len();

        assert!(controller.submit("second").is_none());
        assert_eq!(controller.messages().len(), len);
        assert!(controller.in_flight());

        // Terminal event re-arms submission.
        controller.apply(&RunEvent::RunFinished);
        assert!(controller.submit("second").is_some());
    }

    #[test]
    fn blank_submit_is_a_no_op() {
        let mut controller = Controller::default();
        assert!(controller.submit("").is_none());
        assert!(controller.submit("   \n\t ").is_none());
        assert_eq!(controller.messages().len(), 1);
        assert!(!controller.in_flight());
    }

    #[test]
    fn submitted_text_is_trimmed() {
        let mut controller = Controller::default();
        let history = controller.submit("  hi  ").unwrap();
        assert_eq!(controller.messages()[1].content, "hi");
        assert_eq!(history.last().unwrap().content, "hi");
    }

    #[test]
    fn content_is_replaced_not_appended() {
        // The buffer is the full text-so-far, not a fragment to append.
        let mut controller = Controller::default();
        controller.submit("count").unwrap();

        controller.apply(&content("a"));
        controller.apply(&content("ab"));
        controller.apply(&content("abc"));

        assert_eq!(controller.messages().last().unwrap().content, "abc");
    }

    #[test]
    fn finalized_message_is_immutable() {
        // No event may touch a message once streaming is cleared.
        let mut controller = Controller::default();
        controller.submit("Hello").unwrap();
        controller.apply(&content("done"));
        controller.apply(&RunEvent::RunFinished);

        controller.apply(&content("late delivery"));
        controller.apply(&RunEvent::RunError {
            message: "late error".into(),
        });
        controller.apply(&RunEvent::RunFinished);

        let reply = controller.messages().last().unwrap();
        assert_eq!(reply.content, "done");
        assert!(!reply.streaming);
        assert!(!controller.in_flight());
    }

    #[test]
    fn dispatch_failure_matches_run_error() {
        // Both failure kinds produce identical final state.
        let mut a = Controller::default();
        a.submit("Hello").unwrap();
        a.apply(&RunEvent::RunError { message: "x".into() });

        let mut b = Controller::default();
        b.submit("Hello").unwrap();
        b.dispatch_failed();

        let reply_a = a.messages().last().unwrap();
        let reply_b = b.messages().last().unwrap();
        assert_eq!(reply_a.content, reply_b.content);
        assert_eq!(reply_a.content, ERROR_REPLY);
        assert_eq!(reply_a.streaming, reply_b.streaming);
        assert_eq!(a.in_flight(), b.in_flight());
        assert!(!a.in_flight());
    }

    #[test]
    fn history_replays_users_and_greeting_only() {
        // Assistant replies after the greeting are not replayed upstream.
        let mut controller = Controller::default();

        controller.submit("hi").unwrap();
        controller.apply(&content("hello"));
        controller.apply(&RunEvent::RunFinished);

        controller.submit("bye").unwrap();
        controller.apply(&content("see you"));
        controller.apply(&RunEvent::RunFinished);

        let history = controller.submit("ok").unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec![DEFAULT_GREETING, "hi", "bye", "ok"]);

        let roles: Vec<arnold_client::Role> = history.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                arnold_client::Role::Assistant,
                arnold_client::Role::User,
                arnold_client::Role::User,
                arnold_client::Role::User,
            ]
        );
    }

    #[test]
    fn history_excludes_current_placeholder() {
        let mut controller = Controller::default();
        let history = controller.submit("first").unwrap();
        // Greeting plus the new user message; no empty assistant entry.
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|m| !m.content.is_empty()));
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let mut controller = Controller::default();
        controller.submit("one").unwrap();
        controller.apply(&RunEvent::RunFinished);
        controller.submit("two").unwrap();

        let ids: Vec<u64> = controller.messages().iter().map(|m| m.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn at_most_one_streaming_message() {
        let mut controller = Controller::default();
        controller.submit("one").unwrap();
        controller.apply(&content("x"));

        let streaming = controller
            .messages()
            .iter()
            .filter(|m| m.streaming)
            .count();
        assert_eq!(streaming, 1);

        controller.apply(&RunEvent::RunFinished);
        assert!(controller.messages().iter().all(|m| !m.streaming));
    }

    #[test]
    fn content_with_no_active_message_is_ignored() {
        let mut controller = Controller::default();
        controller.apply(&content("stray"));
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].content, DEFAULT_GREETING);
    }

    #[test]
    fn tool_call_events_do_not_touch_the_transcript() {
        let mut controller = Controller::default();
        controller.submit("Hello").unwrap();
        let before = controller.messages().to_vec();

        controller.apply(&RunEvent::ToolCallUpdate {
            call: arnold_client::ToolCall::started("tc1", "search"),
        });

        assert_eq!(controller.messages().len(), before.len());
        assert!(controller
            .messages()
            .iter()
            .all(|m| m.tool_calls.is_empty()));
    }

    #[test]
    fn run_started_changes_nothing() {
        let mut controller = Controller::default();
        controller.submit("Hello").unwrap();
        controller.apply(&RunEvent::RunStarted);

        assert!(controller.in_flight());
        assert_eq!(controller.messages().last().unwrap().content, "");
    }

    #[test]
    fn empty_buffer_content_is_valid() {
        let mut controller = Controller::default();
        controller.submit("Hello").unwrap();
        controller.apply(&content("text"));
        controller.apply(&content(""));
        assert_eq!(controller.messages().last().unwrap().content, "");
    }
}
