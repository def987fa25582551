//! HTTP agent client
//!
//! Posts the conversation history to the endpoint and consumes the SSE
//! response as a stream of run events. One run at a time is the caller's
//! concern; the client itself is stateless across runs apart from the
//! outbound history.

use std::pin::Pin;

use async_stream::stream;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde::Serialize;
use tokio_stream::Stream;
use uuid::Uuid;

use crate::assembler::RunAssembler;
use crate::error::{Error, Result};
use crate::events::{RunEvent, WireEvent};
use crate::types::AgentMessage;

/// A stream of run events
pub type RunEventStream = Pin<Box<dyn Stream<Item = RunEvent> + Send>>;

/// Per-run configuration
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Run identifier; generated when not set
    pub run_id: Option<String>,
}

/// Request body for starting a run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunAgentInput {
    thread_id: String,
    run_id: String,
    messages: Vec<AgentMessage>,
}

/// Client for an SSE streaming agent endpoint
pub struct HttpAgent {
    client: reqwest::Client,
    url: String,
    headers: reqwest::header::HeaderMap,
    thread_id: String,
    messages: Vec<AgentMessage>,
}

impl HttpAgent {
    /// Create a client for the given endpoint URL
    pub fn new(url: impl Into<String>) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("accept", "text/event-stream".parse().expect("static header"));
        headers.insert("content-type", "application/json".parse().expect("static header"));

        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            headers,
            thread_id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
        }
    }

    /// Add an extra request header
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name: reqwest::header::HeaderName = name
            .parse()
            .map_err(|_| Error::InvalidHeader(name.to_string()))?;
        let value: reqwest::header::HeaderValue = value
            .parse()
            .map_err(|_| Error::InvalidHeader(name.to_string()))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Replace the outbound conversation history
    pub fn set_messages(&mut self, messages: Vec<AgentMessage>) {
        self.messages = messages;
    }

    /// The conversation history that will be sent on the next run
    pub fn messages(&self) -> &[AgentMessage] {
        &self.messages
    }

    /// Start a run with the current history, streaming events back.
    ///
    /// Returns `Err` when the request cannot be dispatched at all. Failures
    /// after the stream is established surface as a `RunError` event, so a
    /// started run always reaches a terminal event.
    pub async fn run(&self, config: &RunConfig) -> Result<RunEventStream> {
        let run_id = config
            .run_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let body = RunAgentInput {
            thread_id: self.thread_id.clone(),
            run_id: run_id.clone(),
            messages: self.messages.clone(),
        };

        tracing::debug!(
            url = %self.url,
            run_id = %run_id,
            history_len = self.messages.len(),
            "dispatching run"
        );

        let request = self
            .client
            .post(&self.url)
            .headers(self.headers.clone())
            .json(&body);

        let event_source = EventSource::new(request)
            .map_err(|e| Error::Sse(format!("failed to open event source: {}", e)))?;

        Ok(Box::pin(run_event_stream(event_source)))
    }
}

/// Translate the SSE stream into run events, closing after a terminal event
fn run_event_stream(mut source: EventSource) -> impl Stream<Item = RunEvent> {
    stream! {
        let mut assembler = RunAssembler::new();

        while let Some(sse) = source.next().await {
            match sse {
                Ok(Event::Open) => {
                    tracing::debug!("event source open");
                }
                Ok(Event::Message(msg)) => {
                    let wire: WireEvent = match serde_json::from_str(&msg.data) {
                        Ok(wire) => wire,
                        Err(e) => {
                            // Unknown or malformed event kinds are skipped.
                            tracing::debug!("skipping event: {} ({})", e, msg.data);
                            continue;
                        }
                    };

                    if let Some(event) = assembler.process(wire) {
                        let terminal = event.is_terminal();
                        yield event;
                        if terminal {
                            source.close();
                            return;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(e) => {
                    tracing::warn!("SSE stream failed: {}", e);
                    yield RunEvent::RunError { message: e.to_string() };
                    source.close();
                    return;
                }
            }
        }

        // Stream ended without a terminal event; never leave the run hanging.
        yield RunEvent::RunError {
            message: "stream ended before run finished".to_string(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn run_input_serializes_camel_case() {
        let input = RunAgentInput {
            thread_id: "t1".into(),
            run_id: "r1".into(),
            messages: vec![AgentMessage::user("1", "hi")],
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["threadId"], "t1");
        assert_eq!(json["runId"], "r1");
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn set_messages_replaces_history() {
        let mut agent = HttpAgent::new("http://localhost:8000/run");
        agent.set_messages(vec![AgentMessage::assistant("1", "hello")]);
        agent.set_messages(vec![
            AgentMessage::user("2", "hi"),
            AgentMessage::user("3", "again"),
        ]);
        assert_eq!(agent.messages().len(), 2);
        assert!(agent.messages().iter().all(|m| m.role == Role::User));
    }

    #[test]
    fn rejects_invalid_header() {
        let agent = HttpAgent::new("http://localhost:8000/run");
        assert!(agent.with_header("x-ok", "value\nbad").is_err());
    }
}
