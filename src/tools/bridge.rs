//! Tool-invocation state shared by the stream and hook paths.

use std::collections::HashMap;

use serde_json::Value;

use crate::text::extract_media;
use crate::types::{MessagingToolSend, ToolEventSource, ToolNotification, ToolPhase};

use super::messaging::detect_send;
use super::names::normalize_tool_name;

#[derive(Debug, Clone)]
struct Invocation {
    name: String,
    input: Option<Value>,
    finished: bool,
}

/// Normalizes tool events into [`ToolNotification`]s.
///
/// Invocations are keyed by SDK-assigned id, so the same invocation reported
/// by both the stream and a hook is announced once per phase.
#[derive(Debug, Clone, Default)]
pub struct ToolEventBridge {
    messaging_tools: Vec<String>,
    invocations: HashMap<String, Invocation>,
    sends: Vec<MessagingToolSend>,
}

impl ToolEventBridge {
    pub fn new(messaging_tools: Vec<String>) -> Self {
        Self {
            messaging_tools,
            ..Self::default()
        }
    }

    pub fn on_start(
        &mut self,
        id: Option<String>,
        name: Option<String>,
        input: Option<Value>,
        source: ToolEventSource,
    ) -> Option<ToolNotification> {
        let name = normalize_tool_name(name.as_deref());
        if let Some(id) = id.as_ref() {
            if self.invocations.contains_key(id) {
                tracing::debug!(tool_call_id = %id, %source, "tool start already announced");
                return None;
            }
            self.invocations.insert(
                id.clone(),
                Invocation {
                    name: name.clone(),
                    input: input.clone(),
                    finished: false,
                },
            );
        }
        Some(ToolNotification {
            phase: ToolPhase::Start,
            id,
            name,
            input,
            text: None,
            media_urls: Vec::new(),
            is_error: false,
            source,
        })
    }

    pub fn on_result(
        &mut self,
        id: Option<String>,
        name: Option<String>,
        input: Option<Value>,
        output: Option<String>,
        is_error: bool,
        source: ToolEventSource,
    ) -> Option<ToolNotification> {
        let reported_name = name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map(|name| normalize_tool_name(Some(name)));

        let (name, input) = match id.as_ref() {
            Some(id) => match self.invocations.get_mut(id) {
                Some(invocation) if invocation.finished => {
                    tracing::debug!(tool_call_id = %id, %source, "tool result already announced");
                    return None;
                }
                Some(invocation) => {
                    invocation.finished = true;
                    (
                        reported_name.unwrap_or_else(|| invocation.name.clone()),
                        input.or_else(|| invocation.input.clone()),
                    )
                }
                None => {
                    let name = reported_name.unwrap_or_else(|| normalize_tool_name(None));
                    self.invocations.insert(
                        id.clone(),
                        Invocation {
                            name: name.clone(),
                            input: input.clone(),
                            finished: true,
                        },
                    );
                    (name, input)
                }
            },
            None => (reported_name.unwrap_or_else(|| normalize_tool_name(None)), input),
        };

        if !is_error {
            let args = input.as_ref().unwrap_or(&Value::Null);
            if let Some(send) = detect_send(&name, args, &self.messaging_tools) {
                tracing::debug!(tool = %name, destination = %send.destination, "messaging tool send recorded");
                self.sends.push(send);
            }
        }

        let extraction = output.as_deref().map(extract_media).unwrap_or_default();
        let text = extraction.clean_text.trim();
        Some(ToolNotification {
            phase: ToolPhase::Result,
            id,
            name,
            input,
            text: (!text.is_empty()).then(|| text.to_string()),
            media_urls: extraction.media_urls,
            is_error,
            source,
        })
    }

    pub fn did_send_via_messaging_tool(&self) -> bool {
        !self.sends.is_empty()
    }

    pub fn messaging_sends(&self) -> &[MessagingToolSend] {
        &self.sends
    }

    pub fn messaging_sent_texts(&self) -> Vec<String> {
        self.sends
            .iter()
            .filter(|send| !send.text.is_empty())
            .map(|send| send.text.clone())
            .collect()
    }
}
