//! The run's [`ToolEventSink`]: shared by the stream loop and the SDK hooks.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::callbacks::RunCallbacks;
use crate::tools::{ToolEvent, ToolEventBridge, ToolEventSink};
use crate::types::{AgentEvent, MessagingToolSend, ReplyPayload, ToolNotification, ToolPhase};

pub(crate) struct ToolEventHub {
    bridge: Mutex<ToolEventBridge>,
    callbacks: RunCallbacks,
    should_emit_tool_output: bool,
}

impl ToolEventHub {
    pub fn new(messaging_tools: Vec<String>, callbacks: RunCallbacks, should_emit_tool_output: bool) -> Self {
        Self {
            bridge: Mutex::new(ToolEventBridge::new(messaging_tools)),
            callbacks,
            should_emit_tool_output,
        }
    }

    /// Apply one event and dispatch its notifications.
    ///
    /// The bridge lock covers only the state update; callbacks run after it is released.
    pub fn record(&self, event: ToolEvent) -> Option<ToolNotification> {
        let notification = match event {
            ToolEvent::Hook(hook) => {
                tracing::debug!(hook = %hook.hook_event_name, tool = ?hook.tool_name, "hook invoked");
                self.callbacks.agent_event(AgentEvent::Hook(hook));
                return None;
            }
            ToolEvent::Start {
                id,
                name,
                input,
                source,
            } => self.bridge().on_start(id, name, input, source),
            ToolEvent::Result {
                id,
                name,
                input,
                output,
                is_error,
                source,
            } => self
                .bridge()
                .on_result(id, name, input, output, is_error, source),
        }?;

        tracing::debug!(
            tool = %notification.name,
            phase = %notification.phase,
            source = %notification.source,
            "tool event"
        );
        self.callbacks
            .agent_event(AgentEvent::Tool(notification.clone()));
        if notification.phase == ToolPhase::Result && self.should_emit_tool_output {
            let text = notification.text.clone().unwrap_or_default();
            if !text.is_empty() || !notification.media_urls.is_empty() {
                self.callbacks
                    .tool_result(ReplyPayload::new(text, notification.media_urls.clone()));
            }
        }
        Some(notification)
    }

    pub fn messaging_sends(&self) -> Vec<MessagingToolSend> {
        self.bridge().messaging_sends().to_vec()
    }

    fn bridge(&self) -> MutexGuard<'_, ToolEventBridge> {
        self.bridge.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ToolEventSink for ToolEventHub {
    fn emit(&self, event: ToolEvent) {
        self.record(event);
    }
}
