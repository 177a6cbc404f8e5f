//! Notifications delivered through the run callbacks.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use super::result::RunErrorKind;

/// Payload for the text callbacks (`on_partial_reply`, `on_block_reply`, `on_tool_result`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPayload {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_urls: Option<Vec<String>>,
}

impl ReplyPayload {
    pub fn new(text: impl Into<String>, media_urls: Vec<String>) -> Self {
        Self {
            text: text.into(),
            media_urls: (!media_urls.is_empty()).then_some(media_urls),
        }
    }
}

/// Stream an [`AgentEvent`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentStream {
    Lifecycle,
    Assistant,
    Tool,
    Hook,
}

/// Diagnostic event for `on_agent_event`, serialized as `{stream, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stream", content = "data", rename_all = "snake_case")]
pub enum AgentEvent {
    Lifecycle(LifecycleEvent),
    Assistant(AssistantEvent),
    Tool(ToolNotification),
    Hook(HookNotification),
}

impl AgentEvent {
    pub fn stream(&self) -> AgentStream {
        match self {
            Self::Lifecycle(_) => AgentStream::Lifecycle,
            Self::Assistant(_) => AgentStream::Assistant,
            Self::Tool(_) => AgentStream::Tool,
            Self::Hook(_) => AgentStream::Hook,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum LifecycleEvent {
    Start {
        run_id: String,
    },
    End {
        run_id: String,
        payload_count: usize,
        did_send_via_messaging_tool: bool,
    },
    Error {
        run_id: String,
        kind: RunErrorKind,
        message: String,
    },
    Compaction {
        trigger: Option<String>,
        pre_tokens: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantEvent {
    /// Cumulative, sanitized text of the current turn.
    pub text: String,
    /// The chunk that produced this event.
    pub delta: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media_urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolPhase {
    Start,
    Result,
}

/// Which channel reported a tool event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolEventSource {
    Stream,
    Hook,
}

/// Normalized tool-lifecycle notification, identical for both sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolNotification {
    pub phase: ToolPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media_urls: Vec<String>,
    pub is_error: bool,
    pub source: ToolEventSource,
}

/// Raised for every Pre/PostToolUse hook invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookNotification {
    pub hook_event_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<String>,
}
