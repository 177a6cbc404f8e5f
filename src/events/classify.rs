//! Event classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use super::raw::{text_content, RawEvent};

/// Semantic category of an SDK event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventCategory {
    AssistantText,
    Thinking,
    ToolUse,
    ToolResult,
    MessageBoundary,
    TerminalResult,
    SystemLifecycle,
    CompactionBoundary,
    /// Raised by Pre/PostToolUse hook callbacks; never produced by [`classify`].
    HookEvent,
}

/// Closed view over a [`RawEvent`], holding only what each category needs.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkEvent {
    AssistantText {
        text: String,
    },
    Thinking {
        text: Option<String>,
    },
    MessageStart {
        role: Option<String>,
    },
    ToolUse {
        id: Option<String>,
        name: Option<String>,
        input: Value,
    },
    ToolResult {
        id: Option<String>,
        name: Option<String>,
        input: Value,
        output: Option<String>,
        is_error: bool,
    },
    CompactBoundary {
        trigger: Option<String>,
        pre_tokens: Option<u64>,
    },
    Result {
        subtype: Option<String>,
        result: Option<String>,
        is_error: bool,
    },
    /// Anything unrecognized. Diagnostic only.
    Lifecycle {
        event_type: Option<String>,
        subtype: Option<String>,
    },
}

const TOOL_ID_KEYS: &[&str] = &["id", "tool_use_id", "toolCallId"];

impl SdkEvent {
    /// Parse a raw event. Total: unknown shapes become [`SdkEvent::Lifecycle`].
    pub fn parse(raw: &RawEvent) -> Self {
        match raw.event_type() {
            Some("thinking" | "thinking_delta") => Self::Thinking {
                text: raw
                    .str_field("text")
                    .or_else(|| raw.str_field("delta"))
                    .or_else(|| raw.str_field("thinking"))
                    .map(str::to_string),
            },
            Some("message_start") => Self::MessageStart {
                role: raw
                    .field("message")
                    .and_then(|message| message.get("role"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            Some("tool_use" | "tool_execution_start") => Self::ToolUse {
                id: raw.id_field(TOOL_ID_KEYS),
                name: tool_name(raw),
                input: tool_input(raw),
            },
            Some("tool_result") => Self::ToolResult {
                id: raw.id_field(TOOL_ID_KEYS),
                name: tool_name(raw),
                input: tool_input(raw),
                output: text_content(raw.as_value()),
                is_error: raw
                    .bool_field("is_error")
                    .or_else(|| raw.bool_field("isError"))
                    .unwrap_or(false),
            },
            Some("system") if raw.subtype() == Some("compact_boundary") => {
                let metadata = raw.field("compact_metadata");
                Self::CompactBoundary {
                    trigger: metadata
                        .and_then(|m| m.get("trigger"))
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    pre_tokens: metadata
                        .and_then(|m| m.get("pre_tokens"))
                        .and_then(Value::as_u64),
                }
            }
            Some("result") => Self::Result {
                subtype: raw.subtype().map(str::to_string),
                result: raw.str_field("result").map(str::to_string),
                is_error: raw.bool_field("is_error").unwrap_or(false),
            },
            // Any other `type` marks an SDK envelope (`assistant`, `stream_event`,
            // ...) whose `text` is not a reply chunk, so only untyped and
            // text-typed events count as assistant text.
            None | Some("text" | "text_delta") => match chunk_text(raw) {
                Some(text) => Self::AssistantText {
                    text: text.to_string(),
                },
                None => Self::lifecycle(raw),
            },
            Some(_) => Self::lifecycle(raw),
        }
    }

    fn lifecycle(raw: &RawEvent) -> Self {
        Self::Lifecycle {
            event_type: raw.event_type().map(str::to_string),
            subtype: raw.subtype().map(str::to_string),
        }
    }

    pub fn category(&self) -> EventCategory {
        match self {
            Self::AssistantText { .. } => EventCategory::AssistantText,
            Self::Thinking { .. } => EventCategory::Thinking,
            Self::MessageStart { .. } => EventCategory::MessageBoundary,
            Self::ToolUse { .. } => EventCategory::ToolUse,
            Self::ToolResult { .. } => EventCategory::ToolResult,
            Self::CompactBoundary { .. } => EventCategory::CompactionBoundary,
            Self::Result { .. } => EventCategory::TerminalResult,
            Self::Lifecycle { .. } => EventCategory::SystemLifecycle,
        }
    }
}

/// Classify one raw event.
pub fn classify(raw: &RawEvent) -> EventCategory {
    SdkEvent::parse(raw).category()
}

fn chunk_text(raw: &RawEvent) -> Option<&str> {
    raw.str_field("text")
        .or_else(|| raw.str_field("delta"))
        .filter(|text| !text.is_empty())
}

fn tool_name(raw: &RawEvent) -> Option<String> {
    raw.str_field("name")
        .or_else(|| raw.str_field("tool_name"))
        .or_else(|| raw.str_field("toolName"))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn tool_input(raw: &RawEvent) -> Value {
    raw.field("input")
        .or_else(|| raw.field("args"))
        .cloned()
        .unwrap_or(Value::Null)
}
