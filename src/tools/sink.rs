//! The common tool-event interface and the direct-stream adapter.

use serde_json::Value;

use crate::events::SdkEvent;
use crate::types::{HookNotification, ToolEventSource};

/// A tool-lifecycle observation from either source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEvent {
    Start {
        id: Option<String>,
        name: Option<String>,
        input: Option<Value>,
        source: ToolEventSource,
    },
    Result {
        id: Option<String>,
        name: Option<String>,
        input: Option<Value>,
        output: Option<String>,
        is_error: bool,
        source: ToolEventSource,
    },
    /// A hook callback fired. Raised before the matching start/result.
    Hook(HookNotification),
}

/// Receives tool events from both the stream and the hook callbacks.
pub trait ToolEventSink: Send + Sync {
    fn emit(&self, event: ToolEvent);
}

/// Adapt a parsed stream event. Non-tool events yield `None`.
pub fn stream_tool_event(event: &SdkEvent) -> Option<ToolEvent> {
    match event {
        SdkEvent::ToolUse { id, name, input } => Some(ToolEvent::Start {
            id: id.clone(),
            name: name.clone(),
            input: non_null(input),
            source: ToolEventSource::Stream,
        }),
        SdkEvent::ToolResult {
            id,
            name,
            input,
            output,
            is_error,
        } => Some(ToolEvent::Result {
            id: id.clone(),
            name: name.clone(),
            input: non_null(input),
            output: output.clone(),
            is_error: *is_error,
            source: ToolEventSource::Stream,
        }),
        _ => None,
    }
}

fn non_null(value: &Value) -> Option<Value> {
    (!value.is_null()).then(|| value.clone())
}
