//! Hook-callback adapter: turns Pre/PostToolUse hooks into [`ToolEvent`]s.

use std::sync::Arc;

use serde_json::Value;

use crate::events::text_content;
use crate::sdk::{hook_callback, HookEventName, HookInput, HookOutput, SdkHooks};
use crate::types::{HookNotification, ToolEventSource};

use super::sink::{ToolEvent, ToolEventSink};

/// Build the hook set handed to the SDK. Every callback reports to `sink`
/// and lets the SDK continue.
pub fn tool_hooks(sink: Arc<dyn ToolEventSink>) -> SdkHooks {
    let pre_sink = sink.clone();
    let pre = hook_callback(move |input: HookInput, tool_use_id: Option<String>| {
        on_pre_tool_use(pre_sink.as_ref(), input, tool_use_id);
        async { Ok(HookOutput::default()) }
    });
    let post = hook_callback(move |input: HookInput, tool_use_id: Option<String>| {
        on_post_tool_use(sink.as_ref(), input, tool_use_id);
        async { Ok(HookOutput::default()) }
    });
    SdkHooks {
        pre_tool_use: vec![pre],
        post_tool_use: vec![post],
    }
}

fn on_pre_tool_use(sink: &dyn ToolEventSink, input: HookInput, tool_use_id: Option<String>) {
    sink.emit(hook_notification(HookEventName::PreToolUse, &input, &tool_use_id));
    sink.emit(ToolEvent::Start {
        id: tool_use_id,
        name: input.tool_name,
        input: input.tool_input,
        source: ToolEventSource::Hook,
    });
}

fn on_post_tool_use(sink: &dyn ToolEventSink, input: HookInput, tool_use_id: Option<String>) {
    sink.emit(hook_notification(HookEventName::PostToolUse, &input, &tool_use_id));
    let response = input.tool_response.unwrap_or(Value::Null);
    let is_error = response
        .get("is_error")
        .or_else(|| response.get("isError"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    sink.emit(ToolEvent::Result {
        id: tool_use_id,
        name: input.tool_name,
        input: input.tool_input,
        output: text_content(&response),
        is_error,
        source: ToolEventSource::Hook,
    });
}

fn hook_notification(
    event: HookEventName,
    input: &HookInput,
    tool_use_id: &Option<String>,
) -> ToolEvent {
    ToolEvent::Hook(HookNotification {
        hook_event_name: input
            .hook_event_name
            .clone()
            .unwrap_or_else(|| event.to_string()),
        tool_name: input.tool_name.clone(),
        tool_use_id: tool_use_id.clone(),
    })
}
