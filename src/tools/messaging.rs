//! Messaging-tool send detection.
//!
//! When the agent delivers its answer through a messaging tool, the final
//! text payload must be suppressed or the user sees the reply twice.

use serde_json::Value;

use crate::types::MessagingToolSend;

/// Messaging tools recognized when no configuration overrides them.
pub const DEFAULT_MESSAGING_TOOLS: &[&str] = &["message", "sessions_send", "send_message"];

const TEXT_KEYS: &[&str] = &["message", "text", "content"];
const DESTINATION_KEYS: &[&str] = &["to", "target", "channel", "sessionKey"];
const SEND_ACTIONS: &[&str] = &["send", "reply", "thread-reply", "sendMessage", "broadcast"];

/// Detect a completed send. `name` must already be normalized.
///
/// A tool input with an `action` only counts when that action is send-like,
/// so `message` with `action: "react"` is not a send. Text is optional: a
/// media-only send still counts and records an empty `text`.
pub fn detect_send(name: &str, input: &Value, messaging_tools: &[String]) -> Option<MessagingToolSend> {
    if !messaging_tools.iter().any(|tool| tool == name) {
        return None;
    }
    if let Some(action) = input.get("action").and_then(Value::as_str) {
        if !SEND_ACTIONS.contains(&action) {
            return None;
        }
    }
    let text = first_string(input, TEXT_KEYS)
        .unwrap_or_default()
        .trim()
        .to_string();
    let destination = first_string(input, DESTINATION_KEYS)
        .unwrap_or_default()
        .to_string();
    Some(MessagingToolSend {
        tool: name.to_string(),
        destination,
        text,
    })
}

fn first_string<'a>(input: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| input.get(*key).and_then(Value::as_str))
}
