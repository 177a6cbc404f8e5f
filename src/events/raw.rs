//! Loosely-typed SDK events as they come off the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One event yielded by the agent SDK stream.
///
/// The SDK vocabulary changes across versions, so the event is kept as raw
/// JSON and only the fields a classified category needs are ever read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Value);

impl RawEvent {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The `type` discriminator, if present and a string.
    pub fn event_type(&self) -> Option<&str> {
        self.str_field("type")
    }

    pub fn subtype(&self) -> Option<&str> {
        self.str_field("subtype")
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// First string-or-number value among `keys`, rendered as a string.
    ///
    /// Tool ids show up as either depending on the SDK build.
    pub fn id_field(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| match self.0.get(*key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

impl From<Value> for RawEvent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Pull human-readable text out of a tool output or response payload.
///
/// Accepts a bare string, `{text}`, `{content: "..."}`, `{content: [{type: "text", text}]}`,
/// `{result: "..."}`, `{output: "..."}`, or a top-level array of text blocks.
/// Non-text blocks are skipped; text blocks are joined with newlines.
pub fn text_content(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(blocks) => {
            let parts: Vec<&str> = blocks.iter().filter_map(block_text).collect();
            (!parts.is_empty()).then(|| parts.join("\n"))
        }
        Value::Object(map) => {
            if let Some(text) = map.get("text").and_then(Value::as_str) {
                return Some(text.to_string());
            }
            for key in ["content", "result", "output"] {
                if let Some(inner) = map.get(key) {
                    if let Some(text) = text_content(inner) {
                        return Some(text);
                    }
                }
            }
            None
        }
        _ => None,
    }
}

fn block_text(block: &Value) -> Option<&str> {
    match block {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => {
            let kind = map.get("type").and_then(Value::as_str);
            match kind {
                None | Some("text") => map.get("text").and_then(Value::as_str),
                Some(_) => None,
            }
        }
        _ => None,
    }
}
