//! The run output contract.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Failure category surfaced in `RunMeta::error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunErrorKind {
    /// The SDK package could not be loaded.
    SdkUnavailable,
    /// Application tools could not be registered with the SDK.
    McpBridgeFailed,
    /// The stream finished without answer text or a messaging-tool send.
    NoOutput,
    /// The SDK query or its stream failed.
    RunFailed,
}

impl RunErrorKind {
    /// Short user-facing explanation. Only `RunFailed` carries the cause.
    pub fn user_message(self, detail: &str) -> String {
        match self {
            Self::SdkUnavailable => {
                "Agent SDK is not available. Install the SDK package or switch to a different agent runtime.".to_string()
            }
            Self::McpBridgeFailed => {
                "Failed to bridge application tools into the agent SDK.".to_string()
            }
            Self::NoOutput => "Agent run completed but produced no text output.".to_string(),
            Self::RunFailed => format!("Agent run failed: {detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    pub kind: RunErrorKind,
    pub message: String,
}

/// One deliverable reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub text: String,
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_urls: Option<Vec<String>>,
}

impl Payload {
    pub fn answer(text: impl Into<String>, media_urls: Vec<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            media_urls: (!media_urls.is_empty()).then_some(media_urls),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            media_urls: None,
        }
    }
}

/// Tool registration diagnostics reported by the tool bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeMeta {
    pub tool_count: usize,
    pub registered_tools: Vec<String>,
    pub skipped_tools: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMeta {
    pub event_count: usize,
    pub extracted_chars: usize,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub bridge: BridgeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
}

/// A message delivered through a messaging tool instead of the final reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingToolSend {
    pub tool: String,
    pub destination: String,
    pub text: String,
}

/// Everything a run produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// Empty when a messaging tool delivered the turn, otherwise exactly one entry.
    pub payloads: Vec<Payload>,
    pub meta: RunMeta,
    pub did_send_via_messaging_tool: bool,
    pub messaging_tool_sent_texts: Vec<String>,
    #[serde(default)]
    pub messaging_tool_sends: Vec<MessagingToolSend>,
}

impl RunResult {
    pub fn error_kind(&self) -> Option<RunErrorKind> {
        self.meta.error.as_ref().map(|error| error.kind)
    }

    pub fn is_error(&self) -> bool {
        self.meta.error.is_some()
    }

    /// Text of the single payload, if any.
    pub fn text(&self) -> Option<&str> {
        self.payloads.first().map(|payload| payload.text.as_str())
    }
}
