//! Tool event bridge: one tool-lifecycle model for stream events and hooks.

pub mod bridge;
pub mod hook_adapter;
pub mod messaging;
pub mod names;
pub mod sink;

pub use bridge::ToolEventBridge;
pub use hook_adapter::tool_hooks;
pub use messaging::{detect_send, DEFAULT_MESSAGING_TOOLS};
pub use names::{normalize_tool_name, UNKNOWN_TOOL};
pub use sink::{stream_tool_event, ToolEvent, ToolEventSink};
