//! Tool bridge: registers application tools with the SDK as an MCP server.

pub mod bridge;

pub use bridge::StaticToolBridge;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BoxError;
use crate::sdk::McpServerConfig;

/// An application tool offered to the SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: Value::Object(Default::default()),
        }
    }
}

/// What the runner asks the bridge for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeRequest {
    pub server_name: String,
    pub run_id: String,
    pub session_key: Option<String>,
}

/// Outcome of bridging application tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgedTools {
    pub server_config: McpServerConfig,
    /// Fully-qualified names the SDK may call (`mcp__<server>__<tool>`).
    pub allowed_tools: Vec<String>,
    pub tool_count: usize,
    pub registered_tools: Vec<String>,
    pub skipped_tools: Vec<String>,
}

#[async_trait]
pub trait ToolBridge: Send + Sync {
    async fn bridge_tools(&self, request: BridgeRequest) -> Result<BridgedTools, BoxError>;
}

/// Allowed-tool name for a tool served by `server`.
pub fn qualified_tool_name(server: &str, tool: &str) -> String {
    format!("mcp__{server}__{tool}")
}
