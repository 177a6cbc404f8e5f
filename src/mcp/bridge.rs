//! In-process tool bridge over a fixed list of descriptors.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::sdk::McpServerConfig;

use super::{qualified_tool_name, BridgeRequest, BridgedTools, ToolBridge, ToolDescriptor};

/// Registers a fixed set of tools. Empty and duplicate names are skipped.
#[derive(Debug, Clone, Default)]
pub struct StaticToolBridge {
    tools: Vec<ToolDescriptor>,
}

impl StaticToolBridge {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }
}

#[async_trait]
impl ToolBridge for StaticToolBridge {
    async fn bridge_tools(&self, request: BridgeRequest) -> Result<BridgedTools, BoxError> {
        let mut seen = HashSet::new();
        let mut registered = Vec::new();
        let mut skipped = Vec::new();

        for tool in &self.tools {
            let name = tool.name.trim();
            if name.is_empty() {
                skipped.push(tool.name.clone());
                continue;
            }
            if !seen.insert(name.to_string()) {
                tracing::debug!(tool = %name, "duplicate tool name skipped");
                skipped.push(name.to_string());
                continue;
            }
            registered.push(name.to_string());
        }

        let allowed_tools = registered
            .iter()
            .map(|tool| qualified_tool_name(&request.server_name, tool))
            .collect();

        Ok(BridgedTools {
            server_config: McpServerConfig {
                name: request.server_name,
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
                tools: registered.clone(),
            },
            allowed_tools,
            tool_count: registered.len(),
            registered_tools: registered,
            skipped_tools: skipped,
        })
    }
}
