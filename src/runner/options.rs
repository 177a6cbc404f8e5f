//! SDK option assembly.

use std::collections::BTreeMap;

use crate::mcp::BridgedTools;
use crate::sdk::{SdkHooks, SdkOptions};

use super::params::{RunParams, RunSettings};

/// Build the options for one query.
///
/// `allowed_tools` is the bridged list followed by the built-in tools, with
/// duplicates removed and first-seen order kept.
pub(crate) fn build_sdk_options(
    params: &RunParams,
    settings: &RunSettings,
    bridged: &BridgedTools,
    hooks: Option<SdkHooks>,
) -> SdkOptions {
    let mut allowed_tools: Vec<String> = Vec::new();
    for tool in bridged.allowed_tools.iter().chain(&settings.built_in_tools) {
        if !allowed_tools.contains(tool) {
            allowed_tools.push(tool.clone());
        }
    }

    let mut mcp_servers = BTreeMap::new();
    mcp_servers.insert(
        bridged.server_config.name.clone(),
        bridged.server_config.clone(),
    );

    SdkOptions {
        cwd: params.workspace_dir.clone(),
        env: settings
            .provider
            .as_ref()
            .map(|provider| provider.env.clone())
            .unwrap_or_default(),
        max_turns: settings.provider.as_ref().and_then(|provider| provider.max_turns),
        system_prompt: params.system_prompt.clone(),
        tools: settings.built_in_tools.clone(),
        allowed_tools,
        mcp_servers,
        hooks: if settings.hooks_enabled { hooks } else { None },
    }
}
