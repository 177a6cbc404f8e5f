//! Per-run parameters and collaborators.

use std::path::PathBuf;
use std::sync::Arc;

use bon::Builder;

use crate::callbacks::RunCallbacks;
use crate::config::{ProviderConfig, RunnerConfig};
use crate::context::{InMemoryRunContextRegistry, RunContextRegistry};
use crate::hooks::{InternalHooks, NoopInternalHooks};
use crate::mcp::ToolBridge;
use crate::sdk::SdkLoader;

/// Everything a single run needs besides the runner's collaborators.
///
/// Unset options fall back to [`RunnerConfig`].
#[derive(Debug, Clone, Builder)]
pub struct RunParams {
    #[builder(into)]
    pub prompt: String,
    /// Generated when absent.
    #[builder(into)]
    pub run_id: Option<String>,
    #[builder(into)]
    pub session_key: Option<String>,
    #[builder(into)]
    pub system_prompt: Option<String>,
    /// Becomes the SDK `cwd`.
    #[builder(into)]
    pub workspace_dir: Option<PathBuf>,
    pub provider: Option<ProviderConfig>,
    pub hooks_enabled: Option<bool>,
    pub should_emit_tool_output: Option<bool>,
    pub built_in_tools: Option<Vec<String>>,
    #[builder(default)]
    pub callbacks: RunCallbacks,
}

/// Collaborators injected into [`super::SdkRunner`].
#[derive(Clone)]
pub struct RunnerDeps {
    pub sdk_loader: Arc<dyn SdkLoader>,
    pub tool_bridge: Arc<dyn ToolBridge>,
    pub internal_hooks: Arc<dyn InternalHooks>,
    pub run_contexts: Arc<dyn RunContextRegistry>,
}

impl std::fmt::Debug for RunnerDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerDeps").finish_non_exhaustive()
    }
}

impl RunnerDeps {
    /// No-op internal hooks and a process-local context registry.
    pub fn new(sdk_loader: Arc<dyn SdkLoader>, tool_bridge: Arc<dyn ToolBridge>) -> Self {
        Self {
            sdk_loader,
            tool_bridge,
            internal_hooks: Arc::new(NoopInternalHooks),
            run_contexts: Arc::new(InMemoryRunContextRegistry::new()),
        }
    }

    pub fn with_internal_hooks(mut self, hooks: Arc<dyn InternalHooks>) -> Self {
        self.internal_hooks = hooks;
        self
    }

    pub fn with_run_contexts(mut self, registry: Arc<dyn RunContextRegistry>) -> Self {
        self.run_contexts = registry;
        self
    }
}

/// Effective settings after layering params over config.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub hooks_enabled: bool,
    pub should_emit_tool_output: bool,
    pub built_in_tools: Vec<String>,
    pub messaging_tools: Vec<String>,
    pub mcp_server_name: String,
    pub provider: Option<ProviderConfig>,
}

impl RunSettings {
    pub fn resolve(config: &RunnerConfig, params: &RunParams) -> Self {
        Self {
            hooks_enabled: params.hooks_enabled.unwrap_or(config.hooks_enabled),
            should_emit_tool_output: params
                .should_emit_tool_output
                .unwrap_or(config.should_emit_tool_output),
            built_in_tools: params
                .built_in_tools
                .clone()
                .unwrap_or_else(|| config.built_in_tools.clone()),
            messaging_tools: config.messaging_tools.clone(),
            mcp_server_name: config.mcp_server_name.clone(),
            provider: params.provider.clone().or_else(|| config.provider.clone()),
        }
    }

    pub fn provider_name(&self) -> Option<String> {
        self.provider
            .as_ref()
            .map(|provider| provider.name.clone())
            .filter(|name| !name.is_empty())
    }
}
