//! Agent SDK collaborator interface.
//!
//! The runner never talks to a concrete SDK. It asks an [`SdkLoader`] for an
//! [`AgentSdk`], hands it [`QueryArgs`], and consumes the returned stream of
//! loosely-typed [`RawEvent`]s.

pub mod replay;

pub use replay::{ReplaySdk, ReplaySdkLoader};

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::BoxError;
use crate::events::RawEvent;

/// Stream of raw SDK events.
pub type RawEventStream = BoxStream<'static, Result<RawEvent, BoxError>>;

/// A loaded agent SDK.
#[async_trait]
pub trait AgentSdk: Send + Sync {
    /// Start a query. Errors here are query failures; errors inside the
    /// stream are stream failures.
    async fn query(&self, args: QueryArgs) -> Result<RawEventStream, BoxError>;
}

/// Resolves the SDK at run time. A failure means the SDK is unavailable.
#[async_trait]
pub trait SdkLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn AgentSdk>, BoxError>;
}

/// Arguments for [`AgentSdk::query`].
#[derive(Debug, Clone)]
pub struct QueryArgs {
    pub prompt: String,
    pub options: SdkOptions,
}

/// MCP server registration handed to the SDK.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerConfig {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Bare tool names served by this server.
    #[serde(default)]
    pub tools: Vec<String>,
}

/// Options passed with every query.
#[derive(Clone, Default)]
pub struct SdkOptions {
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub max_turns: Option<u32>,
    pub system_prompt: Option<String>,
    /// Built-in SDK tools to enable. Empty disables all built-ins.
    pub tools: Vec<String>,
    pub allowed_tools: Vec<String>,
    pub mcp_servers: BTreeMap<String, McpServerConfig>,
    /// Present only when hook-based tool events are enabled.
    pub hooks: Option<SdkHooks>,
}

impl fmt::Debug for SdkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkOptions")
            .field("cwd", &self.cwd)
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .field("max_turns", &self.max_turns)
            .field("system_prompt", &self.system_prompt.as_ref().map(|_| ".."))
            .field("tools", &self.tools)
            .field("allowed_tools", &self.allowed_tools)
            .field("mcp_servers", &self.mcp_servers)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Hook lifecycle points the runner subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum HookEventName {
    PreToolUse,
    PostToolUse,
}

/// Input the SDK passes to a hook callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<Value>,
    #[serde(default)]
    pub tool_response: Option<Value>,
}

/// Hook reply. The runner only observes, so it always lets the SDK continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookOutput {
    #[serde(rename = "continue")]
    pub proceed: bool,
}

impl Default for HookOutput {
    fn default() -> Self {
        Self { proceed: true }
    }
}

/// A hook callback: `(input, tool_use_id)`.
pub type HookCallback =
    Arc<dyn Fn(HookInput, Option<String>) -> BoxFuture<'static, Result<HookOutput, BoxError>> + Send + Sync>;

/// Hook callbacks registered with the SDK.
#[derive(Clone, Default)]
pub struct SdkHooks {
    pub pre_tool_use: Vec<HookCallback>,
    pub post_tool_use: Vec<HookCallback>,
}

impl fmt::Debug for SdkHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkHooks")
            .field("pre_tool_use", &self.pre_tool_use.len())
            .field("post_tool_use", &self.post_tool_use.len())
            .finish()
    }
}

impl SdkHooks {
    pub fn callbacks(&self, event: HookEventName) -> &[HookCallback] {
        match event {
            HookEventName::PreToolUse => &self.pre_tool_use,
            HookEventName::PostToolUse => &self.post_tool_use,
        }
    }

    /// Invoke every callback registered for `event`, in order.
    ///
    /// SDK implementations call this; the runner only registers callbacks.
    pub async fn fire(
        &self,
        event: HookEventName,
        mut input: HookInput,
        tool_use_id: Option<String>,
    ) -> Result<Vec<HookOutput>, BoxError> {
        if input.hook_event_name.is_none() {
            input.hook_event_name = Some(event.to_string());
        }
        let mut outputs = Vec::new();
        for callback in self.callbacks(event) {
            outputs.push(callback(input.clone(), tool_use_id.clone()).await?);
        }
        Ok(outputs)
    }
}

/// Wrap an async closure as a [`HookCallback`].
pub fn hook_callback<F, Fut>(f: F) -> HookCallback
where
    F: Fn(HookInput, Option<String>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<HookOutput, BoxError>> + Send + 'static,
{
    Arc::new(move |input, id| f(input, id).boxed())
}
