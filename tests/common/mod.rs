//! Shared test helpers: scripted SDK, failing collaborators and recorders.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;

use sdk_runner::callbacks::RunCallbacks;
use sdk_runner::config::RunnerConfig;
use sdk_runner::context::{RunContext, RunContextRegistry};
use sdk_runner::error::BoxError;
use sdk_runner::events::RawEvent;
use sdk_runner::hooks::{HookEvent, InternalHooks};
use sdk_runner::mcp::{BridgeRequest, BridgedTools, StaticToolBridge, ToolBridge, ToolDescriptor};
use sdk_runner::runner::{RunParams, RunnerDeps, SdkRunner};
use sdk_runner::sdk::{AgentSdk, HookEventName, HookInput, QueryArgs, RawEventStream, SdkLoader};
use sdk_runner::types::{AgentEvent, ReplyPayload, RunResult};

/// A hook invocation performed by [`ScriptedSdk`] before it returns its stream.
#[derive(Debug, Clone)]
pub struct HookCall {
    pub event: HookEventName,
    pub input: HookInput,
    pub tool_use_id: Option<String>,
}

impl HookCall {
    pub fn pre(tool_name: &str, tool_input: Value, id: &str) -> Self {
        Self {
            event: HookEventName::PreToolUse,
            input: HookInput {
                tool_name: Some(tool_name.to_string()),
                tool_input: Some(tool_input),
                ..HookInput::default()
            },
            tool_use_id: Some(id.to_string()),
        }
    }

    pub fn post(tool_name: &str, tool_response: Value, id: &str) -> Self {
        Self {
            event: HookEventName::PostToolUse,
            input: HookInput {
                tool_name: Some(tool_name.to_string()),
                tool_response: Some(tool_response),
                ..HookInput::default()
            },
            tool_use_id: Some(id.to_string()),
        }
    }
}

/// An SDK that plays back a canned stream.
#[derive(Default)]
pub struct ScriptedSdk {
    items: Vec<Result<Value, String>>,
    hook_calls: Vec<HookCall>,
    query_error: Option<String>,
    stall: bool,
    queries: Mutex<Vec<QueryArgs>>,
}

impl ScriptedSdk {
    pub fn new(events: Vec<Value>) -> Self {
        Self {
            items: events.into_iter().map(Ok).collect(),
            ..Self::default()
        }
    }

    /// Fail the stream after the given events.
    pub fn failing_after(events: Vec<Value>, message: &str) -> Self {
        let mut items: Vec<Result<Value, String>> = events.into_iter().map(Ok).collect();
        items.push(Err(message.to_string()));
        Self {
            items,
            ..Self::default()
        }
    }

    /// Go silent after the given events without ending the stream.
    pub fn stalling_after(events: Vec<Value>) -> Self {
        Self {
            stall: true,
            ..Self::new(events)
        }
    }

    /// Fail `query` itself.
    pub fn query_fails(message: &str) -> Self {
        Self {
            query_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn with_hook_calls(mut self, calls: Vec<HookCall>) -> Self {
        self.hook_calls = calls;
        self
    }

    pub fn queries(&self) -> Vec<QueryArgs> {
        self.queries.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> QueryArgs {
        self.queries().pop().expect("no query recorded")
    }
}

#[async_trait]
impl AgentSdk for ScriptedSdk {
    async fn query(&self, args: QueryArgs) -> Result<RawEventStream, BoxError> {
        let hooks = args.options.hooks.clone();
        self.queries.lock().unwrap().push(args);
        if let Some(message) = &self.query_error {
            return Err(message.clone().into());
        }
        if let Some(hooks) = hooks {
            for call in &self.hook_calls {
                hooks
                    .fire(call.event, call.input.clone(), call.tool_use_id.clone())
                    .await?;
            }
        }
        let items = self.items.clone();
        let stall = self.stall;
        let stream = async_stream::stream! {
            for item in items {
                match item {
                    Ok(value) => yield Ok(RawEvent::new(value)),
                    Err(message) => yield Err(BoxError::from(message)),
                }
            }
            if stall {
                futures::future::pending::<()>().await;
            }
        };
        Ok(stream.boxed())
    }
}

pub struct StaticLoader(pub Arc<ScriptedSdk>);

#[async_trait]
impl SdkLoader for StaticLoader {
    async fn load(&self) -> Result<Arc<dyn AgentSdk>, BoxError> {
        Ok(self.0.clone())
    }
}

pub struct FailingLoader(pub &'static str);

#[async_trait]
impl SdkLoader for FailingLoader {
    async fn load(&self) -> Result<Arc<dyn AgentSdk>, BoxError> {
        Err(self.0.into())
    }
}

pub struct FailingBridge(pub &'static str);

#[async_trait]
impl ToolBridge for FailingBridge {
    async fn bridge_tools(&self, _request: BridgeRequest) -> Result<BridgedTools, BoxError> {
        Err(self.0.into())
    }
}

/// Records `create_event` calls as `HookEvent`s.
#[derive(Default)]
pub struct RecordingHooks {
    pub events: Mutex<Vec<HookEvent>>,
}

impl RecordingHooks {
    pub fn with_action(&self, action: &str) -> Vec<HookEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.action == action)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl InternalHooks for RecordingHooks {
    fn create_event(
        &self,
        domain: &str,
        action: &str,
        session_key: Option<&str>,
        context: Value,
    ) -> HookEvent {
        let event = HookEvent::new(domain, action, session_key, context);
        self.events.lock().unwrap().push(event.clone());
        event
    }

    async fn trigger(&self, _event: HookEvent) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Counts register/clear calls per run id.
#[derive(Default)]
pub struct CountingRegistry {
    pub registered: Mutex<Vec<String>>,
    pub cleared: Mutex<Vec<String>>,
}

impl RunContextRegistry for CountingRegistry {
    fn register(&self, run_id: &str, _context: RunContext) {
        self.registered.lock().unwrap().push(run_id.to_string());
    }

    fn clear(&self, run_id: &str) {
        self.cleared.lock().unwrap().push(run_id.to_string());
    }
}

/// Everything the callbacks saw, in dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub enum Seen {
    Partial(ReplyPayload),
    Block(ReplyPayload),
    ToolResult(ReplyPayload),
    MessageStart,
    Agent(AgentEvent),
}

#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Recorder {
    pub fn callbacks(&self) -> RunCallbacks {
        let partial = self.seen.clone();
        let block = self.seen.clone();
        let tool = self.seen.clone();
        let start = self.seen.clone();
        let agent = self.seen.clone();
        RunCallbacks::new()
            .on_partial_reply(move |payload| {
                partial.lock().unwrap().push(Seen::Partial(payload));
                async { Ok(()) }
            })
            .on_block_reply(move |payload| {
                block.lock().unwrap().push(Seen::Block(payload));
                async { Ok(()) }
            })
            .on_tool_result(move |payload| {
                tool.lock().unwrap().push(Seen::ToolResult(payload));
                async { Ok(()) }
            })
            .on_assistant_message_start(move |_| {
                start.lock().unwrap().push(Seen::MessageStart);
                async { Ok(()) }
            })
            .on_agent_event(move |event| {
                agent.lock().unwrap().push(Seen::Agent(event));
                async { Ok(()) }
            })
    }

    pub fn all(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn partials(&self) -> Vec<ReplyPayload> {
        self.all()
            .into_iter()
            .filter_map(|seen| match seen {
                Seen::Partial(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn blocks(&self) -> Vec<ReplyPayload> {
        self.all()
            .into_iter()
            .filter_map(|seen| match seen {
                Seen::Block(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn tool_results(&self) -> Vec<ReplyPayload> {
        self.all()
            .into_iter()
            .filter_map(|seen| match seen {
                Seen::ToolResult(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn message_starts(&self) -> usize {
        self.all()
            .iter()
            .filter(|seen| matches!(seen, Seen::MessageStart))
            .count()
    }

    pub fn agent_events(&self) -> Vec<AgentEvent> {
        self.all()
            .into_iter()
            .filter_map(|seen| match seen {
                Seen::Agent(event) => Some(event),
                _ => None,
            })
            .collect()
    }
}

/// Runner wired to a scripted SDK with recording collaborators.
pub struct Harness {
    pub sdk: Arc<ScriptedSdk>,
    pub hooks: Arc<RecordingHooks>,
    pub registry: Arc<CountingRegistry>,
    pub runner: SdkRunner,
}

pub fn web_fetch_bridge() -> Arc<dyn ToolBridge> {
    Arc::new(StaticToolBridge::new(vec![ToolDescriptor::new(
        "web_fetch",
        "Fetch a URL",
    )]))
}

impl Harness {
    pub fn new(sdk: ScriptedSdk) -> Self {
        let sdk = Arc::new(sdk);
        Self::with_collaborators(Arc::new(StaticLoader(sdk.clone())), web_fetch_bridge(), sdk)
    }

    pub fn with_collaborators(
        loader: Arc<dyn SdkLoader>,
        bridge: Arc<dyn ToolBridge>,
        sdk: Arc<ScriptedSdk>,
    ) -> Self {
        Self::with_config(loader, bridge, sdk, RunnerConfig::default())
    }

    pub fn with_config(
        loader: Arc<dyn SdkLoader>,
        bridge: Arc<dyn ToolBridge>,
        sdk: Arc<ScriptedSdk>,
        config: RunnerConfig,
    ) -> Self {
        let hooks = Arc::new(RecordingHooks::default());
        let registry = Arc::new(CountingRegistry::default());
        let deps = RunnerDeps::new(loader, bridge)
            .with_internal_hooks(hooks.clone())
            .with_run_contexts(registry.clone());
        Self {
            sdk,
            hooks,
            registry,
            runner: SdkRunner::new(deps, config),
        }
    }

    pub async fn run(&self, params: RunParams) -> RunResult {
        self.runner.run(params).await
    }

    pub fn cleared(&self) -> Vec<String> {
        self.registry.cleared.lock().unwrap().clone()
    }
}

/// Base params with a fixed run id. Override fields with struct update syntax.
pub fn params() -> RunParams {
    RunParams::builder()
        .prompt("test prompt")
        .run_id("test-run-1")
        .build()
}
