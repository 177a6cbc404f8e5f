//! Run orchestrator.
//!
//! One [`SdkRunner::run`] call drives a single agent turn through
//! `LoadingSdk → BridgingTools → Streaming → Resolving` and always returns a
//! [`RunResult`]. Failures in any phase become an error payload; the run
//! context is cleared on every path.

mod hub;
mod options;
pub mod params;
mod resolve;

pub use params::{RunParams, RunnerDeps};

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use serde_json::json;
use strum::Display;
use uuid::Uuid;

use crate::callbacks::{spawn_isolated, RunCallbacks};
use crate::config::RunnerConfig;
use crate::context::{RunContext, RunContextGuard};
use crate::error::{describe, BoxError};
use crate::events::{RawEvent, SdkEvent};
use crate::hooks::InternalHooks;
use crate::mcp::BridgeRequest;
use crate::sdk::QueryArgs;
use crate::text::sanitize;
use crate::tools::{stream_tool_event, tool_hooks};
use crate::turns::TurnTracker;
use crate::types::{
    AgentEvent, AssistantEvent, BridgeMeta, LifecycleEvent, Payload, ReplyPayload, RunError,
    RunErrorKind, RunMeta, RunResult, ToolEventSource, ToolNotification, ToolPhase,
};

use hub::ToolEventHub;
use options::build_sdk_options;
use params::RunSettings;
use resolve::{finalize, resolve_answer, Answer, Resolution};

const HOOK_DOMAIN: &str = "agent";

/// Orchestrator phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
enum RunPhase {
    LoadingSdk,
    BridgingTools,
    Streaming,
    Resolving,
}

#[derive(Debug)]
struct RunFailure {
    kind: RunErrorKind,
    detail: String,
}

impl RunFailure {
    fn from_error(kind: RunErrorKind, err: &BoxError) -> Self {
        Self {
            kind,
            detail: describe(err.as_ref()),
        }
    }
}

/// Drives agent runs against an injected SDK.
#[derive(Debug, Clone)]
pub struct SdkRunner {
    deps: RunnerDeps,
    config: RunnerConfig,
}

impl SdkRunner {
    pub fn new(deps: RunnerDeps, config: RunnerConfig) -> Self {
        Self { deps, config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Execute one run. Never fails: errors are reported inside the result.
    pub async fn run(&self, params: RunParams) -> RunResult {
        let started = Instant::now();
        let run_id = params
            .run_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let settings = RunSettings::resolve(&self.config, &params);

        let _context = RunContextGuard::register(
            self.deps.run_contexts.clone(),
            RunContext {
                run_id: run_id.clone(),
                session_key: params.session_key.clone(),
                provider: settings.provider_name(),
                workspace_dir: params.workspace_dir.clone(),
                started_at: chrono::Utc::now(),
            },
        );

        tracing::debug!(
            run_id = %run_id,
            provider = ?settings.provider_name(),
            hooks_enabled = settings.hooks_enabled,
            "sdk run start"
        );
        params
            .callbacks
            .agent_event(AgentEvent::Lifecycle(LifecycleEvent::Start {
                run_id: run_id.clone(),
            }));

        let mut state = RunState::new(run_id, &params, &settings, self.deps.internal_hooks.clone());
        let outcome = self.drive(&mut state, &params, &settings).await;
        state.finish(outcome, started.elapsed(), settings.provider_name())
    }

    async fn drive(
        &self,
        state: &mut RunState,
        params: &RunParams,
        settings: &RunSettings,
    ) -> Result<Resolution, RunFailure> {
        state.enter(RunPhase::LoadingSdk);
        let sdk = self
            .deps
            .sdk_loader
            .load()
            .await
            .map_err(|err| RunFailure::from_error(RunErrorKind::SdkUnavailable, &err))?;

        state.enter(RunPhase::BridgingTools);
        let bridged = self
            .deps
            .tool_bridge
            .bridge_tools(BridgeRequest {
                server_name: settings.mcp_server_name.clone(),
                run_id: state.run_id.clone(),
                session_key: params.session_key.clone(),
            })
            .await
            .map_err(|err| RunFailure::from_error(RunErrorKind::McpBridgeFailed, &err))?;
        state.bridge = BridgeMeta {
            tool_count: bridged.tool_count,
            registered_tools: bridged.registered_tools.clone(),
            skipped_tools: bridged.skipped_tools.clone(),
        };

        let hooks = settings
            .hooks_enabled
            .then(|| tool_hooks(state.hub.clone()));
        let options = build_sdk_options(params, settings, &bridged, hooks);

        state.enter(RunPhase::Streaming);
        let mut stream = sdk
            .query(QueryArgs {
                prompt: params.prompt.clone(),
                options,
            })
            .await
            .map_err(|err| RunFailure::from_error(RunErrorKind::RunFailed, &err))?;

        let idle_timeout = self.config.stream_idle_timeout();
        loop {
            let next = match idle_timeout {
                Some(limit) => tokio::time::timeout(limit, stream.next())
                    .await
                    .map_err(|_| RunFailure {
                        kind: RunErrorKind::RunFailed,
                        detail: format!("no SDK event received for {}ms", limit.as_millis()),
                    })?,
                None => stream.next().await,
            };
            let Some(item) = next else {
                break;
            };
            let raw = item.map_err(|err| RunFailure::from_error(RunErrorKind::RunFailed, &err))?;
            state.handle_event(&raw);
        }

        state.enter(RunPhase::Resolving);
        let answer = match state.terminal.take() {
            Some(answer) => answer,
            None => resolve_answer(None, &state.turns),
        };
        Ok(finalize(answer, !state.hub.messaging_sends().is_empty()))
    }
}

/// Per-run mutable state, owned by the orchestrator.
struct RunState {
    run_id: String,
    session_key: Option<String>,
    callbacks: RunCallbacks,
    internal_hooks: Arc<dyn InternalHooks>,
    hub: Arc<ToolEventHub>,
    turns: TurnTracker,
    event_count: usize,
    extracted_chars: usize,
    bridge: BridgeMeta,
    /// Answer captured at the first terminal result.
    terminal: Option<Option<Answer>>,
}

impl RunState {
    fn new(
        run_id: String,
        params: &RunParams,
        settings: &RunSettings,
        internal_hooks: Arc<dyn InternalHooks>,
    ) -> Self {
        Self {
            run_id,
            session_key: params.session_key.clone(),
            callbacks: params.callbacks.clone(),
            internal_hooks,
            hub: Arc::new(ToolEventHub::new(
                settings.messaging_tools.clone(),
                params.callbacks.clone(),
                settings.should_emit_tool_output,
            )),
            turns: TurnTracker::new(),
            event_count: 0,
            extracted_chars: 0,
            bridge: BridgeMeta::default(),
            terminal: None,
        }
    }

    fn enter(&self, phase: RunPhase) {
        tracing::debug!(run_id = %self.run_id, %phase, "run phase");
    }

    fn handle_event(&mut self, raw: &RawEvent) {
        self.event_count += 1;
        let event = SdkEvent::parse(raw);
        tracing::debug!(run_id = %self.run_id, category = %event.category(), "sdk event");

        match &event {
            SdkEvent::AssistantText { text } => self.on_text_chunk(text),
            SdkEvent::MessageStart { .. } => {
                self.turns.on_boundary();
                self.callbacks.assistant_message_start();
            }
            SdkEvent::ToolUse { .. } | SdkEvent::ToolResult { .. } => {
                let Some(tool_event) = stream_tool_event(&event) else {
                    return;
                };
                if let Some(notification) = self.hub.record(tool_event) {
                    if notification.phase == ToolPhase::Result
                        && notification.source == ToolEventSource::Stream
                    {
                        self.publish_tool_result(&notification);
                    }
                }
            }
            SdkEvent::CompactBoundary {
                trigger,
                pre_tokens,
            } => self.on_compaction(trigger.clone(), *pre_tokens),
            SdkEvent::Result { subtype, result, .. } => {
                if self.terminal.is_some() {
                    tracing::warn!(
                        run_id = %self.run_id,
                        subtype = ?subtype,
                        "ignoring additional terminal result"
                    );
                } else {
                    self.terminal = Some(resolve_answer(result.as_deref(), &self.turns));
                }
            }
            SdkEvent::Thinking { .. } | SdkEvent::Lifecycle { .. } => {}
        }
    }

    fn on_text_chunk(&mut self, text: &str) {
        let outcome = self.turns.on_text_chunk(text);
        if outcome.appended {
            self.extracted_chars += outcome.delta.chars().count();
        }
        if !outcome.is_visible() {
            return;
        }
        let current = sanitize(&self.turns.last_turn_text());
        if current.is_empty() && outcome.media_urls.is_empty() {
            return;
        }
        self.callbacks
            .partial_reply(ReplyPayload::new(current.clone(), outcome.media_urls.clone()));
        self.callbacks
            .agent_event(AgentEvent::Assistant(AssistantEvent {
                text: current,
                delta: outcome.delta,
                media_urls: outcome.media_urls,
            }));
    }

    fn on_compaction(&self, trigger: Option<String>, pre_tokens: Option<u64>) {
        tracing::debug!(run_id = %self.run_id, trigger = ?trigger, pre_tokens = ?pre_tokens, "compaction boundary");
        self.callbacks
            .agent_event(AgentEvent::Lifecycle(LifecycleEvent::Compaction {
                trigger: trigger.clone(),
                pre_tokens,
            }));
        self.trigger_internal_hook(
            "compaction:end",
            json!({
                "trigger": trigger,
                "preTokens": pre_tokens,
                "willRetry": false,
            }),
        );
    }

    /// Fires for direct-stream tool results only. Hook-path results never fire `tool:result`.
    fn publish_tool_result(&self, notification: &ToolNotification) {
        self.trigger_internal_hook(
            "tool:result",
            json!({
                "toolName": notification.name,
                "toolCallId": notification.id,
                "isError": notification.is_error,
                "params": notification.input,
                "result": notification.text,
                "mediaUrls": notification.media_urls,
                "recentAssistantText": sanitize(&self.turns.last_turn_text()),
                "meta": {
                    "runId": self.run_id,
                    "source": notification.source,
                },
            }),
        );
    }

    fn trigger_internal_hook(&self, action: &str, context: serde_json::Value) {
        let event = self.internal_hooks.create_event(
            HOOK_DOMAIN,
            action,
            self.session_key.as_deref(),
            context,
        );
        let hooks = self.internal_hooks.clone();
        spawn_isolated("internal_hook", Box::pin(async move { hooks.trigger(event).await }));
    }

    fn finish(
        self,
        outcome: Result<Resolution, RunFailure>,
        elapsed: Duration,
        provider: Option<String>,
    ) -> RunResult {
        let sends = self.hub.messaging_sends();
        let mut meta = RunMeta {
            event_count: self.event_count,
            extracted_chars: self.extracted_chars,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            provider,
            bridge: self.bridge,
            error: None,
        };

        let failure = match outcome {
            Ok(Resolution::Answer(answer)) => {
                self.callbacks
                    .block_reply(ReplyPayload::new(answer.text.clone(), answer.media_urls.clone()));
                Ok(vec![Payload::answer(answer.text, answer.media_urls)])
            }
            Ok(Resolution::DeliveredByTool) => Ok(Vec::new()),
            Ok(Resolution::NoOutput) => Err(RunFailure {
                kind: RunErrorKind::NoOutput,
                detail: format!("no text output after {} events", self.event_count),
            }),
            Err(failure) => Err(failure),
        };

        let payloads = match failure {
            Ok(payloads) => {
                tracing::info!(
                    run_id = %self.run_id,
                    events = meta.event_count,
                    payloads = payloads.len(),
                    messaging_sends = sends.len(),
                    duration_ms = meta.duration_ms,
                    "sdk run complete"
                );
                self.callbacks
                    .agent_event(AgentEvent::Lifecycle(LifecycleEvent::End {
                        run_id: self.run_id.clone(),
                        payload_count: payloads.len(),
                        did_send_via_messaging_tool: !sends.is_empty(),
                    }));
                payloads
            }
            Err(failure) => {
                tracing::warn!(
                    run_id = %self.run_id,
                    kind = %failure.kind,
                    error = %failure.detail,
                    "sdk run failed"
                );
                self.callbacks
                    .agent_event(AgentEvent::Lifecycle(LifecycleEvent::Error {
                        run_id: self.run_id.clone(),
                        kind: failure.kind,
                        message: failure.detail.clone(),
                    }));
                let payload = Payload::error(failure.kind.user_message(&failure.detail));
                meta.error = Some(RunError {
                    kind: failure.kind,
                    message: failure.detail,
                });
                vec![payload]
            }
        };

        RunResult {
            payloads,
            meta,
            did_send_via_messaging_tool: !sends.is_empty(),
            messaging_tool_sent_texts: sends
                .iter()
                .filter(|send| !send.text.is_empty())
                .map(|send| send.text.clone())
                .collect(),
            messaging_tool_sends: sends,
        }
    }
}
