//! End-to-end runner tests against a scripted SDK.

mod common;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::json;

use common::{
    params, web_fetch_bridge, FailingBridge, FailingLoader, Harness, HookCall, Recorder,
    ScriptedSdk, StaticLoader,
};
use sdk_runner::callbacks::RunCallbacks;
use sdk_runner::config::{ProviderConfig, RunnerConfig};
use sdk_runner::error::BoxError;
use sdk_runner::runner::RunParams;
use sdk_runner::types::{
    AgentEvent, LifecycleEvent, ReplyPayload, RunErrorKind, ToolEventSource, ToolNotification,
    ToolPhase,
};

fn tool_notifications(events: &[AgentEvent]) -> Vec<ToolNotification> {
    events
        .iter()
        .filter_map(|event| match event {
            AgentEvent::Tool(notification) => Some(notification.clone()),
            _ => None,
        })
        .collect()
}

fn hook_names(events: &[AgentEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            AgentEvent::Hook(hook) => Some(hook.hook_event_name.clone()),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sdk_load_failure_reports_sdk_unavailable() {
    let sdk = Arc::new(ScriptedSdk::default());
    let harness = Harness::with_collaborators(
        Arc::new(FailingLoader("Cannot find module")),
        web_fetch_bridge(),
        sdk.clone(),
    );

    let result = harness.run(params()).await;

    assert_eq!(result.error_kind(), Some(RunErrorKind::SdkUnavailable));
    assert_eq!(result.payloads.len(), 1);
    assert!(result.payloads[0].is_error);
    assert!(result.payloads[0].text.starts_with("Agent SDK is not available"));
    assert!(sdk.queries().is_empty());
    assert_eq!(harness.cleared(), vec!["test-run-1"]);
}

#[tokio::test]
async fn bridge_failure_reports_mcp_bridge_failed() {
    let sdk = Arc::new(ScriptedSdk::new(vec![json!({"text": "never seen"})]));
    let harness = Harness::with_collaborators(
        Arc::new(StaticLoader(sdk.clone())),
        Arc::new(FailingBridge("schema conversion failed")),
        sdk.clone(),
    );

    let result = harness.run(params()).await;

    assert_eq!(result.error_kind(), Some(RunErrorKind::McpBridgeFailed));
    assert_eq!(
        result.payloads[0].text,
        "Failed to bridge application tools into the agent SDK."
    );
    assert_eq!(
        result.meta.error.as_ref().map(|error| error.message.as_str()),
        Some("schema conversion failed")
    );
    assert!(sdk.queries().is_empty());
    assert_eq!(harness.cleared(), vec!["test-run-1"]);
}

#[tokio::test]
async fn lifecycle_only_stream_is_no_output() {
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"type": "system", "data": "started"}),
    ]));

    let result = harness.run(params()).await;

    assert_eq!(result.error_kind(), Some(RunErrorKind::NoOutput));
    assert!(result.payloads[0].text.contains("no text output"));
    assert_eq!(result.meta.event_count, 1);
    assert_eq!(harness.cleared(), vec!["test-run-1"]);
}

#[tokio::test]
async fn tool_only_stream_is_no_output() {
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"type": "tool_use", "id": "t1", "name": "exec", "input": {"command": "ls"}}),
        json!({"type": "tool_result", "tool_use_id": "t1", "content": "ok"}),
        json!({"type": "result", "subtype": "error"}),
    ]));

    let result = harness.run(params()).await;

    assert_eq!(result.error_kind(), Some(RunErrorKind::NoOutput));
    assert!(!result.did_send_via_messaging_tool);
    assert_eq!(result.meta.event_count, 3);
    assert_eq!(harness.cleared(), vec!["test-run-1"]);
}

#[tokio::test]
async fn query_error_is_run_failed_with_detail() {
    let harness = Harness::new(ScriptedSdk::query_fails("rate limited"));

    let result = harness.run(params()).await;

    assert_eq!(result.error_kind(), Some(RunErrorKind::RunFailed));
    assert_eq!(result.payloads[0].text, "Agent run failed: rate limited");
    assert_eq!(harness.cleared(), vec!["test-run-1"]);
}

#[tokio::test]
async fn stream_error_discards_partial_text() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::failing_after(
        vec![json!({"text": "Halfway there"})],
        "connection reset",
    ));

    let result = harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    assert_eq!(result.error_kind(), Some(RunErrorKind::RunFailed));
    assert_eq!(result.payloads.len(), 1);
    assert_eq!(result.payloads[0].text, "Agent run failed: connection reset");
    assert_eq!(recorder.partials().len(), 1);
    assert!(recorder.blocks().is_empty());
    assert_eq!(harness.cleared(), vec!["test-run-1"]);
}

#[tokio::test]
async fn idle_stream_times_out() {
    let sdk = Arc::new(ScriptedSdk::stalling_after(vec![json!({"text": "Thinking it over"})]));
    let harness = Harness::with_config(
        Arc::new(StaticLoader(sdk.clone())),
        web_fetch_bridge(),
        sdk,
        RunnerConfig::builder().stream_idle_timeout_ms(50).build(),
    );

    let result = harness.run(params()).await;

    assert_eq!(result.error_kind(), Some(RunErrorKind::RunFailed));
    assert!(result.payloads[0].text.contains("no SDK event received for 50ms"));
    assert_eq!(harness.cleared(), vec!["test-run-1"]);
}

// ---------------------------------------------------------------------------
// Answer resolution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_run_returns_one_payload_and_clears_context_once() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"type": "message_start"}),
        json!({"text": "Hello"}),
        json!({"type": "result", "subtype": "success", "result": "Hello"}),
    ]));

    let result = harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    assert!(!result.is_error());
    assert_eq!(result.text(), Some("Hello"));
    assert_eq!(result.meta.event_count, 3);
    assert_eq!(result.meta.extracted_chars, 5);
    assert_eq!(recorder.blocks(), vec![ReplyPayload::new("Hello", vec![])]);
    assert_eq!(
        *harness.registry.registered.lock().unwrap(),
        vec!["test-run-1".to_string()]
    );
    assert_eq!(harness.cleared(), vec!["test-run-1"]);
}

#[tokio::test]
async fn missing_run_id_is_generated() {
    let harness = Harness::new(ScriptedSdk::new(vec![json!({"text": "ok"})]));

    harness
        .run(RunParams::builder().prompt("hi").build())
        .await;

    let registered = harness.registry.registered.lock().unwrap().clone();
    assert_eq!(registered.len(), 1);
    assert!(!registered[0].is_empty());
    assert_eq!(harness.cleared(), registered);
}

#[tokio::test]
async fn error_result_without_text_falls_back_to_turns() {
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"text": "Partial answer before the limit"}),
        json!({"type": "result", "subtype": "error_max_turns"}),
    ]));

    let result = harness.run(params()).await;

    assert!(!result.is_error());
    assert_eq!(result.text(), Some("Partial answer before the limit"));
}

#[tokio::test]
async fn result_field_beats_every_turn() {
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"type": "message_start"}),
        json!({"text": "Turn 1"}),
        json!({"type": "message_start"}),
        json!({"text": "Turn 2"}),
        json!({"type": "result", "subtype": "success", "result": "Final answer."}),
    ]));

    let result = harness.run(params()).await;

    assert_eq!(result.payloads.len(), 1);
    assert_eq!(result.text(), Some("Final answer."));
}

#[tokio::test]
async fn first_terminal_result_wins() {
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"type": "result", "result": "First"}),
        json!({"type": "result", "result": "Second"}),
    ]));

    let result = harness.run(params()).await;

    assert_eq!(result.text(), Some("First"));
    assert_eq!(result.meta.event_count, 2);
}

#[tokio::test]
async fn chunks_in_one_turn_are_joined() {
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"text": "Part A"}),
        json!({"text": "Part B"}),
    ]));

    let result = harness.run(params()).await;

    assert_eq!(result.text(), Some("Part A\n\nPart B"));
}

#[tokio::test]
async fn repeated_chunk_is_dropped() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"type": "text_delta", "text": "Hello"}),
        json!({"type": "text_delta", "text": "Hello"}),
    ]));

    let result = harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    assert_eq!(result.text(), Some("Hello"));
    assert_eq!(recorder.partials().len(), 1);
}

#[tokio::test]
async fn only_the_last_turn_is_the_answer() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"type": "message_start"}),
        json!({"text": "I will look that up."}),
        json!({"type": "message_start"}),
        json!({"text": "Here is the answer."}),
    ]));

    let result = harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    assert_eq!(result.text(), Some("Here is the answer."));
    assert_eq!(recorder.message_starts(), 2);
}

#[tokio::test]
async fn thinking_events_are_not_replied() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"type": "thinking", "text": "Let me reason about this"}),
        json!({"text": "Answer"}),
    ]));

    let result = harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    assert_eq!(result.text(), Some("Answer"));
    assert_eq!(recorder.partials(), vec![ReplyPayload::new("Answer", vec![])]);
}

#[tokio::test]
async fn compaction_handoff_text_is_stripped() {
    let harness = Harness::new(ScriptedSdk::new(vec![json!({
        "type": "result",
        "result": "Summary line.\nThis session is being continued from a previous conversation that ran out of context.\nThe summary below covers it.",
    })]));

    let result = harness.run(params()).await;

    assert_eq!(result.text(), Some("Summary line."));
}

#[tokio::test]
async fn thinking_tags_are_stripped_from_the_answer() {
    let harness = Harness::new(ScriptedSdk::new(vec![json!({
        "text": "<thinking>private</thinking>Visible answer",
    })]));

    let result = harness.run(params()).await;

    assert_eq!(result.text(), Some("Visible answer"));
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[tokio::test]
async fn partial_reply_carries_media() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::new(vec![json!({
        "text": "Here is the image\nMEDIA: https://example.com/image.png",
    })]));

    harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    assert_eq!(
        recorder.partials(),
        vec![ReplyPayload::new(
            "Here is the image",
            vec!["https://example.com/image.png".to_string()]
        )]
    );
}

#[tokio::test]
async fn final_payload_and_block_reply_carry_media() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::new(vec![json!({
        "type": "result",
        "result": "Answer\nMEDIA: https://example.com/audio.mp3",
    })]));

    let result = harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    assert_eq!(result.payloads.len(), 1);
    assert_eq!(result.payloads[0].text, "Answer");
    assert_eq!(
        result.payloads[0].media_urls,
        Some(vec!["https://example.com/audio.mp3".to_string()])
    );
    assert_eq!(
        recorder.blocks(),
        vec![ReplyPayload::new(
            "Answer",
            vec!["https://example.com/audio.mp3".to_string()]
        )]
    );
}

#[tokio::test]
async fn streamed_media_reaches_the_block_reply() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"text": "Response"}),
        json!({"text": "MEDIA: https://example.com/photo.jpg"}),
    ]));

    harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    assert_eq!(
        recorder.blocks(),
        vec![ReplyPayload::new(
            "Response",
            vec!["https://example.com/photo.jpg".to_string()]
        )]
    );
}

#[tokio::test]
async fn tool_result_callback_carries_media() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"type": "tool_use", "id": "t1", "name": "mcp__app__render", "input": {}}),
        json!({
            "type": "tool_result",
            "tool_use_id": "t1",
            "content": "Result\nMEDIA: https://example.com/chart.png",
        }),
        json!({"text": "Done"}),
    ]));

    harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    assert_eq!(
        recorder.tool_results(),
        vec![ReplyPayload::new(
            "Result",
            vec!["https://example.com/chart.png".to_string()]
        )]
    );
}

// ---------------------------------------------------------------------------
// Messaging tools
// ---------------------------------------------------------------------------

#[tokio::test]
async fn messaging_tool_send_suppresses_the_final_payload() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({
            "type": "tool_use",
            "id": "t1",
            "name": "mcp__clawdbrain__message",
            "input": {"action": "thread-reply", "to": "channel:123", "message": "Hello from tool"},
        }),
        json!({"type": "tool_result", "tool_use_id": "t1", "content": "sent"}),
        json!({"text": "Hello from tool"}),
        json!({"type": "result", "result": "Hello from tool"}),
    ]));

    let result = harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    assert!(result.payloads.is_empty());
    assert!(!result.is_error());
    assert!(result.did_send_via_messaging_tool);
    assert_eq!(result.messaging_tool_sent_texts, vec!["Hello from tool"]);
    assert_eq!(result.messaging_tool_sends[0].destination, "channel:123");
    assert!(recorder.blocks().is_empty());
}

#[tokio::test]
async fn media_only_messaging_send_suppresses_the_final_payload() {
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({
            "type": "tool_use",
            "id": "t1",
            "name": "mcp__app__message",
            "input": {"action": "send", "to": "c1", "media": "https://x.example/y.png"},
        }),
        json!({"type": "tool_result", "tool_use_id": "t1", "content": "ok"}),
        json!({"type": "result", "result": "I sent the image."}),
    ]));

    let result = harness.run(params()).await;

    assert!(result.payloads.is_empty());
    assert!(!result.is_error());
    assert!(result.did_send_via_messaging_tool);
    assert!(result.messaging_tool_sent_texts.is_empty());
    assert_eq!(result.messaging_tool_sends.len(), 1);
    assert_eq!(result.messaging_tool_sends[0].destination, "c1");
    assert_eq!(result.messaging_tool_sends[0].text, "");
}

#[tokio::test]
async fn failed_messaging_tool_call_is_not_a_send() {
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({
            "type": "tool_use",
            "id": "t1",
            "name": "message",
            "input": {"action": "send", "message": "Hi"},
        }),
        json!({"type": "tool_result", "tool_use_id": "t1", "content": "denied", "is_error": true}),
        json!({"text": "I could not send it."}),
    ]));

    let result = harness.run(params()).await;

    assert!(!result.did_send_via_messaging_tool);
    assert_eq!(result.text(), Some("I could not send it."));
}

// ---------------------------------------------------------------------------
// Internal hooks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn compaction_boundary_publishes_compaction_end() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({
            "type": "system",
            "subtype": "compact_boundary",
            "compact_metadata": {"trigger": "auto", "pre_tokens": 120000},
        }),
        json!({"text": "After compaction"}),
    ]));

    harness
        .run(RunParams {
            session_key: Some("sk-1".into()),
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    let events = harness.hooks.with_action("compaction:end");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].domain, "agent");
    assert_eq!(events[0].session_key.as_deref(), Some("sk-1"));
    assert_eq!(events[0].context["trigger"], "auto");
    assert_eq!(events[0].context["preTokens"], 120000);
    assert_eq!(events[0].context["willRetry"], false);
    assert!(recorder.agent_events().contains(&AgentEvent::Lifecycle(
        LifecycleEvent::Compaction {
            trigger: Some("auto".into()),
            pre_tokens: Some(120000),
        }
    )));
}

#[tokio::test]
async fn stream_tool_result_publishes_tool_result_hook() {
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"type": "message_start"}),
        json!({"text": "Let me check the directory."}),
        json!({"type": "tool_use", "id": "t1", "name": "mcp__app__exec", "input": {"command": "ls"}}),
        json!({"type": "tool_result", "tool_use_id": "t1", "content": "file.txt"}),
        json!({"type": "message_start"}),
        json!({"text": "There is one file."}),
    ]));

    harness.run(params()).await;

    let events = harness.hooks.with_action("tool:result");
    assert_eq!(events.len(), 1);
    let context = &events[0].context;
    assert_eq!(context["toolName"], "exec");
    assert_eq!(context["toolCallId"], "t1");
    assert_eq!(context["isError"], false);
    assert_eq!(context["result"], "file.txt");
    assert_eq!(context["params"], json!({"command": "ls"}));
    assert_eq!(context["recentAssistantText"], "Let me check the directory.");
    assert_eq!(context["meta"]["runId"], "test-run-1");
}

#[tokio::test]
async fn hook_tool_result_does_not_publish_tool_result_hook() {
    let harness = Harness::new(
        ScriptedSdk::new(vec![json!({"text": "Done"})]).with_hook_calls(exec_hook_calls()),
    );

    let result = harness
        .run(RunParams {
            hooks_enabled: Some(true),
            ..params()
        })
        .await;

    assert_eq!(result.text(), Some("Done"));
    assert!(harness.hooks.with_action("tool:result").is_empty());
}

// ---------------------------------------------------------------------------
// SDK options
// ---------------------------------------------------------------------------

#[tokio::test]
async fn query_options_carry_provider_and_workspace() {
    let env = BTreeMap::from([
        ("ANTHROPIC_BASE_URL".to_string(), "https://api.z.ai".to_string()),
        ("ANTHROPIC_AUTH_TOKEN".to_string(), "secret".to_string()),
    ]);
    let harness = Harness::new(ScriptedSdk::new(vec![json!({"text": "ok"})]));

    let result = harness
        .run(RunParams {
            workspace_dir: Some(PathBuf::from("/my/project")),
            system_prompt: Some("You are helpful.".into()),
            provider: Some(
                ProviderConfig::builder()
                    .name("z.AI")
                    .env(env.clone())
                    .max_turns(10)
                    .build(),
            ),
            ..params()
        })
        .await;

    let query = harness.sdk.last_query();
    assert_eq!(query.prompt, "test prompt");
    assert_eq!(query.options.env, env);
    assert_eq!(query.options.cwd, Some(PathBuf::from("/my/project")));
    assert_eq!(query.options.system_prompt.as_deref(), Some("You are helpful."));
    assert_eq!(query.options.max_turns, Some(10));
    assert!(query.options.tools.is_empty());
    assert_eq!(query.options.allowed_tools, vec!["mcp__app__web_fetch"]);
    assert!(query.options.mcp_servers.contains_key("app"));
    assert!(query.options.hooks.is_none());
    assert_eq!(result.meta.provider.as_deref(), Some("z.AI"));
}

#[tokio::test]
async fn built_in_tools_are_enabled_and_allowed() {
    let harness = Harness::new(ScriptedSdk::new(vec![json!({"text": "ok"})]));

    harness
        .run(RunParams {
            built_in_tools: Some(vec!["Read".into(), "Bash".into()]),
            ..params()
        })
        .await;

    let options = harness.sdk.last_query().options;
    assert_eq!(options.tools, vec!["Read", "Bash"]);
    assert!(options.allowed_tools.contains(&"Read".to_string()));
    assert!(options.allowed_tools.contains(&"Bash".to_string()));
    assert!(options.allowed_tools.contains(&"mcp__app__web_fetch".to_string()));
}

#[tokio::test]
async fn bridge_metadata_is_reported() {
    let harness = Harness::new(ScriptedSdk::new(vec![json!({"text": "ok"})]));

    let result = harness.run(params()).await;

    assert_eq!(result.meta.bridge.tool_count, 1);
    assert_eq!(result.meta.bridge.registered_tools, vec!["web_fetch"]);
    assert!(result.meta.bridge.skipped_tools.is_empty());
    assert_eq!(result.meta.provider, None);
}

// ---------------------------------------------------------------------------
// Hook-based tool events
// ---------------------------------------------------------------------------

fn exec_hook_calls() -> Vec<HookCall> {
    vec![
        HookCall::pre("mcp__clawdbrain__exec", json!({"command": "ls"}), "t1"),
        HookCall::post(
            "mcp__clawdbrain__exec",
            json!({"content": [{"type": "text", "text": "ok"}]}),
            "t1",
        ),
    ]
}

#[tokio::test]
async fn hook_path_emits_tool_events() {
    let recorder = Recorder::default();
    let harness = Harness::new(
        ScriptedSdk::new(vec![json!({"text": "Done"})]).with_hook_calls(exec_hook_calls()),
    );

    let result = harness
        .run(RunParams {
            hooks_enabled: Some(true),
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    assert_eq!(result.text(), Some("Done"));
    let events = recorder.agent_events();
    assert_eq!(hook_names(&events), vec!["PreToolUse", "PostToolUse"]);

    let tools = tool_notifications(&events);
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].phase, ToolPhase::Start);
    assert_eq!(tools[0].name, "exec");
    assert_eq!(tools[0].source, ToolEventSource::Hook);
    assert_eq!(tools[1].phase, ToolPhase::Result);
    assert_eq!(tools[1].name, "exec");
    assert_eq!(tools[1].text.as_deref(), Some("ok"));
    assert_eq!(recorder.tool_results(), vec![ReplyPayload::new("ok", vec![])]);
    assert!(harness.sdk.last_query().options.hooks.is_some());
}

#[tokio::test]
async fn hook_and_stream_reports_of_one_call_are_merged() {
    let recorder = Recorder::default();
    let harness = Harness::new(
        ScriptedSdk::new(vec![
            json!({"type": "tool_use", "id": "t1", "name": "mcp__clawdbrain__exec", "input": {"command": "ls"}}),
            json!({"type": "tool_result", "tool_use_id": "t1", "content": "ok"}),
            json!({"text": "Done"}),
        ])
        .with_hook_calls(exec_hook_calls()),
    );

    harness
        .run(RunParams {
            hooks_enabled: Some(true),
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    let tools = tool_notifications(&recorder.agent_events());
    assert_eq!(tools.len(), 2);
    assert!(tools.iter().all(|tool| tool.source == ToolEventSource::Hook));
    assert_eq!(recorder.tool_results().len(), 1);
}

#[tokio::test]
async fn hooks_are_not_registered_when_disabled() {
    let recorder = Recorder::default();
    let harness = Harness::new(
        ScriptedSdk::new(vec![json!({"text": "Done"})]).with_hook_calls(exec_hook_calls()),
    );

    harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    assert!(harness.sdk.last_query().options.hooks.is_none());
    assert!(tool_notifications(&recorder.agent_events()).is_empty());
}

#[tokio::test]
async fn tool_output_flag_gates_only_the_tool_result_callback() {
    for hooks_enabled in [false, true] {
        let recorder = Recorder::default();
        let sdk = if hooks_enabled {
            ScriptedSdk::new(vec![json!({"text": "Done"})]).with_hook_calls(exec_hook_calls())
        } else {
            ScriptedSdk::new(vec![
                json!({"type": "tool_use", "id": "t1", "name": "exec", "input": {}}),
                json!({"type": "tool_result", "tool_use_id": "t1", "content": "ok"}),
                json!({"text": "Done"}),
            ])
        };
        let harness = Harness::new(sdk);

        harness
            .run(RunParams {
                hooks_enabled: Some(hooks_enabled),
                should_emit_tool_output: Some(false),
                callbacks: recorder.callbacks(),
                ..params()
            })
            .await;

        assert!(recorder.tool_results().is_empty(), "hooks_enabled={hooks_enabled}");
        assert_eq!(
            tool_notifications(&recorder.agent_events()).len(),
            2,
            "hooks_enabled={hooks_enabled}"
        );
    }
}

// ---------------------------------------------------------------------------
// Callbacks and lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lifecycle_events_bracket_the_run() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::new(vec![json!({"text": "Hi"})]));

    harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    let events = recorder.agent_events();
    assert_eq!(
        events.first(),
        Some(&AgentEvent::Lifecycle(LifecycleEvent::Start {
            run_id: "test-run-1".into()
        }))
    );
    assert_eq!(
        events.last(),
        Some(&AgentEvent::Lifecycle(LifecycleEvent::End {
            run_id: "test-run-1".into(),
            payload_count: 1,
            did_send_via_messaging_tool: false,
        }))
    );
}

#[tokio::test]
async fn failed_run_ends_with_an_error_lifecycle_event() {
    let recorder = Recorder::default();
    let harness = Harness::new(ScriptedSdk::new(vec![]));

    harness
        .run(RunParams {
            callbacks: recorder.callbacks(),
            ..params()
        })
        .await;

    match recorder.agent_events().last() {
        Some(AgentEvent::Lifecycle(LifecycleEvent::Error { kind, .. })) => {
            assert_eq!(*kind, RunErrorKind::NoOutput)
        }
        other => panic!("expected an error lifecycle event, got {other:?}"),
    }
}

#[tokio::test]
async fn panicking_callback_does_not_abort_the_run() {
    let blocks = Arc::new(Mutex::new(Vec::new()));
    let sink = blocks.clone();
    let callbacks = RunCallbacks::new()
        .on_partial_reply(|_payload| -> std::future::Ready<Result<(), BoxError>> {
            panic!("partial reply handler exploded")
        })
        .on_block_reply(move |payload| {
            sink.lock().unwrap().push(payload);
            async { Ok(()) }
        });
    let harness = Harness::new(ScriptedSdk::new(vec![
        json!({"text": "First"}),
        json!({"text": "Second"}),
    ]));

    let result = harness
        .run(RunParams {
            callbacks,
            ..params()
        })
        .await;

    assert_eq!(result.text(), Some("First\n\nSecond"));
    assert_eq!(blocks.lock().unwrap().len(), 1);
    assert_eq!(harness.cleared(), vec!["test-run-1"]);
}

#[tokio::test]
async fn failing_async_callback_does_not_abort_the_run() {
    let callbacks = RunCallbacks::new().on_partial_reply(|_payload| async {
        Err::<(), BoxError>("downstream channel closed".into())
    });
    let harness = Harness::new(ScriptedSdk::new(vec![json!({"text": "Still delivered"})]));

    let result = harness
        .run(RunParams {
            callbacks,
            ..params()
        })
        .await;

    assert!(!result.is_error());
    assert_eq!(result.text(), Some("Still delivered"));
}
