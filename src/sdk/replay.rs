//! Replay SDK: serves a recorded event stream.
//!
//! Recordings are JSON Lines, one raw SDK event per line. Two directive lines
//! are interpreted instead of being yielded:
//!
//! - `{"type": "hook", "hook_event_name": "PreToolUse", "tool_use_id": ..., "tool_name": ..., "tool_input": ..., "tool_response": ...}`
//!   fires the registered hook callbacks (skipped when hooks are disabled);
//! - `{"type": "stream_error", "message": ...}` fails the stream at that point.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;

use crate::error::{BoxError, Result, RunnerError};
use crate::events::RawEvent;

use super::{AgentSdk, HookEventName, HookInput, QueryArgs, RawEventStream, SdkHooks, SdkLoader};

const HOOK_DIRECTIVE: &str = "hook";
const ERROR_DIRECTIVE: &str = "stream_error";

/// An [`AgentSdk`] that replays a fixed list of events for every query.
#[derive(Debug, Default)]
pub struct ReplaySdk {
    events: Vec<RawEvent>,
    queries: Mutex<Vec<QueryArgs>>,
}

impl ReplaySdk {
    pub fn from_events(events: impl IntoIterator<Item = Value>) -> Self {
        Self {
            events: events.into_iter().map(RawEvent::new).collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Parse JSON Lines. Blank lines are skipped; line numbers in errors are 1-based.
    pub fn from_jsonl_str(input: &str) -> Result<Self> {
        let mut events = Vec::new();
        for (index, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line)
                .map_err(|err| RunnerError::replay(index + 1, err.to_string()))?;
            if !value.is_object() {
                return Err(RunnerError::replay(index + 1, "event must be a JSON object"));
            }
            events.push(value);
        }
        Ok(Self::from_events(events))
    }

    pub fn from_jsonl_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_jsonl_str(&contents)
    }

    pub fn events(&self) -> &[RawEvent] {
        &self.events
    }

    /// Every query received so far.
    pub fn queries(&self) -> Vec<QueryArgs> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AgentSdk for ReplaySdk {
    async fn query(&self, args: QueryArgs) -> std::result::Result<RawEventStream, BoxError> {
        let hooks = args.options.hooks.clone();
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(args);
        }
        let events = self.events.clone();
        let stream = async_stream::stream! {
            for event in events {
                match event.event_type() {
                    Some(HOOK_DIRECTIVE) => {
                        if let Some(hooks) = hooks.as_ref() {
                            if let Err(err) = fire_hook(hooks, &event).await {
                                yield Err(err);
                                return;
                            }
                        }
                    }
                    Some(ERROR_DIRECTIVE) => {
                        let message = event
                            .str_field("message")
                            .unwrap_or("replayed stream error")
                            .to_string();
                        yield Err(BoxError::from(message));
                        return;
                    }
                    _ => yield Ok(event),
                }
            }
        };
        Ok(stream.boxed())
    }
}

async fn fire_hook(hooks: &SdkHooks, event: &RawEvent) -> std::result::Result<(), BoxError> {
    let name = event
        .str_field("hook_event_name")
        .unwrap_or_default()
        .parse::<HookEventName>()
        .map_err(|_| BoxError::from("replayed hook has an unknown hook_event_name"))?;
    let input = HookInput {
        hook_event_name: Some(name.to_string()),
        tool_name: event.str_field("tool_name").map(str::to_string),
        tool_input: event.field("tool_input").cloned(),
        tool_response: event.field("tool_response").cloned(),
    };
    let tool_use_id = event.id_field(&["tool_use_id"]);
    hooks.fire(name, input, tool_use_id).await.map(|_| ())
}

/// Loader that always hands out the same [`ReplaySdk`].
#[derive(Debug, Clone)]
pub struct ReplaySdkLoader {
    sdk: Arc<ReplaySdk>,
}

impl ReplaySdkLoader {
    pub fn new(sdk: Arc<ReplaySdk>) -> Self {
        Self { sdk }
    }

    pub fn sdk(&self) -> &Arc<ReplaySdk> {
        &self.sdk
    }
}

#[async_trait]
impl SdkLoader for ReplaySdkLoader {
    async fn load(&self) -> std::result::Result<Arc<dyn AgentSdk>, BoxError> {
        Ok(self.sdk.clone())
    }
}
