//! Handlers for the CLI subcommands.

use std::path::Path;
use std::sync::Arc;

use crate::callbacks::RunCallbacks;
use crate::config::RunnerConfig;
use crate::error::Result;
use crate::events::{classify, EventCategory};
use crate::mcp::{StaticToolBridge, ToolDescriptor};
use crate::runner::{RunParams, RunnerDeps, SdkRunner};
use crate::sdk::{ReplaySdk, ReplaySdkLoader};
use crate::types::{AgentEvent, RunResult};

use super::{ClassifyArgs, ReplayArgs};

/// Load config from `path` when given, else through the usual layers.
pub fn load_config(path: Option<&Path>) -> Result<RunnerConfig> {
    match path {
        Some(path) => {
            let mut config = RunnerConfig::from_file(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config.validate()?;
            Ok(config)
        }
        None => RunnerConfig::load(),
    }
}

pub async fn handle_replay(args: ReplayArgs, config: RunnerConfig) -> Result<RunResult> {
    let sdk = Arc::new(ReplaySdk::from_jsonl_file(&args.file)?);
    let tools = args
        .tools
        .iter()
        .map(|name| ToolDescriptor::new(name.clone(), String::new()))
        .collect();
    let deps = RunnerDeps::new(
        Arc::new(ReplaySdkLoader::new(sdk)),
        Arc::new(StaticToolBridge::new(tools)),
    );

    let callbacks = if args.events {
        RunCallbacks::new().on_agent_event(|event: AgentEvent| async move {
            match serde_json::to_string(&event) {
                Ok(line) => eprintln!("{line}"),
                Err(err) => eprintln!("unprintable agent event: {err}"),
            }
            Ok(())
        })
    } else {
        RunCallbacks::new()
    };

    let params = RunParams::builder()
        .prompt(args.prompt)
        .hooks_enabled(args.hooks)
        .maybe_session_key(args.session_key)
        .callbacks(callbacks)
        .build();

    Ok(SdkRunner::new(deps, config).run(params).await)
}

/// Classify each event of a recording, keeping its position.
pub fn handle_classify(args: &ClassifyArgs) -> Result<Vec<(usize, EventCategory)>> {
    let sdk = ReplaySdk::from_jsonl_file(&args.file)?;
    Ok(sdk
        .events()
        .iter()
        .enumerate()
        .map(|(index, event)| (index + 1, classify(event)))
        .collect())
}
