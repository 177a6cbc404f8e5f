//! Configuration system (layered: defaults < TOML file < env).
//!
//! Per-run [`crate::runner::RunParams`] fields override whatever is loaded here.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunnerError};
use crate::tools::DEFAULT_MESSAGING_TOOLS;

/// Env var naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SDK_RUNNER_CONFIG";

pub const DEFAULT_MCP_SERVER_NAME: &str = "app";

/// Provider the SDK runs against.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct ProviderConfig {
    #[builder(into)]
    pub name: String,
    /// Passed to the SDK process environment verbatim.
    #[serde(default)]
    #[builder(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub max_turns: Option<u32>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .field("max_turns", &self.max_turns)
            .finish()
    }
}

/// Runner-wide defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct RunnerConfig {
    /// Register Pre/PostToolUse hooks with the SDK.
    #[builder(default)]
    pub hooks_enabled: bool,
    /// Gates `on_tool_result` only; tool agent events always fire.
    #[builder(default = true)]
    pub should_emit_tool_output: bool,
    /// SDK built-in tools to enable. Empty disables them all.
    #[builder(default)]
    pub built_in_tools: Vec<String>,
    #[builder(default = default_messaging_tools())]
    pub messaging_tools: Vec<String>,
    #[builder(default = DEFAULT_MCP_SERVER_NAME.to_string(), into)]
    pub mcp_server_name: String,
    /// Fail the run when no event arrives for this long.
    pub stream_idle_timeout_ms: Option<u64>,
    pub provider: Option<ProviderConfig>,
}

fn default_messaging_tools() -> Vec<String> {
    DEFAULT_MESSAGING_TOOLS.iter().map(|s| s.to_string()).collect()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RunnerConfig {
    /// Defaults, then the config file (if any), then `SDK_RUNNER_*` env vars.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded runner config");
        Ok(config)
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// `SDK_RUNNER_CONFIG`, else `config.toml` in the platform config dir.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        directories::ProjectDirs::from("", "", "sdk-runner")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply `SDK_RUNNER_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("SDK_RUNNER_HOOKS_ENABLED") {
            self.hooks_enabled = parse_bool("SDK_RUNNER_HOOKS_ENABLED", &value)?;
        }
        if let Some(value) = lookup("SDK_RUNNER_EMIT_TOOL_OUTPUT") {
            self.should_emit_tool_output = parse_bool("SDK_RUNNER_EMIT_TOOL_OUTPUT", &value)?;
        }
        if let Some(value) = lookup("SDK_RUNNER_BUILT_IN_TOOLS") {
            self.built_in_tools = parse_list(&value);
        }
        if let Some(value) = lookup("SDK_RUNNER_MESSAGING_TOOLS") {
            self.messaging_tools = parse_list(&value);
        }
        if let Some(value) = lookup("SDK_RUNNER_MCP_SERVER_NAME") {
            self.mcp_server_name = value.trim().to_string();
        }
        if let Some(value) = lookup("SDK_RUNNER_STREAM_IDLE_TIMEOUT_MS") {
            let millis = value.trim().parse::<u64>().map_err(|_| {
                RunnerError::Configuration(format!(
                    "SDK_RUNNER_STREAM_IDLE_TIMEOUT_MS must be an integer, got {value:?}"
                ))
            })?;
            self.stream_idle_timeout_ms = Some(millis);
        }
        if let Some(name) = lookup("SDK_RUNNER_PROVIDER") {
            let provider = self.provider.get_or_insert_with(ProviderConfig::default);
            provider.name = name.trim().to_string();
        }
        if let Some(value) = lookup("SDK_RUNNER_MAX_TURNS") {
            let turns = value.trim().parse::<u32>().map_err(|_| {
                RunnerError::Configuration(format!(
                    "SDK_RUNNER_MAX_TURNS must be an integer, got {value:?}"
                ))
            })?;
            self.provider
                .get_or_insert_with(ProviderConfig::default)
                .max_turns = Some(turns);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.mcp_server_name.trim().is_empty() {
            return Err(RunnerError::Configuration(
                "mcp_server_name must not be empty".into(),
            ));
        }
        if self.stream_idle_timeout_ms == Some(0) {
            return Err(RunnerError::Configuration(
                "stream_idle_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn stream_idle_timeout(&self) -> Option<Duration> {
        self.stream_idle_timeout_ms.map(Duration::from_millis)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RunnerError::Configuration(format!(
            "{key} must be a boolean, got {value:?}"
        ))),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
