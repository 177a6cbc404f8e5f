//! CLI entry point for sdk-runner.

pub mod replay;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Replay recorded agent SDK streams through the runner.
#[derive(Parser, Debug)]
#[command(name = "sdk-runner", version, about = "Agent SDK run normalizer")]
pub struct Cli {
    /// Config file (defaults to $SDK_RUNNER_CONFIG or the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a recorded JSONL event stream and print the RunResult as JSON
    Replay(ReplayArgs),
    /// Print the category of every event in a JSONL recording
    Classify(ClassifyArgs),
}

/// Arguments for `sdk-runner replay`.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// JSON Lines recording, one SDK event per line
    pub file: PathBuf,

    /// Prompt recorded in the query
    #[arg(short, long, default_value = "")]
    pub prompt: String,

    /// Register Pre/PostToolUse hooks (replays `hook` directive lines)
    #[arg(long)]
    pub hooks: bool,

    /// Application tool to bridge (repeatable)
    #[arg(long = "tool")]
    pub tools: Vec<String>,

    /// Session key passed to internal hooks
    #[arg(long)]
    pub session_key: Option<String>,

    /// Print agent events to stderr as they happen
    #[arg(long)]
    pub events: bool,
}

/// Arguments for `sdk-runner classify`.
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// JSON Lines recording, one SDK event per line
    pub file: PathBuf,
}
