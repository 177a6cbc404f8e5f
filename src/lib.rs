//! sdk-runner: the event-processing core of an agent run
//!
//! Drives one turn of an agent against a streaming agent SDK and distills its
//! loosely-typed event stream into a stable [`types::RunResult`]: final text,
//! media references, tool-call telemetry and structured errors.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use sdk_runner::prelude::*;
//!
//! # async fn example() -> sdk_runner::error::Result<()> {
//! let sdk = Arc::new(ReplaySdk::from_jsonl_file("run.jsonl")?);
//! let deps = RunnerDeps::new(
//!     Arc::new(ReplaySdkLoader::new(sdk)),
//!     Arc::new(StaticToolBridge::default()),
//! );
//! let runner = SdkRunner::new(deps, RunnerConfig::load()?);
//! let result = runner.run(RunParams::builder().prompt("Hello!").build()).await;
//! println!("{:?}", result.text());
//! # Ok(())
//! # }
//! ```

pub mod callbacks;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod hooks;
pub mod mcp;
pub mod prelude;
pub mod runner;
pub mod sdk;
pub mod text;
pub mod tools;
pub mod turns;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
