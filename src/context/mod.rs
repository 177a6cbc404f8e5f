//! Agent-run-context registry.
//!
//! Other parts of the application look up the context of a live run by id.
//! The runner registers one at start and clears it through [`RunContextGuard`],
//! so the entry is removed exactly once whichever way the run ends.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

/// What the registry knows about a live run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub run_id: String,
    pub session_key: Option<String>,
    pub provider: Option<String>,
    pub workspace_dir: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
}

pub trait RunContextRegistry: Send + Sync {
    fn register(&self, run_id: &str, context: RunContext);
    fn clear(&self, run_id: &str);
}

/// Process-local registry.
#[derive(Debug, Default)]
pub struct InMemoryRunContextRegistry {
    contexts: RwLock<HashMap<String, RunContext>>,
}

impl InMemoryRunContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, run_id: &str) -> Option<RunContext> {
        self.contexts
            .read()
            .ok()
            .and_then(|contexts| contexts.get(run_id).cloned())
    }

    pub fn len(&self) -> usize {
        self.contexts.read().map(|contexts| contexts.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RunContextRegistry for InMemoryRunContextRegistry {
    fn register(&self, run_id: &str, context: RunContext) {
        if let Ok(mut contexts) = self.contexts.write() {
            contexts.insert(run_id.to_string(), context);
        }
    }

    fn clear(&self, run_id: &str) {
        if let Ok(mut contexts) = self.contexts.write() {
            contexts.remove(run_id);
        }
    }
}

/// Registers a context on creation and clears it on drop.
pub struct RunContextGuard {
    registry: Arc<dyn RunContextRegistry>,
    run_id: String,
}

impl RunContextGuard {
    pub fn register(registry: Arc<dyn RunContextRegistry>, context: RunContext) -> Self {
        let run_id = context.run_id.clone();
        registry.register(&run_id, context);
        tracing::debug!(run_id = %run_id, "run context registered");
        Self { registry, run_id }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

impl Drop for RunContextGuard {
    fn drop(&mut self) {
        self.registry.clear(&self.run_id);
        tracing::debug!(run_id = %self.run_id, "run context cleared");
    }
}
