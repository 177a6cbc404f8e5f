//! Internal hook-event publishing interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BoxError;

/// An event published to the application's internal hook system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookEvent {
    /// Event family, e.g. `agent`.
    pub domain: String,
    /// Event name within the domain, e.g. `tool:result`.
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    pub context: Value,
    pub timestamp: DateTime<Utc>,
}

impl HookEvent {
    pub fn new(domain: &str, action: &str, session_key: Option<&str>, context: Value) -> Self {
        Self {
            domain: domain.to_string(),
            action: action.to_string(),
            session_key: session_key.map(str::to_string),
            context,
            timestamp: Utc::now(),
        }
    }

    /// `domain:action`, the key subscribers register under.
    pub fn key(&self) -> String {
        format!("{}:{}", self.domain, self.action)
    }
}

#[async_trait]
pub trait InternalHooks: Send + Sync {
    fn create_event(
        &self,
        domain: &str,
        action: &str,
        session_key: Option<&str>,
        context: Value,
    ) -> HookEvent {
        HookEvent::new(domain, action, session_key, context)
    }

    async fn trigger(&self, event: HookEvent) -> Result<(), BoxError>;
}

/// Hooks that publish nowhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInternalHooks;

#[async_trait]
impl InternalHooks for NoopInternalHooks {
    async fn trigger(&self, event: HookEvent) -> Result<(), BoxError> {
        tracing::trace!(hook = %event.key(), "internal hook dropped");
        Ok(())
    }
}
