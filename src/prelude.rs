//! Convenience re-exports for common use.

pub use crate::callbacks::RunCallbacks;
pub use crate::config::{ProviderConfig, RunnerConfig};
pub use crate::context::{InMemoryRunContextRegistry, RunContextRegistry};
pub use crate::error::{BoxError, Result, RunnerError};
pub use crate::events::{classify, EventCategory, RawEvent};
pub use crate::hooks::{InternalHooks, NoopInternalHooks};
pub use crate::mcp::{StaticToolBridge, ToolBridge, ToolDescriptor};
pub use crate::runner::{RunParams, RunnerDeps, SdkRunner};
pub use crate::sdk::{AgentSdk, ReplaySdk, ReplaySdkLoader, SdkLoader};
pub use crate::types::{AgentEvent, Payload, ReplyPayload, RunErrorKind, RunResult};
