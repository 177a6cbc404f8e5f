//! Fault-isolated callback dispatch.
//!
//! Callbacks are invoked synchronously at dispatch time; the future they return
//! runs on a detached tokio task. Panics and errors from either half are logged
//! and swallowed so a misbehaving consumer can never change a run's outcome.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use strum::IntoStaticStr;
use tokio::runtime::Handle;

use crate::error::{describe, BoxError};
use crate::types::{AgentEvent, ReplyPayload};

/// Future returned by a callback.
pub type CallbackFuture = BoxFuture<'static, Result<(), BoxError>>;

/// A consumer callback.
pub type Callback<T> = Arc<dyn Fn(T) -> CallbackFuture + Send + Sync>;

/// Wrap an async closure as a [`Callback`].
pub fn callback<T, F, Fut>(f: F) -> Callback<T>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    Arc::new(move |arg| f(arg).boxed())
}

/// Named callback slot, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CallbackSlot {
    OnPartialReply,
    OnBlockReply,
    OnToolResult,
    OnAssistantMessageStart,
    OnAgentEvent,
}

/// The five optional consumer callbacks of a run.
#[derive(Clone, Default)]
pub struct RunCallbacks {
    pub on_partial_reply: Option<Callback<ReplyPayload>>,
    pub on_block_reply: Option<Callback<ReplyPayload>>,
    pub on_tool_result: Option<Callback<ReplyPayload>>,
    pub on_assistant_message_start: Option<Callback<()>>,
    pub on_agent_event: Option<Callback<AgentEvent>>,
}

impl fmt::Debug for RunCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunCallbacks")
            .field("on_partial_reply", &self.on_partial_reply.is_some())
            .field("on_block_reply", &self.on_block_reply.is_some())
            .field("on_tool_result", &self.on_tool_result.is_some())
            .field(
                "on_assistant_message_start",
                &self.on_assistant_message_start.is_some(),
            )
            .field("on_agent_event", &self.on_agent_event.is_some())
            .finish()
    }
}

impl RunCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_partial_reply<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ReplyPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.on_partial_reply = Some(callback(f));
        self
    }

    pub fn on_block_reply<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ReplyPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.on_block_reply = Some(callback(f));
        self
    }

    pub fn on_tool_result<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ReplyPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.on_tool_result = Some(callback(f));
        self
    }

    pub fn on_assistant_message_start<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(()) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.on_assistant_message_start = Some(callback(f));
        self
    }

    pub fn on_agent_event<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(AgentEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.on_agent_event = Some(callback(f));
        self
    }

    pub fn partial_reply(&self, payload: ReplyPayload) {
        dispatch(
            CallbackSlot::OnPartialReply,
            self.on_partial_reply.as_ref(),
            payload,
        );
    }

    pub fn block_reply(&self, payload: ReplyPayload) {
        dispatch(CallbackSlot::OnBlockReply, self.on_block_reply.as_ref(), payload);
    }

    pub fn tool_result(&self, payload: ReplyPayload) {
        dispatch(CallbackSlot::OnToolResult, self.on_tool_result.as_ref(), payload);
    }

    pub fn assistant_message_start(&self) {
        dispatch(
            CallbackSlot::OnAssistantMessageStart,
            self.on_assistant_message_start.as_ref(),
            (),
        );
    }

    pub fn agent_event(&self, event: AgentEvent) {
        dispatch(CallbackSlot::OnAgentEvent, self.on_agent_event.as_ref(), event);
    }
}

/// Invoke `callback` if present. Never panics, never propagates.
pub fn dispatch<T>(slot: CallbackSlot, callback: Option<&Callback<T>>, arg: T) {
    let Some(callback) = callback else {
        return;
    };
    let label: &'static str = slot.into();
    match panic::catch_unwind(AssertUnwindSafe(|| callback(arg))) {
        Ok(future) => spawn_isolated(label, future),
        Err(payload) => {
            tracing::warn!(
                callback = label,
                panic = %panic_message(payload.as_ref()),
                "callback panicked"
            );
        }
    }
}

/// Drive `future` on a detached task, logging errors and panics.
pub(crate) fn spawn_isolated(label: &'static str, future: CallbackFuture) {
    let guarded = async move {
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::warn!(callback = label, error = %describe(err.as_ref()), "callback failed");
            }
            Err(payload) => {
                tracing::warn!(
                    callback = label,
                    panic = %panic_message(payload.as_ref()),
                    "callback future panicked"
                );
            }
        }
    };
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(guarded);
        }
        Err(_) => {
            tracing::warn!(callback = label, "no tokio runtime; callback future dropped");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
