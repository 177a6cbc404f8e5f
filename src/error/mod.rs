//! Error types for sdk-runner.
//!
//! Run-level failures never surface as Rust errors: [`crate::runner::SdkRunner::run`]
//! folds them into a [`crate::types::RunResult`] carrying a [`crate::types::RunErrorKind`].
//! `RunnerError` covers everything that happens outside a run (configuration,
//! replay files, argument validation).

use thiserror::Error;

/// Boxed error used at collaborator seams (SDK, tool bridge, hooks, callbacks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Primary error type for fallible operations outside a run.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Replay error at line {line}: {message}")]
    Replay { line: usize, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl RunnerError {
    /// Create a replay error tied to a 1-based line number.
    pub fn replay(line: usize, message: impl Into<String>) -> Self {
        Self::Replay {
            line,
            message: message.into(),
        }
    }

    /// Whether the error came from user-supplied input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse(_) | Self::Replay { .. } | Self::InvalidArgument(_)
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Render a collaborator error as a single line, walking its source chain.
pub(crate) fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
