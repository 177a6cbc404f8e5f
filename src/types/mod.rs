//! Core types for sdk-runner.

pub mod agent_event;
pub mod result;

pub use agent_event::*;
pub use result::*;
