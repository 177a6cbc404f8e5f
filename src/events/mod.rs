//! Raw SDK events and their classification.

pub mod classify;
pub mod raw;

pub use classify::{classify, EventCategory, SdkEvent};
pub use raw::{text_content, RawEvent};
