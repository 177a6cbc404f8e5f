//! Pure text transforms applied to assistant and tool output.

pub mod media;
pub mod sanitize;

pub use media::{extract_media, MediaExtraction};
pub use sanitize::{sanitize, strip_compaction_handoff, strip_thinking_tags};
