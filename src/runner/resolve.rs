//! Final-answer resolution.

use crate::text::{extract_media, sanitize};
use crate::turns::TurnTracker;

/// Text and media chosen as the run's answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Answer {
    pub text: String,
    pub media_urls: Vec<String>,
}

impl Answer {
    fn new(text: String, media_urls: Vec<String>) -> Option<Self> {
        (!text.is_empty() || !media_urls.is_empty()).then_some(Self { text, media_urls })
    }
}

/// How a run that reached the end of its stream turns out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    Answer(Answer),
    /// A messaging tool already delivered the reply.
    DeliveredByTool,
    NoOutput,
}

/// Pick the answer from a terminal `result` field, else from the turns.
///
/// 1. a `result` that is non-empty after media extraction and sanitizing;
/// 2. the last turn, sanitized;
/// 3. every turn, sanitized, when the last one is empty.
pub(crate) fn resolve_answer(result_field: Option<&str>, turns: &TurnTracker) -> Option<Answer> {
    if let Some(result) = result_field.filter(|result| !result.trim().is_empty()) {
        let extraction = extract_media(result);
        if let Some(answer) = Answer::new(sanitize(&extraction.clean_text), extraction.media_urls) {
            return Some(answer);
        }
    }

    let last = sanitize(&turns.last_turn_text());
    if !last.is_empty() {
        return Answer::new(last, turns.last_turn_media().to_vec());
    }
    Answer::new(sanitize(&turns.all_turns_text()), turns.all_media())
}

/// Messaging-tool delivery takes precedence over any answer text.
pub(crate) fn finalize(answer: Option<Answer>, delivered_by_tool: bool) -> Resolution {
    match answer {
        _ if delivered_by_tool => Resolution::DeliveredByTool,
        Some(answer) => Resolution::Answer(answer),
        None => Resolution::NoOutput,
    }
}
