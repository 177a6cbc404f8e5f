//! Answer-text cleanup: thinking tags and compaction handoff scaffolding.

use std::sync::OnceLock;

use regex::Regex;

/// Lines that mark the start of compaction-handoff scaffolding. Matched
/// case-insensitively anywhere within a line.
pub const COMPACTION_HANDOFF_MARKERS: &[&str] = &[
    "please continue the conversation from where we left it off without asking the user any further questions",
    "this session is being continued from a previous conversation that ran out of context",
];

struct ThinkingPatterns {
    closed: Regex,
    unterminated: Regex,
    orphan_close: Regex,
}

fn thinking_patterns() -> &'static ThinkingPatterns {
    static PATTERNS: OnceLock<ThinkingPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ThinkingPatterns {
        closed: Regex::new(r"(?is)<think(?:ing)?\s*>.*?</think(?:ing)?\s*>")
            .expect("closed thinking regex"),
        unterminated: Regex::new(r"(?is)<think(?:ing)?\s*>.*\z").expect("open thinking regex"),
        orphan_close: Regex::new(r"(?i)</think(?:ing)?\s*>").expect("close thinking regex"),
    })
}

/// Remove `<thinking>`/`<think>` spans (case-insensitive, non-greedy).
///
/// An opening tag with no close swallows the rest of the text; stray closing
/// tags are dropped.
pub fn strip_thinking_tags(text: &str) -> String {
    let patterns = thinking_patterns();
    let stripped = patterns.closed.replace_all(text, "");
    let stripped = patterns.unterminated.replace(&stripped, "");
    patterns.orphan_close.replace_all(&stripped, "").into_owned()
}

/// Cut the text at the first compaction-handoff marker line.
pub fn strip_compaction_handoff(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for line in text.lines() {
        let lowered = line.to_lowercase();
        if COMPACTION_HANDOFF_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            return kept.join("\n");
        }
        kept.push(line);
    }
    text.to_string()
}

/// Clean answer text for delivery. Idempotent.
pub fn sanitize(text: &str) -> String {
    let mut current = sanitize_once(text);
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn sanitize_once(text: &str) -> String {
    let without_thinking = strip_thinking_tags(text);
    strip_compaction_handoff(&without_thinking).trim().to_string()
}
