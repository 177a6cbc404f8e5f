//! Turn/boundary tracking for assistant text.
//!
//! Multi-step runs narrate in several assistant messages ("I will search…",
//! tool call, "Here is the answer…"). Each message boundary opens a new turn;
//! streams that never send a boundary get one implicit turn at the first chunk.

use crate::text::extract_media;

/// Separator used when consolidating chunks and turns.
pub const CHUNK_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Turn {
    chunks: Vec<String>,
    media_urls: Vec<String>,
}

impl Turn {
    fn consolidated(&self) -> String {
        self.chunks.join(CHUNK_SEPARATOR)
    }
}

/// What happened to a chunk fed into [`TurnTracker::on_text_chunk`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkOutcome {
    /// The chunk's text was appended to the current turn.
    pub appended: bool,
    /// Media-free, trimmed chunk text (empty if the chunk held only media).
    pub delta: String,
    /// Media URLs carried by this chunk.
    pub media_urls: Vec<String>,
}

impl ChunkOutcome {
    /// Whether the chunk changed anything observable.
    pub fn is_visible(&self) -> bool {
        self.appended || !self.media_urls.is_empty()
    }
}

/// Accumulates text chunks into turns.
#[derive(Debug, Clone, Default)]
pub struct TurnTracker {
    turns: Vec<Turn>,
    boundaries: usize,
}

impl TurnTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new, empty turn.
    pub fn on_boundary(&mut self) {
        self.boundaries += 1;
        self.turns.push(Turn::default());
    }

    /// Feed one raw text chunk.
    ///
    /// Only a repeat of the immediately preceding chunk in the same turn is
    /// dropped; repeats further apart are kept.
    pub fn on_text_chunk(&mut self, raw: &str) -> ChunkOutcome {
        if self.turns.is_empty() {
            self.turns.push(Turn::default());
        }
        let extraction = extract_media(raw);
        let delta = extraction.clean_text.trim().to_string();
        let Some(turn) = self.turns.last_mut() else {
            return ChunkOutcome::default();
        };

        for url in &extraction.media_urls {
            if !turn.media_urls.contains(url) {
                turn.media_urls.push(url.clone());
            }
        }

        let appended = !delta.is_empty() && turn.chunks.last() != Some(&delta);
        if appended {
            turn.chunks.push(delta.clone());
        }

        ChunkOutcome {
            appended,
            delta,
            media_urls: extraction.media_urls,
        }
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// Number of explicit boundaries seen. Zero means fallback mode.
    pub fn boundary_count(&self) -> usize {
        self.boundaries
    }

    pub fn is_empty(&self) -> bool {
        self.turns.iter().all(|turn| turn.chunks.is_empty())
    }

    pub fn consolidated_text(&self, turn_index: usize) -> Option<String> {
        self.turns.get(turn_index).map(Turn::consolidated)
    }

    pub fn last_turn_text(&self) -> String {
        self.turns.last().map(Turn::consolidated).unwrap_or_default()
    }

    pub fn last_turn_media(&self) -> &[String] {
        self.turns
            .last()
            .map(|turn| turn.media_urls.as_slice())
            .unwrap_or(&[])
    }

    /// Every non-empty turn, in order. Last-resort fallback only.
    pub fn all_turns_text(&self) -> String {
        self.turns
            .iter()
            .map(Turn::consolidated)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR)
    }

    pub fn all_media(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for url in self.turns.iter().flat_map(|turn| turn.media_urls.iter()) {
            if !urls.contains(url) {
                urls.push(url.clone());
            }
        }
        urls
    }
}
