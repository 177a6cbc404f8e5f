//! `MEDIA: <url>` token extraction.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const MARKER: &str = "MEDIA:";

fn media_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"MEDIA:[ \t]*(\S+)").expect("media token regex"))
}

/// Text with media markers removed, plus the URLs they referenced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaExtraction {
    pub clean_text: String,
    pub media_urls: Vec<String>,
}

impl MediaExtraction {
    pub fn has_media(&self) -> bool {
        !self.media_urls.is_empty()
    }
}

/// Split `MEDIA: <url>` markers out of `text`.
///
/// A line that holds nothing but markers is dropped; a marker inside prose is
/// cut out of its line. URLs keep encounter order and are not repeated. Text
/// without markers comes back unchanged.
pub fn extract_media(text: &str) -> MediaExtraction {
    let re = media_token();
    if !text.contains(MARKER) || !re.is_match(text) {
        return MediaExtraction {
            clean_text: text.to_string(),
            media_urls: Vec::new(),
        };
    }

    let mut media_urls: Vec<String> = Vec::new();
    let mut kept: Vec<String> = Vec::new();
    for line in text.lines() {
        if !re.is_match(line) {
            kept.push(line.to_string());
            continue;
        }
        let mut rest = line.to_string();
        while let Some(caps) = re.captures(&rest) {
            let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            // A marker directly followed by another marker carries no URL.
            if target.as_str().starts_with(MARKER) {
                let marker = whole.start()..target.start();
                rest.replace_range(marker, "");
                continue;
            }
            let url = trim_url(target.as_str());
            if !url.is_empty() && !media_urls.iter().any(|seen| seen == url) {
                media_urls.push(url.to_string());
            }
            let range = whole.range();
            rest.replace_range(range, "");
        }
        if !rest.trim().is_empty() {
            kept.push(rest.trim_end().to_string());
        }
    }

    MediaExtraction {
        clean_text: kept.join("\n").trim().to_string(),
        media_urls,
    }
}

fn trim_url(raw: &str) -> &str {
    raw.trim_matches(|c: char| matches!(c, '`' | '"' | '\'' | '<' | '>' | '(' | ')' | ','))
}
