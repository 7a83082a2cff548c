//! Markup stripping for embedding input.
//!
//! The stored record keeps the raw markdown; only the text handed to the
//! embedding model is cleaned. Link targets, table rules, and emphasis
//! markers carry no semantic content and just waste encoder context.

use regex::Regex;

pub struct Normalizer {
    link_re: Regex,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            link_re: Regex::new(r"\[[^\]]*\]\([^)]*\)").expect("valid pattern"),
        }
    }

    /// Strip markdown noise and collapse whitespace.
    pub fn normalize(&self, raw: &str) -> String {
        let text = self.link_re.replace_all(raw, " ");
        let text: String = text
            .chars()
            .map(|c| match c {
                '|' | '-' | '#' | '*' | '`' | '>' => ' ',
                other => other,
            })
            .collect();
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Build the embedding input for one section: normalized header joined to
    /// normalized body, hard-truncated to `max_chars` characters. Truncation
    /// is silent and deterministic.
    pub fn embedding_input(&self, header: &str, body: &str, max_chars: usize) -> String {
        let joined = format!("{}. {}", self.normalize(header), self.normalize(body));
        truncate_chars(joined, max_chars)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate to at most `max` characters, respecting char boundaries.
fn truncate_chars(mut s: String, max: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
    s
}
