//! Sentence segmentation.
//!
//! A paragraph is split at boundaries following sentence-terminal
//! punctuation (`.`, `!`, `?`) followed by whitespace. Deterministic and
//! total: no failure modes, empty input yields an empty sequence. Indices
//! into the returned sequence are stable until the paragraph is mutated
//! and re-segmented.

use regex::Regex;

/// Split a paragraph into ordered, trimmed, non-empty sentences.
pub fn segment(paragraph: &str) -> Vec<String> {
    let trimmed = paragraph.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    // Boundary: terminal punctuation immediately followed by whitespace.
    // The split point sits after the punctuation character.
    let boundary = Regex::new(r"[.!?]\s+").expect("sentence boundary pattern is valid");

    let mut sentences = Vec::new();
    let mut start = 0;
    for m in boundary.find_iter(trimmed) {
        // '.', '!' and '?' are single-byte, so +1 lands on a char boundary.
        let end = m.start() + 1;
        let piece = trimmed[start..end].trim();
        if !piece.is_empty() {
            sentences.push(piece.to_string());
        }
        start = m.end();
    }

    let tail = trimmed[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}
