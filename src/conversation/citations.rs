//! Inline citation markers
//!
//! Splits assistant text into plain runs and bracketed markers such as `[3]`
//! or `[2, 7]`.

use once_cell::sync::Lazy;
use regex::Regex;

static CITATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([0-9,\s]+)\]").expect("citation pattern is valid"));

/// A bracketed citation group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationMarker {
    /// Bracket content exactly as written, e.g. `2, 7`
    pub label: String,
    /// Every integer found in the group, in order
    pub numbers: Vec<u32>,
}

impl CitationMarker {
    fn parse(label: &str) -> Self {
        let numbers = label.split(',').filter_map(leading_int).collect();
        Self {
            label: label.to_string(),
            numbers,
        }
    }

    /// Source number a click should jump to
    pub fn target(&self) -> Option<u32> {
        self.numbers.first().copied()
    }

    /// Visible text including brackets
    pub fn display(&self) -> String {
        format!("[{}]", self.label)
    }
}

/// Piece of rendered assistant text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Marker(CitationMarker),
}

/// Split assistant text into alternating text and marker segments.
///
/// The result always starts and ends with a `Text` segment, which may be empty,
/// so markers sit at odd positions.
pub fn parse_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in CITATION_RE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        segments.push(Segment::Text(text[last..whole.start()].to_string()));
        segments.push(Segment::Marker(CitationMarker::parse(inner.as_str())));
        last = whole.end();
    }
    segments.push(Segment::Text(text[last..].to_string()));

    segments
}

/// Integer prefix of a trimmed piece; pieces without one are skipped
fn leading_int(piece: &str) -> Option<u32> {
    let piece = piece.trim();
    let end = piece
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(piece.len());
    piece[..end].parse().ok()
}
