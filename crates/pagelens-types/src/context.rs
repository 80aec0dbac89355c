//! Page context snapshots: bounded text extracts of the current page.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard ceiling on snapshot size, in whitespace-separated words.
pub const MAX_CONTEXT_WORDS: usize = 3000;

/// Snapshots shorter than this are omitted from chat preambles rather than
/// included -- a near-empty page adds noise, not grounding.
pub const MIN_CONTEXT_WORDS: usize = 20;

/// Appended to a snapshot's text when the word budget cut it short.
pub const TRUNCATION_MARKER: &str = " […]";

/// Where a snapshot's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSourceKind {
    HtmlDocument,
    PdfDocument,
}

impl fmt::Display for PageSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSourceKind::HtmlDocument => write!(f, "html"),
            PageSourceKind::PdfDocument => write!(f, "pdf"),
        }
    }
}

/// A bounded, whitespace-normalized text extract of the current page.
///
/// Never mutated in place: a refresh replaces the snapshot wholesale and
/// bumps `version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContextSnapshot {
    pub source_kind: PageSourceKind,
    pub text: String,
    /// Logical version counter, bumped on every successful extraction.
    pub version: u64,
    /// Whether the word budget truncated the original text.
    pub truncated: bool,
}

impl PageContextSnapshot {
    /// Word count of the snapshot text, not counting the truncation marker.
    pub fn word_count(&self) -> usize {
        let text = match self.text.strip_suffix(TRUNCATION_MARKER) {
            Some(stripped) => stripped,
            None => &self.text,
        };
        text.split_whitespace().count()
    }

    /// Whether the snapshot is long enough to be worth including in a
    /// chat preamble.
    pub fn is_useful(&self, min_words: usize) -> bool {
        self.word_count() >= min_words
    }
}
