//! Whitespace normalization and word-budget truncation for page text.

use pagelens_types::context::TRUNCATION_MARKER;

/// Normalize raw page text: trim each line, collapse runs of internal
/// whitespace to single spaces, drop empty lines, and join with newlines.
pub fn normalize_page_text(raw: &str) -> String {
    let mut lines = Vec::new();
    for line in raw.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            lines.push(collapsed);
        }
    }
    lines.join("\n")
}

/// Truncate `text` to at most `max_words` whitespace-separated words.
///
/// Returns the (possibly shortened) text and whether a cut happened. The
/// truncated text is a strict prefix of the input (trailing whitespace
/// trimmed) with [`TRUNCATION_MARKER`] appended.
pub fn truncate_words(text: &str, max_words: usize) -> (String, bool) {
    let mut words = 0usize;
    let mut in_word = false;
    let mut cut_at = text.len();

    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            in_word = false;
        } else if !in_word {
            in_word = true;
            words += 1;
            if words > max_words {
                cut_at = idx;
                break;
            }
        }
    }

    if words > max_words {
        let prefix = text[..cut_at].trim_end();
        (format!("{prefix}{TRUNCATION_MARKER}"), true)
    } else {
        (text.to_string(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace_and_drops_empty_lines() {
        let raw = "  Hello    world  \n\n\t\n  second\tline \n";
        assert_eq!(normalize_page_text(raw), "Hello world\nsecond line");
    }

    #[test]
    fn truncate_under_budget_is_identity() {
        let (text, truncated) = truncate_words("one two three", 5);
        assert_eq!(text, "one two three");
        assert!(!truncated);
    }

    #[test]
    fn truncate_cuts_at_word_boundary_with_marker() {
        let (text, truncated) = truncate_words("one two three four", 2);
        assert_eq!(text, format!("one two{TRUNCATION_MARKER}"));
        assert!(truncated);
    }

    #[test]
    fn truncated_text_is_prefix_of_input() {
        let input = normalize_page_text("alpha beta\ngamma delta epsilon");
        let (text, truncated) = truncate_words(&input, 3);
        assert!(truncated);
        let stripped = text.strip_suffix(TRUNCATION_MARKER).unwrap();
        assert!(input.starts_with(stripped));
        assert_eq!(stripped.split_whitespace().count(), 3);
    }

    #[test]
    fn truncate_preserves_newlines_inside_budget() {
        let (text, truncated) = truncate_words("line one\nline two", 3);
        assert_eq!(text, format!("line one\nline{TRUNCATION_MARKER}"));
        assert!(truncated);
    }

    #[test]
    fn truncate_handles_multibyte_input() {
        let (text, truncated) = truncate_words("héllo wörld ünïcode", 2);
        assert!(truncated);
        assert!(text.starts_with("héllo wörld"));
    }

    #[test]
    fn exact_budget_is_not_truncated() {
        let (text, truncated) = truncate_words("a b c", 3);
        assert_eq!(text, "a b c");
        assert!(!truncated);
    }
}
