//! Sentence segmentation.
//!
//! Boundaries are any run of `.`, `!`, `?` or newline characters. Pieces that
//! are too short to carry meaning on their own are dropped.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::MIN_SENTENCE_CHARS;

static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?\n]+").unwrap());

/// Split text into trimmed sentences longer than [`MIN_SENTENCE_CHARS`].
///
/// Document order is preserved. Empty input yields an empty vector, and so
/// does a short input with no boundary punctuation.
pub fn segment(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    SENTENCE_BOUNDARY
        .split(text)
        .map(str::trim)
        .filter(|piece| piece.chars().count() > MIN_SENTENCE_CHARS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_drops_short_fragments() {
        let sentences = segment("This is sentence one. Hi. This is sentence two!");
        assert_eq!(sentences, vec!["This is sentence one", "This is sentence two"]);
    }

    #[test]
    fn test_segment_all_boundaries() {
        let text = "Alpha alpha alpha. Bravo bravo bravo! Charlie charlie? Delta delta delta\nEcho echo echo";
        let sentences = segment(text);
        assert_eq!(
            sentences,
            vec![
                "Alpha alpha alpha",
                "Bravo bravo bravo",
                "Charlie charlie",
                "Delta delta delta",
                "Echo echo echo",
            ]
        );
    }

    #[test]
    fn test_segment_collapses_boundary_runs() {
        let sentences = segment("Wait for it...!?\n\nThen something happens");
        assert_eq!(sentences, vec!["Wait for it", "Then something happens"]);
    }

    #[test]
    fn test_segment_empty_and_short() {
        assert!(segment("").is_empty());
        assert!(segment("short text").is_empty());
        assert!(segment("   \n\n  ").is_empty());
    }

    #[test]
    fn test_segment_length_counts_chars_not_bytes() {
        // 10 characters but more than 10 bytes
        assert!(segment("ééééééééé é").len() == 1);
        assert!(segment("éééééééééé").is_empty());
    }

    #[test]
    fn test_segment_is_restartable() {
        let text = "The first sentence here. The second sentence here.";
        assert_eq!(segment(text), segment(text));
    }
}
