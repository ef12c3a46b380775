//! Lexical relevance ranking.
//!
//! A sentence scores one point for every distinct query word it also
//! contains. Words are lower-cased and split on whitespace only, so
//! punctuation stays attached to the word it follows.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::TOP_K;

/// A sentence paired with its overlap score.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoredSentence {
    pub score: usize,
    pub text: String,
}

impl ScoredSentence {
    /// Descending score, then descending text.
    ///
    /// The text comparison only matters for ties and keeps the ordering
    /// total, so rankings are reproducible across runs.
    fn rank_order(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| other.text.cmp(&self.text))
    }
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Count the distinct query words present in `sentence`.
pub fn score(query: &str, sentence: &str) -> usize {
    let query_words = word_set(query);
    let sentence_words = word_set(sentence);
    query_words.intersection(&sentence_words).count()
}

/// Score every sentence, drop the ones with no overlap and keep the best
/// [`TOP_K`].
pub fn rank_scored<S: AsRef<str>>(query: &str, sentences: &[S]) -> Vec<ScoredSentence> {
    let query_words = word_set(query);
    if query_words.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredSentence> = sentences
        .iter()
        .filter_map(|sentence| {
            let sentence = sentence.as_ref();
            let overlap = word_set(sentence).intersection(&query_words).count();
            (overlap > 0).then(|| ScoredSentence {
                score: overlap,
                text: sentence.to_string(),
            })
        })
        .collect();

    scored.sort_by(ScoredSentence::rank_order);
    scored.truncate(TOP_K);
    scored
}

/// Like [`rank_scored`], without the scores.
pub fn rank<S: AsRef<str>>(query: &str, sentences: &[S]) -> Vec<String> {
    rank_scored(query, sentences)
        .into_iter()
        .map(|s| s.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_collapses_duplicates() {
        assert_eq!(score("paris paris paris", "Paris is in France"), 1);
        assert_eq!(score("Capital CITY", "the capital city of France"), 2);
        assert_eq!(score("nothing", "the capital city"), 0);
    }

    #[test]
    fn test_rank_capital_example() {
        let sentences = [
            "The capital is Paris",
            "I like apples",
            "The capital of France is Paris city",
        ];
        let ranked = rank("what is the capital", &sentences);
        assert_eq!(
            ranked,
            vec!["The capital of France is Paris city", "The capital is Paris"]
        );
    }

    #[test]
    fn test_rank_orders_by_score() {
        let sentences = [
            "rust is fast",
            "rust is fast and safe and fun",
            "rust",
        ];
        let ranked = rank_scored("rust fast safe fun", &sentences);
        let scores: Vec<usize> = ranked.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![4, 2, 1]);
        assert_eq!(ranked[0].text, "rust is fast and safe and fun");
    }

    #[test]
    fn test_rank_keeps_top_three() {
        let sentences = [
            "alpha one here",
            "alpha two here",
            "alpha three here",
            "alpha four here",
            "alpha five here",
        ];
        let ranked = rank("alpha", &sentences);
        assert_eq!(ranked.len(), TOP_K);
        for sentence in &ranked {
            assert!(score("alpha", sentence) >= 1);
        }
    }

    #[test]
    fn test_rank_tie_break_is_deterministic() {
        let forward = ["beta shared words", "alpha shared words", "gamma shared words"];
        let backward = ["gamma shared words", "alpha shared words", "beta shared words"];
        let a = rank("shared words", &forward);
        let b = rank("shared words", &backward);
        assert_eq!(a, b);
        assert_eq!(a[0], "gamma shared words");
    }

    #[test]
    fn test_rank_empty_inputs() {
        let none: [&str; 0] = [];
        assert!(rank("anything", &none).is_empty());
        assert!(rank("", &["some sentence here"]).is_empty());
        assert!(rank("   ", &["some sentence here"]).is_empty());
    }

    #[test]
    fn test_rank_punctuation_is_part_of_word() {
        // "work?" and "work" are different tokens
        assert_eq!(score("does it work?", "it will work"), 1);
    }
}
