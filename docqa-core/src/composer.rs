//! Answer composition.
//!
//! The question is classified by keyword into a [`QuestionKind`], and the
//! kind picks the phrase the best sentence is wrapped in.

use crate::security::sanitize;
use crate::NO_RELEVANT_ANSWER;

/// Broad category of a question, used only to choose phrasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    Definition,
    Process,
    Explanation,
    Circumstance,
    Other,
}

impl QuestionKind {
    /// Phrase placed in front of the answer sentence.
    pub fn prefix(&self) -> &'static str {
        match self {
            QuestionKind::Definition => "According to the document: ",
            QuestionKind::Process => "The process described is: ",
            QuestionKind::Explanation => "The explanation provided is: ",
            QuestionKind::Circumstance => "Based on the document: ",
            QuestionKind::Other => "From the document: ",
        }
    }
}

/// A keyword rule: any keyword contained in the question selects `kind`.
pub struct ClassificationRule {
    pub keywords: &'static [&'static str],
    pub kind: QuestionKind,
}

/// Rules in priority order. The first rule with a matching keyword wins.
pub static CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        keywords: &["what", "define"],
        kind: QuestionKind::Definition,
    },
    ClassificationRule {
        keywords: &["how", "process"],
        kind: QuestionKind::Process,
    },
    ClassificationRule {
        keywords: &["why", "reason"],
        kind: QuestionKind::Explanation,
    },
    ClassificationRule {
        keywords: &["when", "where", "who"],
        kind: QuestionKind::Circumstance,
    },
];

/// Classify a question.
///
/// Matching is substring containment on the lower-cased question, so
/// "somewhat" counts as a "what" question.
pub fn classify(query: &str) -> QuestionKind {
    let lowered = query.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|rule| rule.kind)
        .unwrap_or(QuestionKind::Other)
}

/// Build the answer from ranked sentences, best first.
///
/// Only the first sentence is used. It is sanitized before being returned.
pub fn compose<S: AsRef<str>>(query: &str, ranked: &[S]) -> String {
    let Some(primary) = ranked.first() else {
        return NO_RELEVANT_ANSWER.to_string();
    };

    let kind = classify(query);
    format!("{}{}", kind.prefix(), sanitize(primary.as_ref()))
}
