//! End-to-end tests of the local answering path.
//!
//! No backend is configured, so every answer comes from
//! segment -> rank -> compose.

use docqa_core::{
    escape_markup, AnsweringService, INVALID_INPUT_ANSWER, MAX_CONTEXT_LENGTH,
    NO_RELEVANT_ANSWER,
};

const DOCUMENT: &str = "The Eiffel Tower was completed in 1889 for the World's Fair.
It was designed by the engineering firm of Gustave Eiffel.
Visitors climb the tower to enjoy views over Paris & the Seine.
Ok.";

#[tokio::test]
async fn answer_is_total_for_non_empty_inputs() {
    let service = AnsweringService::local_only();
    let queries = ["?", "x", "what", "tower", "<script>", "who designed it", "\u{1F600}"];
    let contexts = [".", "a", DOCUMENT, "!!!\n\n???", "\u{1F600}\u{1F600}"];

    for query in queries {
        for context in contexts {
            let answer = service.answer(query, context).await;
            assert!(!answer.is_empty(), "empty answer for {:?} / {:?}", query, context);
        }
    }
}

#[tokio::test]
async fn overlapping_sentence_appears_in_answer() {
    let service = AnsweringService::local_only();
    let answer = service.answer("views over paris", DOCUMENT).await;
    let expected = escape_markup("Visitors climb the tower to enjoy views over Paris & the Seine");
    assert!(answer.contains(expected.as_ref()), "got {:?}", answer);
    assert!(answer.contains("&amp;"));
}

#[tokio::test]
async fn who_question_uses_circumstance_prefix() {
    let service = AnsweringService::local_only();
    let answer = service.answer("Who designed the tower", DOCUMENT).await;
    assert!(answer.starts_with("Based on the document: "), "got {:?}", answer);
}

#[tokio::test]
async fn no_overlap_yields_no_match_message() {
    let service = AnsweringService::local_only();
    assert_eq!(
        service.answer("submarine", DOCUMENT).await,
        NO_RELEVANT_ANSWER
    );
}

#[tokio::test]
async fn short_fragments_never_answer() {
    let service = AnsweringService::local_only();
    // "Ok" is the only match and is too short to be a sentence
    assert_eq!(service.answer("ok", DOCUMENT).await, NO_RELEVANT_ANSWER);
}

#[tokio::test]
async fn empty_inputs_are_rejected() {
    let service = AnsweringService::local_only();
    assert_eq!(service.answer("", DOCUMENT).await, INVALID_INPUT_ANSWER);
    assert_eq!(service.answer("tower", "").await, INVALID_INPUT_ANSWER);
}

#[tokio::test]
async fn content_past_the_cutoff_is_invisible() {
    let service = AnsweringService::local_only();
    let mut context = "x".repeat(MAX_CONTEXT_LENGTH - 5);
    context.push_str(". The platypus lays eggs.");
    assert_eq!(service.answer("platypus", &context).await, NO_RELEVANT_ANSWER);
}
