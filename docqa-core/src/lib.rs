//! docqa core - Local question answering over extracted document text.
//!
//! This crate holds everything needed to answer a question about a document
//! without touching the network, plus the seams for doing it with a remote
//! model when one is available.
//!
//! # Pipeline
//!
//! - **Segmentation**: split the context into candidate sentences
//! - **Ranking**: score sentences by word overlap with the question
//! - **Composition**: wrap the best sentence in a phrase chosen by question type
//! - **Answering**: try the remote backend, fall back to the local pipeline
//!
//! # Usage
//!
//! ```rust
//! use docqa_core::AnsweringService;
//!
//! # tokio_test::block_on(async {
//! let service = AnsweringService::local_only();
//! let answer = service
//!     .answer("What is the capital?", "The capital of France is Paris. It is big.")
//!     .await;
//! assert_eq!(answer, "According to the document: The capital of France is Paris");
//! # });
//! ```

pub mod answering;
pub mod composer;
pub mod inference;
pub mod ranker;
pub mod security;
pub mod segmenter;
pub mod session;

pub use answering::{truncate_context, AnsweringService};
pub use composer::{classify, compose, QuestionKind, CLASSIFICATION_RULES};
pub use inference::{InferenceBackend, InferenceError, InferenceOutcome, QaAnswer};
pub use ranker::{rank, rank_scored, score, ScoredSentence};
pub use security::escape_markup;
pub use segmenter::segment;
pub use session::{InMemorySessionStore, Session, SessionStore};

/// Maximum number of characters of context used for answering.
pub const MAX_CONTEXT_LENGTH: usize = 2000;

/// Sentences must be strictly longer than this (in characters, after trimming).
pub const MIN_SENTENCE_CHARS: usize = 10;

/// Number of sentences the ranker keeps.
pub const TOP_K: usize = 3;

/// Answer returned when no sentence overlaps the question.
pub const NO_RELEVANT_ANSWER: &str = "No relevant information found in the document";

/// Answer returned when the question or the context is empty.
pub const INVALID_INPUT_ANSWER: &str = "Invalid input provided";
