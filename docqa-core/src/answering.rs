//! Answering service.
//!
//! Tries the remote backend first when one is configured, and falls back to
//! segment -> rank -> compose on any failure. The public entry point never
//! fails: the worst case is the explicit no-match answer.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::composer::{classify, compose};
use crate::inference::{InferenceBackend, InferenceError, InferenceOutcome};
use crate::ranker::rank_scored;
use crate::security::sanitize;
use crate::segmenter::segment;
use crate::{INVALID_INPUT_ANSWER, MAX_CONTEXT_LENGTH};

/// Default bound on a remote call.
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Cut `context` to at most [`MAX_CONTEXT_LENGTH`] characters.
///
/// The cut is not sentence-aware and may split a sentence in two.
pub fn truncate_context(context: &str) -> &str {
    match context.char_indices().nth(MAX_CONTEXT_LENGTH) {
        Some((byte_idx, _)) => &context[..byte_idx],
        None => context,
    }
}

/// Answers questions about a document context.
///
/// Holds no per-call state, so a single instance can be shared behind an
/// `Arc` and called concurrently.
#[derive(Clone)]
pub struct AnsweringService {
    backend: Option<Arc<dyn InferenceBackend>>,
    timeout: Duration,
}

impl AnsweringService {
    /// Service that never leaves the process.
    pub fn local_only() -> Self {
        Self {
            backend: None,
            timeout: DEFAULT_INFERENCE_TIMEOUT,
        }
    }

    /// Service that asks `backend` first, waiting at most `timeout`.
    pub fn with_backend(backend: Arc<dyn InferenceBackend>, timeout: Duration) -> Self {
        Self {
            backend: Some(backend),
            timeout,
        }
    }

    /// Whether a remote backend is configured.
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Answer `query` about `context`.
    pub async fn answer(&self, query: &str, context: &str) -> String {
        if query.trim().is_empty() || context.trim().is_empty() {
            return INVALID_INPUT_ANSWER.to_string();
        }

        let context = truncate_context(context);

        if let Some(backend) = &self.backend {
            let sanitized_query = sanitize(query);
            match self.ask_remote(backend.as_ref(), &sanitized_query, context).await {
                InferenceOutcome::Answered(qa) => {
                    info!(
                        model = backend.model_name(),
                        score = qa.score,
                        "Remote inference answered"
                    );
                    return sanitize(&qa.answer);
                }
                InferenceOutcome::Failed(e) => {
                    warn!(model = backend.model_name(), "Remote inference failed: {}", e);
                }
            }
        }

        self.answer_locally(query, context)
    }

    /// Answer without any backend.
    ///
    /// Expects a context that has already been truncated; the invalid-input
    /// check still applies.
    pub fn answer_locally(&self, query: &str, context: &str) -> String {
        if query.trim().is_empty() || context.trim().is_empty() {
            return INVALID_INPUT_ANSWER.to_string();
        }

        info!("Using local fallback");
        let query = query.trim();
        let sentences = segment(context);
        let ranked = rank_scored(query, &sentences);
        debug!(
            kind = ?classify(query),
            sentences = sentences.len(),
            matches = ranked.len(),
            top_score = ranked.first().map(|s| s.score).unwrap_or(0),
            "Ranked context"
        );

        let texts: Vec<&str> = ranked.iter().map(|s| s.text.as_str()).collect();
        compose(query, &texts)
    }

    async fn ask_remote(
        &self,
        backend: &dyn InferenceBackend,
        question: &str,
        context: &str,
    ) -> InferenceOutcome {
        match tokio::time::timeout(self.timeout, backend.question_answering(question, context))
            .await
        {
            Ok(result) => InferenceOutcome::from(result),
            Err(_) => InferenceOutcome::Failed(InferenceError::Timeout(self.timeout)),
        }
    }
}

impl Default for AnsweringService {
    fn default() -> Self {
        Self::local_only()
    }
}
