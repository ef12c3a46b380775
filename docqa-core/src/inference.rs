//! Remote inference backend trait.
//!
//! The answering service only needs "ask a question about this context and
//! maybe get an answer back". The HTTP client that talks to a hosted model
//! lives in the daemon; this module defines the seam so the core never
//! depends on a network stack.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

/// Error type for inference calls.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// Request could not be sent or no response arrived
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The call did not finish in time
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Result type for inference operations.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Extractive answer returned by a question-answering model.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct QaAnswer {
    pub answer: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

/// Outcome of a single remote attempt, as seen by the answering service.
#[derive(Debug)]
pub enum InferenceOutcome {
    /// The backend produced a usable answer.
    Answered(QaAnswer),
    /// The backend failed; the reason is only logged.
    Failed(InferenceError),
}

impl From<InferenceResult<QaAnswer>> for InferenceOutcome {
    fn from(result: InferenceResult<QaAnswer>) -> Self {
        match result {
            Ok(answer) if answer.answer.trim().is_empty() => InferenceOutcome::Failed(
                InferenceError::Malformed("empty answer field".to_string()),
            ),
            Ok(answer) => InferenceOutcome::Answered(answer),
            Err(e) => InferenceOutcome::Failed(e),
        }
    }
}

/// A remote question-answering model.
///
/// # Example
///
/// ```ignore
/// use docqa_core::inference::{InferenceBackend, InferenceResult, QaAnswer};
///
/// struct Canned;
///
/// impl InferenceBackend for Canned {
///     fn question_answering<'a>(
///         &'a self,
///         _question: &'a str,
///         _context: &'a str,
///     ) -> Pin<Box<dyn Future<Output = InferenceResult<QaAnswer>> + Send + 'a>> {
///         Box::pin(async move {
///             Ok(QaAnswer { answer: "42".into(), score: 1.0, start: None, end: None })
///         })
///     }
///
///     fn model_name(&self) -> &str {
///         "canned"
///     }
/// }
/// ```
pub trait InferenceBackend: Send + Sync {
    /// Ask `question` about `context`.
    fn question_answering<'a>(
        &'a self,
        question: &'a str,
        context: &'a str,
    ) -> Pin<Box<dyn Future<Output = InferenceResult<QaAnswer>> + Send + 'a>>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}
