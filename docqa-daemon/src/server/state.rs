//! Shared application state for the server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use docqa_core::{AnsweringService, SessionStore};

use crate::extract::TextExtractor;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Answers questions; holds the remote backend if one is configured
    pub answering: Arc<AnsweringService>,
    /// Session id -> uploaded files and current context
    pub sessions: Arc<dyn SessionStore>,
    /// Turns uploaded files into text
    pub extractor: Arc<dyn TextExtractor>,
    /// Where uploads are written
    pub upload_dir: PathBuf,
    /// Front-end assets (`index.html`, `js/`)
    pub static_dir: PathBuf,
    /// Request body limit for uploads, in bytes
    pub max_upload_bytes: usize,
    pub start_time: Instant,
}

impl AppState {
    /// Seconds since the server started.
    pub fn uptime_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}
