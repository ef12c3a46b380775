//! HTTP server for the docqa daemon.
//!
//! Provides:
//! - The upload -> extract -> store pipeline
//! - Question answering over a session's document
//! - Session cleanup
//! - Static front-end and uploaded-file serving

mod error;
pub mod files;
mod http;
pub mod state;

pub use error::ApiError;
pub use http::create_router;
pub use state::AppState;
