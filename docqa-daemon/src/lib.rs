//! docqa daemon library - HTTP front end for document question answering.
//!
//! This library provides:
//! - Configuration (flags with environment fallbacks)
//! - Text extraction from PDFs and images
//! - The Hugging Face inference backend
//! - HTTP routes, session-aware upload handling and the maintenance sweeper

pub mod config;
pub mod extract;
pub mod inference;
pub mod server;
pub mod sweeper;
