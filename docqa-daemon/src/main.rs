//! docqa daemon - Upload a document, ask questions about it.
//!
//! A single Rust binary that provides:
//! - HTTP upload endpoint with PDF text extraction and OCR fallback
//! - Question answering through a hosted model, with a local fallback
//! - Periodic cleanup of old uploads and idle sessions

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use docqa_core::{AnsweringService, InMemorySessionStore, SessionStore};
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use docqa_daemon::config::{Cli, DaemonConfig};
use docqa_daemon::extract::SystemExtractor;
use docqa_daemon::inference::HuggingFaceClient;
use docqa_daemon::server::{create_router, AppState};
use docqa_daemon::sweeper::Sweeper;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = DaemonConfig::from_cli(&cli)?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload directory {:?}", config.upload_dir))?;
    info!("Upload directory: {:?}", config.upload_dir);

    let answering = match &config.inference {
        Some(hf) => match HuggingFaceClient::new(hf.clone()) {
            Ok(client) => {
                info!("Remote inference enabled with model {}", hf.model);
                AnsweringService::with_backend(Arc::new(client), hf.timeout)
            }
            Err(e) => {
                warn!("Failed to initialize inference client, using local answering: {}", e);
                AnsweringService::local_only()
            }
        },
        None => {
            info!("HF_TOKEN not set, using local answering only");
            AnsweringService::local_only()
        }
    };

    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let state = AppState {
        answering: Arc::new(answering),
        sessions: sessions.clone(),
        extractor: Arc::new(SystemExtractor::new(config.ocr.clone())),
        upload_dir: config.upload_dir.clone(),
        static_dir: config.static_dir.clone(),
        max_upload_bytes: config.max_file_size,
        start_time: Instant::now(),
    };

    // First tick fires immediately, so this also covers startup cleanup
    let sweeper = Sweeper::new(
        config.upload_dir.clone(),
        config.file_max_age,
        sessions,
        config.session_ttl,
    );
    tokio::spawn(sweeper.run(config.sweep_interval));

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("docqa daemon listening on http://{}", config.addr);

    axum::serve(listener, router).await?;
    Ok(())
}
