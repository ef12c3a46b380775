//! Daemon configuration from command-line flags and environment variables.
//!
//! Every flag has an environment fallback so the daemon can be configured
//! entirely through the environment in containers:
//!
//! ```text
//! DOCQA_HOST=0.0.0.0 DOCQA_PORT=5000 UPLOAD_FOLDER=/data/uploads \
//! HF_TOKEN=hf_xxx docqa-daemon
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::extract::OcrConfig;
use crate::inference::{HuggingFaceConfig, DEFAULT_API_URL, DEFAULT_QA_MODEL};
use crate::sweeper::DEFAULT_FILE_MAX_AGE;

/// Default upload size limit: 16 MiB.
pub const DEFAULT_MAX_FILE_SIZE: usize = 16 * 1024 * 1024;

/// docqa daemon: upload a document, ask questions about it
#[derive(Parser, Debug, Clone)]
#[command(name = "docqa-daemon")]
#[command(about = "Upload PDFs or images and ask questions about their text")]
#[command(version)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "DOCQA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// HTTP port to listen on
    #[arg(short, long, env = "DOCQA_PORT", default_value = "5000")]
    pub port: u16,

    /// Directory uploaded files are written to
    #[arg(long, env = "UPLOAD_FOLDER", default_value = "uploads")]
    pub upload_folder: PathBuf,

    /// Directory holding index.html and js/
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Maximum upload size in bytes
    #[arg(long, env = "MAX_FILE_SIZE", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: usize,

    /// Hugging Face API token; without it only local answering is used
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Question-answering model id
    #[arg(long, env = "HF_MODEL", default_value = DEFAULT_QA_MODEL)]
    pub hf_model: String,

    /// Base URL of the inference API
    #[arg(long, env = "HF_API_URL", default_value = DEFAULT_API_URL)]
    pub hf_api_url: String,

    /// Seconds to wait for the inference API before falling back
    #[arg(long, env = "HF_TIMEOUT_SECS", default_value = "30")]
    pub hf_timeout_secs: u64,

    /// Uploads older than this many seconds are deleted by the sweeper
    #[arg(long, env = "FILE_MAX_AGE_SECS", default_value_t = DEFAULT_FILE_MAX_AGE.as_secs())]
    pub file_max_age_secs: u64,

    /// Sessions idle longer than this many seconds are dropped
    #[arg(long, env = "SESSION_TTL_SECS", default_value = "3600")]
    pub session_ttl_secs: u64,

    /// Seconds between sweeps
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value = "300")]
    pub sweep_interval_secs: u64,

    /// tesseract binary
    #[arg(long, env = "TESSERACT_BIN", default_value = "tesseract")]
    pub tesseract: PathBuf,

    /// pdftoppm binary
    #[arg(long, env = "PDFTOPPM_BIN", default_value = "pdftoppm")]
    pub pdftoppm: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated daemon settings.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_file_size: usize,
    pub inference: Option<HuggingFaceConfig>,
    pub ocr: OcrConfig,
    pub file_max_age: Duration,
    pub session_ttl: Duration,
    pub sweep_interval: Duration,
}

impl DaemonConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", cli.host, cli.port))?;

        if cli.max_file_size == 0 {
            bail!("MAX_FILE_SIZE must be greater than zero");
        }
        if cli.hf_timeout_secs == 0 {
            bail!("HF_TIMEOUT_SECS must be greater than zero");
        }
        if cli.sweep_interval_secs == 0 {
            bail!("SWEEP_INTERVAL_SECS must be greater than zero");
        }

        let inference = cli
            .hf_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| HuggingFaceConfig {
                base_url: cli.hf_api_url.clone(),
                token: token.to_string(),
                model: cli.hf_model.clone(),
                timeout: Duration::from_secs(cli.hf_timeout_secs),
            });

        Ok(Self {
            addr,
            upload_dir: cli.upload_folder.clone(),
            static_dir: cli.static_dir.clone(),
            max_file_size: cli.max_file_size,
            inference,
            ocr: OcrConfig {
                tesseract: cli.tesseract.clone(),
                pdftoppm: cli.pdftoppm.clone(),
                ..OcrConfig::default()
            },
            file_max_age: Duration::from_secs(cli.file_max_age_secs),
            session_ttl: Duration::from_secs(cli.session_ttl_secs),
            sweep_interval: Duration::from_secs(cli.sweep_interval_secs),
        })
    }
}
