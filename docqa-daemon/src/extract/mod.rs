//! Text extraction from uploaded files.
//!
//! PDFs are read through their text layer first and rendered to images for
//! OCR when that yields nothing. Images go straight to OCR. When nothing
//! readable comes back either way the result is [`NO_TEXT_EXTRACTED`].
//! OCR shells out to `pdftoppm` (Poppler) and `tesseract`.

mod ocr;
mod pdf;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::{info, warn};

pub use ocr::OcrConfig;

/// Returned when a PDF has neither a text layer nor any OCR-able content.
pub const NO_TEXT_EXTRACTED: &str = "No text could be extracted";

/// What kind of file an upload is, as far as extraction cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Document,
    Image,
}

impl MediaKind {
    /// Classify by lower-cased extension including the dot, e.g. `".pdf"`.
    pub fn from_extension(ext: &str) -> Self {
        if ext == ".pdf" {
            MediaKind::Document
        } else {
            MediaKind::Image
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, MediaKind::Image)
    }
}

/// Extraction failures. The upload that triggered them is rolled back.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("extraction task panicked or was cancelled")]
    Aborted,
}

/// Result type for extraction.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Something that can turn an uploaded file into text.
pub trait TextExtractor: Send + Sync {
    fn extract<'a>(
        &'a self,
        path: &'a Path,
        kind: MediaKind,
    ) -> Pin<Box<dyn Future<Output = ExtractResult<String>> + Send + 'a>>;
}

/// Extractor backed by `pdf-extract` and the OCR command-line tools.
#[derive(Clone, Debug, Default)]
pub struct SystemExtractor {
    ocr: OcrConfig,
}

impl SystemExtractor {
    pub fn new(ocr: OcrConfig) -> Self {
        Self { ocr }
    }

    async fn extract_document(&self, path: &Path) -> ExtractResult<String> {
        match pdf::extract_text_layer(path).await {
            Ok(Some(text)) => return Ok(text),
            Ok(None) => info!("No text layer in {:?}, falling back to OCR", path),
            Err(e) => warn!("PDF text extraction failed for {:?}: {}", path, e),
        }

        let pages = ocr::ocr_pdf(&self.ocr, path).await?;
        if pages.is_empty() {
            Ok(NO_TEXT_EXTRACTED.to_string())
        } else {
            Ok(pages.join("\n"))
        }
    }
}

impl TextExtractor for SystemExtractor {
    fn extract<'a>(
        &'a self,
        path: &'a Path,
        kind: MediaKind,
    ) -> Pin<Box<dyn Future<Output = ExtractResult<String>> + Send + 'a>> {
        Box::pin(async move {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                return Err(ExtractError::NotFound(path.to_path_buf()));
            }
            match kind {
                MediaKind::Document => self.extract_document(path).await,
                MediaKind::Image => {
                    let text = ocr::ocr_image(&self.ocr, path).await?;
                    if text.trim().is_empty() {
                        info!("OCR found no text in {:?}", path);
                        Ok(NO_TEXT_EXTRACTED.to_string())
                    } else {
                        Ok(text)
                    }
                }
            }
        })
    }
}
