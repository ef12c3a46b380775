//! OCR through the `tesseract` and `pdftoppm` command-line tools.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ExtractError, ExtractResult};

/// Maximum number of PDF pages rendered for OCR.
pub const MAX_PAGES_OCR: u32 = 10;

/// Locations of the OCR tools and rendering settings.
#[derive(Clone, Debug)]
pub struct OcrConfig {
    pub tesseract: PathBuf,
    pub pdftoppm: PathBuf,
    /// Render resolution for PDF pages, in DPI.
    pub dpi: u32,
    pub max_pages: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract: PathBuf::from("tesseract"),
            pdftoppm: PathBuf::from("pdftoppm"),
            dpi: 200,
            max_pages: MAX_PAGES_OCR,
        }
    }
}

async fn run(program: &Path, args: &[&OsStr]) -> ExtractResult<Vec<u8>> {
    let name = program.display().to_string();
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|source| ExtractError::Spawn {
            program: name.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(ExtractError::ToolFailed {
            program: name,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}

/// OCR a single image file.
pub async fn ocr_image(config: &OcrConfig, image: &Path) -> ExtractResult<String> {
    let stdout = run(&config.tesseract, &[image.as_os_str(), OsStr::new("stdout")]).await?;
    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

/// Render the first pages of a PDF and OCR each one.
///
/// Pages that fail OCR or come back blank are skipped. The rendering
/// directory is removed afterwards.
pub async fn ocr_pdf(config: &OcrConfig, pdf: &Path) -> ExtractResult<Vec<String>> {
    let workdir = std::env::temp_dir().join(format!("docqa-ocr-{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&workdir).await?;

    let result = render_and_ocr(config, pdf, &workdir).await;

    if let Err(e) = tokio::fs::remove_dir_all(&workdir).await {
        warn!("Failed to remove OCR workdir {:?}: {}", workdir, e);
    }

    result
}

async fn render_and_ocr(
    config: &OcrConfig,
    pdf: &Path,
    workdir: &Path,
) -> ExtractResult<Vec<String>> {
    let dpi = config.dpi.to_string();
    let last_page = config.max_pages.to_string();
    let prefix = workdir.join("page");

    run(
        &config.pdftoppm,
        &[
            OsStr::new("-png"),
            OsStr::new("-r"),
            OsStr::new(&dpi),
            OsStr::new("-f"),
            OsStr::new("1"),
            OsStr::new("-l"),
            OsStr::new(&last_page),
            pdf.as_os_str(),
            prefix.as_os_str(),
        ],
    )
    .await?;

    let mut pages = Vec::new();
    let mut entries = tokio::fs::read_dir(workdir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "png") {
            pages.push(path);
        }
    }
    // pdftoppm zero-pads page numbers, so lexical order is page order
    pages.sort();
    debug!("Rendered {} pages from {:?}", pages.len(), pdf);

    let mut texts = Vec::with_capacity(pages.len());
    for page in &pages {
        match ocr_image(config, page).await {
            Ok(text) if !text.trim().is_empty() => texts.push(text),
            Ok(_) => debug!("Blank OCR result for {:?}", page),
            Err(e) => warn!("OCR error on {:?}: {}", page, e),
        }
    }

    Ok(texts)
}
