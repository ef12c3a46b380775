//! PDF text layer extraction via `pdf-extract`.

use std::path::Path;

use super::{ExtractError, ExtractResult};

/// Read the embedded text of a PDF.
///
/// `Ok(None)` means the document parsed but carries no text, which is the
/// usual case for scans. Parsing runs on the blocking pool; a panic inside
/// the parser surfaces as [`ExtractError::Aborted`].
pub async fn extract_text_layer(path: &Path) -> ExtractResult<Option<String>> {
    let bytes = tokio::fs::read(path).await?;

    let parsed = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|_| ExtractError::Aborted)?;

    match parsed {
        Ok(text) if text.trim().is_empty() => Ok(None),
        Ok(text) => Ok(Some(text)),
        Err(e) => Err(ExtractError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        assert!(extract_text_layer(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = extract_text_layer(Path::new("/nonexistent/file.pdf")).await;
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
