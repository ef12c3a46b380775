//! Upload naming rules: session id format, filename sanitization and the
//! extension allow-list.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::extract::MediaKind;

/// Extensions accepted for upload (lower-case, with the dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff"];

static SESSION_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{10,50}$").unwrap());

/// Session ids are 10 to 50 characters of `[a-zA-Z0-9_-]`.
pub fn is_valid_session_id(id: &str) -> bool {
    SESSION_ID.is_match(id)
}

/// Reduce a client-supplied filename to something safe to join onto a
/// directory.
///
/// Non-ASCII characters are dropped, path separators and whitespace runs
/// become `_`, anything outside `[A-Za-z0-9_.-]` is removed and leading or
/// trailing dots and underscores are stripped. Returns `None` when nothing
/// is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let ascii: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.' | '-'))
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c == '_');

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Lower-cased extension with its dot, e.g. `".pdf"`.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
}

/// Media kind for an allowed filename, `None` if the extension is not allowed.
pub fn allowed_media_kind(name: &str) -> Option<MediaKind> {
    let ext = extension_of(name)?;
    ALLOWED_EXTENSIONS
        .contains(&ext.as_str())
        .then(|| MediaKind::from_extension(&ext))
}

/// Name an upload is stored under: `{session}_{unix_ts}_{nonce}_{name}`.
///
/// The nonce keeps two uploads of the same name within one second from
/// sharing a path.
pub fn stored_filename(
    session_id: &str,
    timestamp: i64,
    nonce: &str,
    safe_name: &str,
) -> String {
    format!("{}_{}_{}_{}", session_id, timestamp, nonce, safe_name)
}

/// Short random token for [`stored_filename`].
pub fn upload_nonce() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Resolve a requested name inside `dir`, refusing anything that does not
/// sanitize cleanly or does not exist.
pub fn resolve_in(dir: &Path, requested: &str) -> Option<PathBuf> {
    let safe = sanitize_filename(requested)?;
    let path = dir.join(safe);
    path.is_file().then_some(path)
}
