//! Markup escaping.
//!
//! Every string that may later be rendered by a browser (answers, echoed
//! questions, extracted text) goes through here first.

use std::borrow::Cow;

/// Escape `&`, `<`, `>`, `"` and `'`.
///
/// Borrows when there is nothing to escape.
pub fn escape_markup(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Trim surrounding whitespace, then escape.
pub fn sanitize(text: &str) -> String {
    escape_markup(text.trim()).into_owned()
}
