//! Output sanitization for text that ends up rendered as markup.

pub mod escape;

pub use escape::{escape_markup, sanitize};
