//! Output escaping.
//!
//! Escaped variables (`{{name}}`) pass their text through the renderer's
//! escape function, unescaped ones (`{{{name}}}`, `{{&name}}`) through its
//! literal function. Both are plain `Fn(&str) -> String` so hosts can plug
//! in their own markup rules.

use std::sync::Arc;

/// A text transformation applied to interpolated values.
pub type EscapeFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Escapes `& < > " '` for HTML.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (index, byte) in text.bytes().enumerate() {
        let escaped = match byte {
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'&' => "&amp;",
            b'"' => "&quot;",
            b'\'' => "&#x27;",
            _ => continue,
        };
        out.push_str(&text[last..index]);
        out.push_str(escaped);
        last = index + 1;
    }
    out.push_str(&text[last..]);
    out
}

/// Returns the text unchanged.
pub fn literal(text: &str) -> String {
    text.to_string()
}
