//! Minimal HTML fragment helpers for the markup converters.
//!
//! The converters emit only a fixed whitelist of structural tags and route
//! every piece of source text through [`escape_into`], so the resulting
//! fragments are sanitized by construction; there is no pass that could
//! forget to run.

/// Append `text` to `out` with the five HTML metacharacters escaped.
pub(crate) fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

/// Escape `text` into a fresh string. Test fixtures and the unit tests
/// below are the only callers; production paths stream via `escape_into`.
#[cfg(test)]
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}
