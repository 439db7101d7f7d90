//! Line folding and splitting.
//!
//! A physical line that begins with a single space continues the previous
//! logical line. Folding breaks a logical line so that no physical line holds
//! more than `wrap_width` characters; every continuation line spends one of
//! those characters on the leading space.

use crate::format::LineSeparator;

/// Remove all fold continuations from raw text.
pub fn unfold(raw: &str) -> String {
    raw.replace("\r\n ", "").replace("\n ", "")
}

/// Fold a logical line (without terminator) at `wrap_width` characters.
///
/// Widths below 2 leave the line untouched. The result carries no trailing
/// terminator. Multi-byte characters are never split.
pub fn fold(logical: &str, wrap_width: usize, separator: LineSeparator) -> String {
    if wrap_width < 2 || logical.chars().count() <= wrap_width {
        return logical.to_string();
    }

    let mut out = String::with_capacity(logical.len() + (logical.len() / wrap_width + 1) * 3);
    let mut used = 0;
    for ch in logical.chars() {
        if used == wrap_width {
            out.push_str(separator.as_str());
            out.push(' ');
            used = 1;
        }
        out.push(ch);
        used += 1;
    }
    out
}

/// Split raw text into its content and trailing terminator.
///
/// The terminator is `"\r\n"`, `"\n"`, or empty for an unterminated line.
pub fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(content) = raw.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = raw.strip_suffix('\n') {
        (content, "\n")
    } else {
        (raw, "")
    }
}

/// Split text into raw logical lines.
///
/// Each returned slice keeps its fold continuations and trailing terminator,
/// so concatenating the slices reproduces `text` exactly. A line starting
/// with a space only continues a preceding non-empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut end = 0;

    for piece in text.split_inclusive('\n') {
        let continues =
            piece.starts_with(' ') && end > start && !split_terminator(&text[start..end]).0.is_empty();
        if !continues && end > start {
            lines.push(&text[start..end]);
            start = end;
        }
        end += piece.len();
    }
    if end > start {
        lines.push(&text[start..end]);
    }

    lines
}
