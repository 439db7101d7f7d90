use super::{DefectKind, Line, LineDefect};
use crate::fold::{fold, split_terminator, unfold};
use crate::format::FormatParameters;

/// A `#` comment line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentLine {
    content: String,
    newline: String,
}

impl CommentLine {
    /// Parse a raw `#` line.
    pub fn parse(raw: &str) -> Self {
        let (content, newline) = split_terminator(raw);
        Self {
            content: content.to_string(),
            newline: newline.to_string(),
        }
    }

    /// Build `# text`, or a bare `#` for empty text.
    pub fn create(text: &str) -> Self {
        let content = if text.is_empty() {
            "#".to_string()
        } else {
            format!("# {text}")
        };
        Self {
            content,
            newline: "\n".to_string(),
        }
    }

    /// The comment text without the leading `#` and one following space.
    pub fn text(&self) -> String {
        let unfolded = unfold(&self.content);
        let body = unfolded.strip_prefix('#').unwrap_or(&unfolded);
        body.strip_prefix(' ').unwrap_or(body).to_string()
    }
}

impl Line for CommentLine {
    fn to_raw_string(&self) -> String {
        format!("{}{}", self.content, self.newline)
    }

    fn to_formatted_string(&self, params: &FormatParameters) -> String {
        let mut out = fold(&unfold(&self.content), params.wrap_width, params.line_separator);
        out.push_str(params.terminator());
        out
    }

    fn defect(&self) -> Option<LineDefect> {
        if self.newline.is_empty() {
            return Some(LineDefect::missing_terminator());
        }
        if !self.content.starts_with('#') {
            return Some(LineDefect::new(
                DefectKind::MalformedPrefix,
                "comment must start with '#'",
            ));
        }
        None
    }
}
