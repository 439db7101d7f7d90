use super::{DefectKind, Line, LineDefect};
use crate::fold::split_terminator;
use crate::format::FormatParameters;

/// The empty line ending a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SepLine {
    content: String,
    newline: String,
}

impl SepLine {
    /// Parse a raw empty line.
    pub fn parse(raw: &str) -> Self {
        let (content, newline) = split_terminator(raw);
        Self {
            content: content.to_string(),
            newline: newline.to_string(),
        }
    }

    /// An empty line ending in `\n`.
    pub fn create() -> Self {
        Self {
            content: String::new(),
            newline: "\n".to_string(),
        }
    }
}

impl Line for SepLine {
    fn to_raw_string(&self) -> String {
        format!("{}{}", self.content, self.newline)
    }

    fn to_formatted_string(&self, params: &FormatParameters) -> String {
        params.terminator().to_string()
    }

    fn defect(&self) -> Option<LineDefect> {
        if self.newline.is_empty() {
            return Some(LineDefect::missing_terminator());
        }
        if !self.content.is_empty() {
            return Some(LineDefect::new(
                DefectKind::MalformedSeparator,
                "record separator line must be empty",
            ));
        }
        None
    }
}

/// The `-` line ending a modification spec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModSpecSepLine {
    content: String,
    newline: String,
}

impl ModSpecSepLine {
    /// Parse a raw `-` line.
    pub fn parse(raw: &str) -> Self {
        let (content, newline) = split_terminator(raw);
        Self {
            content: content.to_string(),
            newline: newline.to_string(),
        }
    }

    /// A `-` line ending in `\n`.
    pub fn create() -> Self {
        Self {
            content: "-".to_string(),
            newline: "\n".to_string(),
        }
    }
}

impl Line for ModSpecSepLine {
    fn to_raw_string(&self) -> String {
        format!("{}{}", self.content, self.newline)
    }

    fn to_formatted_string(&self, params: &FormatParameters) -> String {
        format!("-{}", params.terminator())
    }

    fn defect(&self) -> Option<LineDefect> {
        if self.newline.is_empty() {
            return Some(LineDefect::missing_terminator());
        }
        if self.content != "-" {
            return Some(LineDefect::new(
                DefectKind::MalformedSeparator,
                format!("modification separator must be a single '-', got {:?}", self.content),
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::LineSeparator;

    #[test]
    fn separators_follow_terminator_choice() {
        let crlf = FormatParameters::new(true, 76, LineSeparator::CrLf);
        assert_eq!(SepLine::create().to_formatted_string(&crlf), "\r\n");
        assert_eq!(ModSpecSepLine::create().to_formatted_string(&crlf), "-\r\n");
    }

    #[test]
    fn raw_separators_roundtrip() {
        assert_eq!(SepLine::parse("\r\n").to_raw_string(), "\r\n");
        assert_eq!(ModSpecSepLine::parse("-\r\n").to_raw_string(), "-\r\n");
    }

    #[test]
    fn trailing_space_after_dash_is_a_defect() {
        let line = ModSpecSepLine::parse("- \n");
        assert_eq!(line.defect().unwrap().kind, DefectKind::MalformedSeparator);
        assert_eq!(line.to_raw_string(), "- \n");
    }

    #[test]
    fn unterminated_separator() {
        assert_eq!(
            SepLine::parse("").defect().unwrap().kind,
            DefectKind::MissingTerminator
        );
        assert_eq!(
            ModSpecSepLine::parse("-").defect().unwrap().kind,
            DefectKind::MissingTerminator
        );
    }
}
