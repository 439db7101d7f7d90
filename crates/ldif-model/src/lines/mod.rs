//! Typed LDIF lines.
//!
//! Every line keeps its raw text next to the parsed fields, so a parsed line
//! that was never modified serializes back byte-for-byte. Malformed input is
//! tolerated: the defect is recorded on the line and reported through
//! [`Line::defect`], never raised.

mod comment;
mod separator;
mod value;

use std::fmt;

pub use comment::CommentLine;
pub use separator::{ModSpecSepLine, SepLine};
pub use value::{
    AttrValLine, ChangeType, ChangeTypeLine, DnLine, LdifValue, ModSpecKind, ModSpecTypeLine,
};

use crate::fold::{fold, split_terminator, unfold};
use crate::format::FormatParameters;

/// Classification of a line defect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefectKind {
    /// The line has no trailing line separator.
    MissingTerminator,
    /// The line does not start the way its type requires.
    MalformedPrefix,
    /// The attribute description is empty.
    EmptyDescription,
    /// The attribute description contains characters outside the LDIF grammar.
    InvalidDescription,
    /// A `::` payload does not decode.
    InvalidBase64,
    /// The `changetype:` value is not a known change type.
    UnknownChangeType,
    /// A separator line carries unexpected characters.
    MalformedSeparator,
    /// The line matches no known line type.
    Unrecognized,
}

/// A defect found while parsing a line, with a human-readable reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineDefect {
    pub kind: DefectKind,
    pub reason: String,
}

impl LineDefect {
    pub(crate) fn new(kind: DefectKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_terminator() -> Self {
        Self::new(
            DefectKind::MissingTerminator,
            "line is not terminated by a line separator",
        )
    }
}

impl fmt::Display for LineDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

/// Behavior shared by every line type.
pub trait Line {
    /// The exact text the line was built from, terminator included.
    fn to_raw_string(&self) -> String;

    /// Canonical text under the given format parameters.
    fn to_formatted_string(&self, params: &FormatParameters) -> String;

    /// The defect that makes this line invalid, if any.
    fn defect(&self) -> Option<LineDefect>;

    fn is_valid(&self) -> bool {
        self.defect().is_none()
    }

    fn invalid_reason(&self) -> Option<String> {
        self.defect().map(|d| d.reason)
    }
}

/// Returns the defect of an attribute description, if it has one.
///
/// A description is an attribute type name or OID followed by optional
/// `;option` suffixes.
pub fn description_defect(description: &str) -> Option<LineDefect> {
    let first = match description.chars().next() {
        Some(c) => c,
        None => {
            return Some(LineDefect::new(
                DefectKind::EmptyDescription,
                "attribute description is empty",
            ))
        }
    };
    let well_formed = first.is_ascii_alphanumeric()
        && description
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | ';' | '.'));
    if well_formed {
        None
    } else {
        Some(LineDefect::new(
            DefectKind::InvalidDescription,
            format!("invalid attribute description {description:?}"),
        ))
    }
}

/// A line that matches no known line type. Kept verbatim for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidLine {
    content: String,
    newline: String,
}

impl InvalidLine {
    /// Keep a raw line that matched no known line type.
    pub fn parse(raw: &str) -> Self {
        let (content, newline) = split_terminator(raw);
        Self {
            content: content.to_string(),
            newline: newline.to_string(),
        }
    }

    /// The offending text without its terminator.
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Line for InvalidLine {
    fn to_raw_string(&self) -> String {
        format!("{}{}", self.content, self.newline)
    }

    fn to_formatted_string(&self, params: &FormatParameters) -> String {
        let mut out = fold(&unfold(&self.content), params.wrap_width, params.line_separator);
        out.push_str(params.terminator());
        out
    }

    fn defect(&self) -> Option<LineDefect> {
        Some(LineDefect::new(
            DefectKind::Unrecognized,
            format!("unrecognized line {:?}", self.content),
        ))
    }
}

/// Any LDIF line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LdifLine {
    Comment(CommentLine),
    Dn(DnLine),
    ChangeType(ChangeTypeLine),
    ModSpecType(ModSpecTypeLine),
    AttrVal(AttrValLine),
    Sep(SepLine),
    ModSpecSep(ModSpecSepLine),
    Invalid(InvalidLine),
}

impl LdifLine {
    /// Classify and parse one raw logical line.
    ///
    /// `raw` may contain fold continuations and may end with its terminator.
    /// Classification looks at the line alone, so `add: cn` always parses as
    /// a modification type line.
    pub fn parse(raw: &str) -> Self {
        let (content, _) = split_terminator(raw);

        if content.is_empty() {
            return Self::Sep(SepLine::parse(raw));
        }
        if content.starts_with('#') {
            return Self::Comment(CommentLine::parse(raw));
        }
        if content.trim_end_matches(' ') == "-" {
            return Self::ModSpecSep(ModSpecSepLine::parse(raw));
        }

        match content.find(':') {
            Some(idx) => {
                let name = unfold(&content[..idx]).to_ascii_lowercase();
                match name.as_str() {
                    "dn" => Self::Dn(DnLine::parse(raw)),
                    "changetype" => Self::ChangeType(ChangeTypeLine::parse(raw)),
                    _ if ModSpecKind::from_keyword(&name).is_some() => {
                        Self::ModSpecType(ModSpecTypeLine::parse(raw))
                    }
                    _ => Self::AttrVal(AttrValLine::parse(raw)),
                }
            }
            None => Self::Invalid(InvalidLine::parse(raw)),
        }
    }

    fn as_line(&self) -> &dyn Line {
        match self {
            Self::Comment(l) => l,
            Self::Dn(l) => l,
            Self::ChangeType(l) => l,
            Self::ModSpecType(l) => l,
            Self::AttrVal(l) => l,
            Self::Sep(l) => l,
            Self::ModSpecSep(l) => l,
            Self::Invalid(l) => l,
        }
    }

    /// Short name of the line type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Comment(_) => "comment",
            Self::Dn(_) => "dn",
            Self::ChangeType(_) => "changetype",
            Self::ModSpecType(_) => "modspec-type",
            Self::AttrVal(_) => "attr-val",
            Self::Sep(_) => "separator",
            Self::ModSpecSep(_) => "modspec-separator",
            Self::Invalid(_) => "invalid",
        }
    }
}

impl Line for LdifLine {
    fn to_raw_string(&self) -> String {
        self.as_line().to_raw_string()
    }

    fn to_formatted_string(&self, params: &FormatParameters) -> String {
        self.as_line().to_formatted_string(params)
    }

    fn defect(&self) -> Option<LineDefect> {
        self.as_line().defect()
    }
}
