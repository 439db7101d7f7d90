//! Lines of the form `name: value`, `name:: base64` or `name:< url`.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{description_defect, DefectKind, Line, LineDefect};
use crate::fold::{fold, split_terminator, unfold};
use crate::format::FormatParameters;
use crate::safety::{decode_base64, encode_base64, EncodingRules};

const PLAIN: &str = ":";
const BASE64: &str = "::";
const URL: &str = ":<";

/// The raw pieces of a value line, kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ValueParts {
    /// Text before the separator (may contain folds).
    start: String,
    /// `:`, `::`, `:<`, or empty when the separator is missing.
    value_type: String,
    /// Text after the separator, leading spaces and folds included.
    value: String,
    newline: String,
}

impl ValueParts {
    fn parse(raw: &str) -> Self {
        let (content, newline) = split_terminator(raw);
        match content.find(':') {
            Some(idx) => {
                let rest = &content[idx + 1..];
                let type_len = if rest.starts_with(':') || rest.starts_with('<') {
                    2
                } else {
                    1
                };
                Self {
                    start: content[..idx].to_string(),
                    value_type: content[idx..idx + type_len].to_string(),
                    value: content[idx + type_len..].to_string(),
                    newline: newline.to_string(),
                }
            }
            None => Self {
                start: content.to_string(),
                value_type: String::new(),
                value: String::new(),
                newline: newline.to_string(),
            },
        }
    }

    fn new(start: &str, value_type: &str, value: &str) -> Self {
        Self {
            start: start.to_string(),
            value_type: value_type.to_string(),
            value: if value.is_empty() {
                String::new()
            } else {
                format!(" {value}")
            },
            newline: "\n".to_string(),
        }
    }

    fn unfolded_start(&self) -> String {
        unfold(&self.start)
    }

    fn unfolded_value(&self) -> String {
        unfold(&self.value).trim_start_matches(' ').to_string()
    }

    fn to_raw_string(&self) -> String {
        let mut out = String::with_capacity(
            self.start.len() + self.value_type.len() + self.value.len() + self.newline.len(),
        );
        out.push_str(&self.start);
        out.push_str(&self.value_type);
        out.push_str(&self.value);
        out.push_str(&self.newline);
        out
    }

    fn to_formatted_string(&self, params: &FormatParameters) -> String {
        let mut logical = self.unfolded_start();
        logical.push_str(&self.value_type);
        let value = self.unfolded_value();
        if !value.is_empty() {
            if params.space_after_separator {
                logical.push(' ');
            }
            logical.push_str(&value);
        }
        let mut out = fold(&logical, params.wrap_width, params.line_separator);
        out.push_str(params.terminator());
        out
    }

    /// Defects every value line shares: terminator and separator.
    fn base_defect(&self) -> Option<LineDefect> {
        if self.newline.is_empty() {
            return Some(LineDefect::missing_terminator());
        }
        if self.value_type.is_empty() {
            return Some(LineDefect::new(
                DefectKind::MalformedPrefix,
                "missing ':' separator",
            ));
        }
        None
    }

    fn keyword_defect(&self, keyword: &str) -> Option<LineDefect> {
        if self.unfolded_start().eq_ignore_ascii_case(keyword) {
            None
        } else {
            Some(LineDefect::new(
                DefectKind::MalformedPrefix,
                format!("line must start with '{keyword}:'"),
            ))
        }
    }

    fn decode(&self) -> Result<LdifValue, base64::DecodeError> {
        let value = self.unfolded_value();
        match self.value_type.as_str() {
            BASE64 => decode_base64(&value).map(LdifValue::Binary),
            URL => Ok(LdifValue::Url(value)),
            _ => Ok(LdifValue::Text(value)),
        }
    }

    fn decode_defect(&self) -> Option<LineDefect> {
        self.decode().err().map(|e| {
            LineDefect::new(
                DefectKind::InvalidBase64,
                format!("value is not valid base64: {e}"),
            )
        })
    }
}

/// A decoded attribute value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LdifValue {
    /// A plain `:` value.
    Text(String),
    /// A decoded `::` value.
    Binary(Vec<u8>),
    /// A `:<` reference. The URL is not dereferenced.
    Url(String),
}

impl LdifValue {
    /// The value payload as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) | Self::Url(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// The payload as text, replacing invalid UTF-8.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) | Self::Url(s) => Cow::Borrowed(s),
            Self::Binary(b) => String::from_utf8_lossy(b),
        }
    }
}

/// An attribute-value line, e.g. `cn: Alice` or `jpegPhoto:: /9j/4AAQ`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrValLine {
    parts: ValueParts,
}

impl AttrValLine {
    /// Parse a raw attribute-value line.
    pub fn parse(raw: &str) -> Self {
        Self {
            parts: ValueParts::parse(raw),
        }
    }

    /// Build a line for a text value, encoding it when it is not safe.
    pub fn create(description: &str, value: &str) -> Self {
        Self::create_with(description, value, &EncodingRules::default())
    }

    /// Build a line for a text value under explicit safety rules.
    pub fn create_with(description: &str, value: &str, rules: &EncodingRules) -> Self {
        if rules.must_encode(value.as_bytes()) {
            Self::encoded(description, value.as_bytes())
        } else {
            Self {
                parts: ValueParts::new(description, PLAIN, value),
            }
        }
    }

    /// Build a line for a binary value. Non-empty payloads are always encoded.
    pub fn create_binary(description: &str, value: &[u8]) -> Self {
        if value.is_empty() {
            Self {
                parts: ValueParts::new(description, PLAIN, ""),
            }
        } else {
            Self::encoded(description, value)
        }
    }

    fn encoded(description: &str, value: &[u8]) -> Self {
        Self {
            parts: ValueParts::new(description, BASE64, &encode_base64(value)),
        }
    }

    /// The attribute description with folds removed.
    pub fn attribute_description(&self) -> String {
        self.parts.unfolded_start()
    }

    /// Returns `true` if the value is written base64-encoded.
    pub fn is_base64(&self) -> bool {
        self.parts.value_type == BASE64
    }

    /// Returns `true` if the value is a URL reference.
    pub fn is_url(&self) -> bool {
        self.parts.value_type == URL
    }

    /// The value as written, folds removed, before decoding.
    pub fn raw_value(&self) -> String {
        self.parts.unfolded_value()
    }

    /// The decoded value, or `None` when the payload cannot be decoded.
    pub fn value(&self) -> Option<LdifValue> {
        self.parts.decode().ok()
    }

    /// Returns `true` if the line carries no payload.
    pub fn is_empty_value(&self) -> bool {
        self.parts.unfolded_value().is_empty()
    }
}

impl Line for AttrValLine {
    fn to_raw_string(&self) -> String {
        self.parts.to_raw_string()
    }

    fn to_formatted_string(&self, params: &FormatParameters) -> String {
        self.parts.to_formatted_string(params)
    }

    fn defect(&self) -> Option<LineDefect> {
        self.parts
            .base_defect()
            .or_else(|| description_defect(&self.attribute_description()))
            .or_else(|| self.parts.decode_defect())
    }
}

/// The `dn:` line opening a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnLine {
    parts: ValueParts,
}

impl DnLine {
    const KEYWORD: &'static str = "dn";

    /// Parse a raw `dn:` line.
    pub fn parse(raw: &str) -> Self {
        Self {
            parts: ValueParts::parse(raw),
        }
    }

    /// Build a `dn:` line, encoding the name when it is not a safe string.
    pub fn create(dn: &str) -> Self {
        let parts = if EncodingRules::default().must_encode(dn.as_bytes()) {
            ValueParts::new(Self::KEYWORD, BASE64, &encode_base64(dn.as_bytes()))
        } else {
            ValueParts::new(Self::KEYWORD, PLAIN, dn)
        };
        Self { parts }
    }

    /// The decoded distinguished name, or `None` if it does not decode to UTF-8.
    pub fn dn(&self) -> Option<String> {
        match self.parts.decode().ok()? {
            LdifValue::Binary(bytes) => String::from_utf8(bytes).ok(),
            LdifValue::Text(s) | LdifValue::Url(s) => Some(s),
        }
    }
}

impl Line for DnLine {
    fn to_raw_string(&self) -> String {
        self.parts.to_raw_string()
    }

    fn to_formatted_string(&self, params: &FormatParameters) -> String {
        self.parts.to_formatted_string(params)
    }

    fn defect(&self) -> Option<LineDefect> {
        self.parts
            .base_defect()
            .or_else(|| self.parts.keyword_defect(Self::KEYWORD))
            .or_else(|| self.parts.decode_defect())
            .or_else(|| {
                self.dn().is_none().then(|| {
                    LineDefect::new(DefectKind::InvalidBase64, "dn is not valid UTF-8")
                })
            })
    }
}

/// Change types a record may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Delete,
    Modify,
    ModRdn,
}

impl ChangeType {
    /// The LDIF keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Modify => "modify",
            Self::ModRdn => "modrdn",
        }
    }

    /// Case-insensitive keyword lookup; `moddn` is accepted as `modrdn`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "add" => Some(Self::Add),
            "delete" => Some(Self::Delete),
            "modify" => Some(Self::Modify),
            "modrdn" | "moddn" => Some(Self::ModRdn),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `changetype:` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeTypeLine {
    parts: ValueParts,
}

impl ChangeTypeLine {
    const KEYWORD: &'static str = "changetype";

    /// Parse a raw `changetype:` line.
    pub fn parse(raw: &str) -> Self {
        Self {
            parts: ValueParts::parse(raw),
        }
    }

    /// Build a `changetype:` line.
    pub fn create(change_type: ChangeType) -> Self {
        Self {
            parts: ValueParts::new(Self::KEYWORD, PLAIN, change_type.as_str()),
        }
    }

    /// Build `changetype: modify`.
    pub fn create_modify() -> Self {
        Self::create(ChangeType::Modify)
    }

    /// The declared change type, or `None` if the keyword is unknown.
    pub fn change_type(&self) -> Option<ChangeType> {
        ChangeType::from_keyword(&self.parts.unfolded_value())
    }
}

impl Line for ChangeTypeLine {
    fn to_raw_string(&self) -> String {
        self.parts.to_raw_string()
    }

    fn to_formatted_string(&self, params: &FormatParameters) -> String {
        self.parts.to_formatted_string(params)
    }

    fn defect(&self) -> Option<LineDefect> {
        self.parts
            .base_defect()
            .or_else(|| self.parts.keyword_defect(Self::KEYWORD))
            .or_else(|| {
                self.change_type().is_none().then(|| {
                    LineDefect::new(
                        DefectKind::UnknownChangeType,
                        format!("unknown change type {:?}", self.parts.unfolded_value()),
                    )
                })
            })
    }
}

/// Operation kind of one modification spec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModSpecKind {
    Add,
    Delete,
    Replace,
}

impl ModSpecKind {
    /// The LDIF keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Replace => "replace",
        }
    }

    /// Case-insensitive keyword lookup.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "add" => Some(Self::Add),
            "delete" => Some(Self::Delete),
            "replace" => Some(Self::Replace),
            _ => None,
        }
    }
}

impl fmt::Display for ModSpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `add:` / `delete:` / `replace:` line opening a modification spec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModSpecTypeLine {
    parts: ValueParts,
}

impl ModSpecTypeLine {
    /// Parse a raw `add:` / `delete:` / `replace:` line.
    pub fn parse(raw: &str) -> Self {
        Self {
            parts: ValueParts::parse(raw),
        }
    }

    /// Build the type line for `kind` on `description`.
    pub fn create(kind: ModSpecKind, description: &str) -> Self {
        Self {
            parts: ValueParts::new(kind.as_str(), PLAIN, description),
        }
    }

    /// The operation keyword, or `None` if it is unknown.
    pub fn kind(&self) -> Option<ModSpecKind> {
        ModSpecKind::from_keyword(&self.parts.unfolded_start())
    }

    /// The attribute named after the keyword, folds removed.
    pub fn attribute_description(&self) -> String {
        self.parts.unfolded_value()
    }
}

impl Line for ModSpecTypeLine {
    fn to_raw_string(&self) -> String {
        self.parts.to_raw_string()
    }

    fn to_formatted_string(&self, params: &FormatParameters) -> String {
        self.parts.to_formatted_string(params)
    }

    fn defect(&self) -> Option<LineDefect> {
        self.parts
            .base_defect()
            .or_else(|| {
                self.kind().is_none().then(|| {
                    LineDefect::new(
                        DefectKind::MalformedPrefix,
                        "line must start with 'add:', 'delete:' or 'replace:'",
                    )
                })
            })
            .or_else(|| description_defect(&self.attribute_description()))
    }
}
