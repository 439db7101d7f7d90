//! Directory entry snapshots.
//!
//! A snapshot is an owned, immutable view of one entry: its DN and its
//! attributes with their values. Attributes are matched across snapshots by
//! exact description equality; values are compared by content.

use serde::{Deserialize, Serialize};

use ldif_model::lines::{description_defect, DefectKind};
use ldif_model::safety::{decode_base64, encode_base64};

use crate::error::{EntryError, EntryResult};

/// One attribute value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Binary(Vec<u8>),
}

impl Value {
    /// A text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// A binary value.
    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Self::Binary(value.into())
    }

    /// Returns `true` if the value carries no payload.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// The value content; two values are equal when their content is.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }

    /// The value as text, or `None` for binary content that is not UTF-8.
    pub fn text_value(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Binary(b) => std::str::from_utf8(b).ok(),
        }
    }

    /// The value as raw bytes.
    pub fn binary_value(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// A named, possibly multi-valued field of an entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AttributeData", into = "AttributeData")]
pub struct Attribute {
    description: String,
    binary: bool,
    values: Vec<Value>,
}

impl Attribute {
    /// Create an attribute, rejecting descriptions LDIF cannot carry.
    ///
    /// Text attributes must hold UTF-8 content; raw bytes belong in a binary
    /// attribute.
    pub fn new(description: impl Into<String>, binary: bool, values: Vec<Value>) -> EntryResult<Self> {
        let description = description.into();
        if let Some(defect) = description_defect(&description) {
            return Err(match defect.kind {
                DefectKind::EmptyDescription => EntryError::EmptyDescription,
                _ => EntryError::InvalidDescription {
                    description,
                    reason: defect.reason,
                },
            });
        }
        if !binary && values.iter().any(|v| v.text_value().is_none()) {
            return Err(EntryError::NonUtf8Text { description });
        }
        Ok(Self {
            description,
            binary,
            values,
        })
    }

    /// A text attribute.
    pub fn text<I, S>(description: impl Into<String>, values: I) -> EntryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            description,
            false,
            values.into_iter().map(|v| Value::Text(v.into())).collect(),
        )
    }

    /// A binary attribute.
    pub fn binary<I, B>(description: impl Into<String>, values: I) -> EntryResult<Self>
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Self::new(
            description,
            true,
            values.into_iter().map(|v| Value::Binary(v.into())).collect(),
        )
    }

    /// The attribute description, e.g. `cn` or `cn;lang-en`.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether values of this attribute are written as binary payloads.
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Values in the order given.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of values.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }
}

/// Serialized form of an attribute. Binary values are base64 strings.
#[derive(Serialize, Deserialize)]
struct AttributeData {
    description: String,
    #[serde(default)]
    binary: bool,
    #[serde(default)]
    values: Vec<String>,
}

impl TryFrom<AttributeData> for Attribute {
    type Error = EntryError;

    fn try_from(data: AttributeData) -> EntryResult<Self> {
        let values = if data.binary {
            data.values
                .iter()
                .map(|v| {
                    decode_base64(v).map(Value::Binary).map_err(|e| EntryError::InvalidBinaryValue {
                        description: data.description.clone(),
                        reason: e.to_string(),
                    })
                })
                .collect::<EntryResult<Vec<_>>>()?
        } else {
            data.values.into_iter().map(Value::Text).collect()
        };
        Self::new(data.description, data.binary, values)
    }
}

impl From<Attribute> for AttributeData {
    fn from(attr: Attribute) -> Self {
        let values = attr
            .values
            .iter()
            .map(|v| {
                if attr.binary {
                    encode_base64(v.as_bytes())
                } else {
                    String::from_utf8_lossy(v.as_bytes()).into_owned()
                }
            })
            .collect();
        Self {
            description: attr.description,
            binary: attr.binary,
            values,
        }
    }
}

/// A snapshot of one directory entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntryData", into = "EntryData")]
pub struct Entry {
    dn: String,
    attributes: Vec<Attribute>,
}

impl Entry {
    /// Create a snapshot, rejecting duplicate attribute descriptions.
    pub fn new(dn: impl Into<String>, attributes: Vec<Attribute>) -> EntryResult<Self> {
        let mut entry = Self {
            dn: dn.into(),
            attributes: Vec::with_capacity(attributes.len()),
        };
        for attribute in attributes {
            entry.push_attribute(attribute)?;
        }
        Ok(entry)
    }

    fn push_attribute(&mut self, attribute: Attribute) -> EntryResult<()> {
        if self.attribute(attribute.description()).is_some() {
            return Err(EntryError::DuplicateAttribute {
                dn: self.dn.clone(),
                description: attribute.description,
            });
        }
        self.attributes.push(attribute);
        Ok(())
    }

    /// Builder-style attribute append.
    pub fn with_attribute(mut self, attribute: Attribute) -> EntryResult<Self> {
        self.push_attribute(attribute)?;
        Ok(self)
    }

    /// The entry's distinguished name.
    pub fn dn(&self) -> &str {
        &self.dn
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Look up an attribute by exact description.
    pub fn attribute(&self, description: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.description == description)
    }

    /// Insert an attribute, replacing any attribute with the same description.
    pub fn set_attribute(&mut self, attribute: Attribute) {
        match self
            .attributes
            .iter_mut()
            .find(|a| a.description == attribute.description)
        {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    /// Remove an attribute by exact description.
    pub fn remove_attribute(&mut self, description: &str) -> Option<Attribute> {
        let idx = self
            .attributes
            .iter()
            .position(|a| a.description == description)?;
        Some(self.attributes.remove(idx))
    }
}

#[derive(Serialize, Deserialize)]
struct EntryData {
    dn: String,
    #[serde(default)]
    attributes: Vec<Attribute>,
}

impl TryFrom<EntryData> for Entry {
    type Error = EntryError;

    fn try_from(data: EntryData) -> EntryResult<Self> {
        Self::new(data.dn, data.attributes)
    }
}

impl From<Entry> for EntryData {
    fn from(entry: Entry) -> Self {
        Self {
            dn: entry.dn,
            attributes: entry.attributes,
        }
    }
}
