//! Error types for the diff crate.

/// Errors raised when an entry snapshot violates the input contract.
///
/// The diff itself never fails; malformed snapshots are rejected when they
/// are constructed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EntryError {
    /// An attribute was given an empty description.
    #[error("attribute description is empty")]
    EmptyDescription,

    /// An attribute description contains characters LDIF cannot carry.
    #[error("invalid attribute description {description:?}: {reason}")]
    InvalidDescription { description: String, reason: String },

    /// Two attributes of one entry share a description.
    #[error("duplicate attribute {description:?} in entry {dn:?}")]
    DuplicateAttribute { dn: String, description: String },

    /// A binary value in serialized form is not valid base64.
    #[error("invalid base64 value for binary attribute {description:?}: {reason}")]
    InvalidBinaryValue { description: String, reason: String },

    /// A text attribute holds content that is not valid UTF-8.
    #[error("text attribute {description:?} holds a value that is not valid UTF-8")]
    NonUtf8Text { description: String },
}

/// Convenience alias for entry construction results.
pub type EntryResult<T> = Result<T, EntryError>;
