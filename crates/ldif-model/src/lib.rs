//! LDIF line and change-record model.
//!
//! Lines keep their original text next to their parsed fields, so anything
//! parsed and left untouched serializes back byte-identically, while lines
//! built from fields serialize canonically under [`FormatParameters`].
//!
//! # Key Types
//!
//! - [`LdifLine`] / [`Line`] -- Typed lines (comment, dn, changetype, modspec
//!   type, attribute value, separators) with tolerant parsing
//! - [`ModSpec`] -- One add/delete/replace block scoped to an attribute
//! - [`ChangeModifyRecord`] -- A `changetype: modify` record
//! - [`FormatParameters`] -- Space-after-separator, wrap width, line separator
//! - [`EncodingRules`] -- When a value must be base64-encoded

pub mod error;
pub mod fold;
pub mod format;
pub mod lines;
pub mod record;
pub mod safety;

pub use error::{ModelError, ModelResult};
pub use fold::{fold, split_lines, unfold};
pub use format::{FormatParameters, LineSeparator};
pub use lines::{
    AttrValLine, ChangeType, ChangeTypeLine, CommentLine, DefectKind, DnLine, InvalidLine,
    LdifLine, LdifValue, Line, LineDefect, ModSpecKind, ModSpecSepLine, ModSpecTypeLine, SepLine,
};
pub use record::{ChangeModifyRecord, ModSpec, RecordPart};
pub use safety::{must_encode, EncodingRules};
