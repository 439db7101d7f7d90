//! Change records built from lines.
//!
//! A [`ChangeModifyRecord`] owns an ordered list of [`ModSpec`] blocks. Both
//! are built incrementally and then sealed with `finish`; mutating a sealed
//! container is a programming error and panics.

use crate::format::FormatParameters;
use crate::lines::{
    AttrValLine, ChangeTypeLine, CommentLine, DnLine, Line, ModSpecKind, ModSpecSepLine,
    ModSpecTypeLine, SepLine,
};

/// One modification: an operation on a single attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModSpec {
    kind: ModSpecKind,
    type_line: ModSpecTypeLine,
    attr_vals: Vec<AttrValLine>,
    sep: Option<ModSpecSepLine>,
}

impl ModSpec {
    fn create(kind: ModSpecKind, description: &str) -> Self {
        Self {
            kind,
            type_line: ModSpecTypeLine::create(kind, description),
            attr_vals: Vec::new(),
            sep: None,
        }
    }

    /// An add spec; it needs at least one non-empty value to be valid.
    pub fn create_add(description: &str) -> Self {
        Self::create(ModSpecKind::Add, description)
    }

    /// A delete spec. Left without values it deletes the whole attribute.
    pub fn create_delete(description: &str) -> Self {
        Self::create(ModSpecKind::Delete, description)
    }

    /// A replace spec. Left without values it removes the attribute.
    pub fn create_replace(description: &str) -> Self {
        Self::create(ModSpecKind::Replace, description)
    }

    /// Append a value line.
    ///
    /// # Panics
    ///
    /// Panics if the spec is already finished.
    pub fn add_attr_val(&mut self, line: AttrValLine) {
        assert!(
            self.sep.is_none(),
            "cannot add a value to a finished modification spec"
        );
        self.attr_vals.push(line);
    }

    /// Seal the spec with its `-` line.
    ///
    /// # Panics
    ///
    /// Panics if the spec is already finished.
    pub fn finish(&mut self, sep: ModSpecSepLine) {
        assert!(self.sep.is_none(), "modification spec finished twice");
        self.sep = Some(sep);
    }

    /// The operation this spec performs.
    pub fn kind(&self) -> ModSpecKind {
        self.kind
    }

    /// The attribute named on the type line, folds removed.
    pub fn attribute_description(&self) -> String {
        self.type_line.attribute_description()
    }

    /// Value lines in insertion order.
    pub fn attr_vals(&self) -> &[AttrValLine] {
        &self.attr_vals
    }

    /// Returns `true` once the `-` line is attached.
    pub fn is_finished(&self) -> bool {
        self.sep.is_some()
    }

    /// Returns `true` if every line is valid and the spec is finished.
    pub fn is_valid(&self) -> bool {
        self.invalid_reason().is_none()
    }

    /// Why this spec is invalid, or `None` if it is valid.
    pub fn invalid_reason(&self) -> Option<String> {
        if let Some(reason) = self.type_line.invalid_reason() {
            return Some(reason);
        }
        let sep = match &self.sep {
            Some(sep) => sep,
            None => return Some("modification spec is not terminated by '-'".into()),
        };
        if let Some(reason) = sep.invalid_reason() {
            return Some(reason);
        }

        let description = self.attribute_description();
        for line in &self.attr_vals {
            if let Some(reason) = line.invalid_reason() {
                return Some(reason);
            }
            let line_description = line.attribute_description();
            if !line_description.eq_ignore_ascii_case(&description) {
                return Some(format!(
                    "value for {line_description:?} does not match modification attribute {description:?}"
                ));
            }
        }

        if self.kind == ModSpecKind::Add && self.attr_vals.iter().all(|l| l.is_empty_value()) {
            return Some(format!(
                "add modification for {description:?} has no values"
            ));
        }
        None
    }

    fn lines(&self) -> impl Iterator<Item = &dyn Line> {
        std::iter::once(&self.type_line as &dyn Line)
            .chain(self.attr_vals.iter().map(|l| l as &dyn Line))
            .chain(self.sep.iter().map(|l| l as &dyn Line))
    }

    /// Concatenated raw text of every line, unformatted.
    pub fn to_raw_string(&self) -> String {
        self.lines().map(|l| l.to_raw_string()).collect()
    }

    /// Render the spec under the given format parameters.
    pub fn serialize(&self, params: &FormatParameters) -> String {
        self.lines().map(|l| l.to_formatted_string(params)).collect()
    }
}

/// An element of a record body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordPart {
    Comment(CommentLine),
    ModSpec(ModSpec),
}

/// A `changetype: modify` record for one entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeModifyRecord {
    dn_line: DnLine,
    change_type_line: ChangeTypeLine,
    parts: Vec<RecordPart>,
    sep: Option<SepLine>,
}

impl ChangeModifyRecord {
    /// Start a record for the entry named `dn`.
    pub fn create(dn: &str) -> Self {
        Self {
            dn_line: DnLine::create(dn),
            change_type_line: ChangeTypeLine::create_modify(),
            parts: Vec::new(),
            sep: None,
        }
    }

    /// Append a modification. Duplicate attributes are allowed; they apply
    /// in order.
    ///
    /// # Panics
    ///
    /// Panics if the record is already finished.
    pub fn add_mod_spec(&mut self, mod_spec: ModSpec) {
        self.assert_open();
        self.parts.push(RecordPart::ModSpec(mod_spec));
    }

    /// Append a comment between modifications.
    ///
    /// # Panics
    ///
    /// Panics if the record is already finished.
    pub fn add_comment(&mut self, comment: CommentLine) {
        self.assert_open();
        self.parts.push(RecordPart::Comment(comment));
    }

    /// Seal the record with its trailing empty line.
    ///
    /// # Panics
    ///
    /// Panics if the record is already finished.
    pub fn finish(&mut self, sep: SepLine) {
        assert!(self.sep.is_none(), "record finished twice");
        self.sep = Some(sep);
    }

    fn assert_open(&self) {
        assert!(self.sep.is_none(), "cannot modify a finished record");
    }

    /// The target entry's distinguished name, if the dn line decodes.
    pub fn dn(&self) -> Option<String> {
        self.dn_line.dn()
    }

    /// Comments and modifications in order.
    pub fn parts(&self) -> &[RecordPart] {
        &self.parts
    }

    /// Modifications in application order.
    pub fn mod_specs(&self) -> impl Iterator<Item = &ModSpec> {
        self.parts.iter().filter_map(|p| match p {
            RecordPart::ModSpec(m) => Some(m),
            RecordPart::Comment(_) => None,
        })
    }

    /// Number of modifications, comments excluded.
    pub fn mod_spec_count(&self) -> usize {
        self.mod_specs().count()
    }

    /// Returns `true` once the trailing empty line is attached.
    pub fn is_finished(&self) -> bool {
        self.sep.is_some()
    }

    /// Returns `true` if the record is finished and at least one of its
    /// modifications is valid.
    pub fn is_valid(&self) -> bool {
        self.invalid_reason().is_none()
    }

    /// Why this record is invalid, or `None` if it is valid.
    pub fn invalid_reason(&self) -> Option<String> {
        if !self.is_finished() {
            return Some("record is not terminated by an empty line".into());
        }
        if !self.mod_specs().any(ModSpec::is_valid) {
            return Some("record contains no valid modification".into());
        }
        None
    }

    /// Concatenated raw text of every line, unformatted.
    pub fn to_raw_string(&self) -> String {
        let mut out = self.dn_line.to_raw_string();
        out.push_str(&self.change_type_line.to_raw_string());
        for part in &self.parts {
            match part {
                RecordPart::Comment(c) => out.push_str(&c.to_raw_string()),
                RecordPart::ModSpec(m) => out.push_str(&m.to_raw_string()),
            }
        }
        if let Some(sep) = &self.sep {
            out.push_str(&sep.to_raw_string());
        }
        out
    }

    /// Render the record under the given format parameters.
    pub fn serialize(&self, params: &FormatParameters) -> String {
        let mut out = self.dn_line.to_formatted_string(params);
        out.push_str(&self.change_type_line.to_formatted_string(params));
        for part in &self.parts {
            match part {
                RecordPart::Comment(c) => out.push_str(&c.to_formatted_string(params)),
                RecordPart::ModSpec(m) => out.push_str(&m.serialize(params)),
            }
        }
        if let Some(sep) = &self.sep {
            out.push_str(&sep.to_formatted_string(params));
        }
        out
    }
}
