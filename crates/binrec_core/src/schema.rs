//! Ordered field layouts.

use crate::error::{CoreError, CoreResult};
use binrec_codec::Packer;
use std::collections::HashSet;
use std::fmt;

/// One named field and the packer that lays it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name, unique within its schema.
    pub name: String,
    /// How the field is encoded.
    pub packer: Packer,
}

impl Field {
    /// Creates a new field.
    pub fn new(name: impl Into<String>, packer: Packer) -> Self {
        Self {
            name: name.into(),
            packer,
        }
    }
}

/// The ordered field layout of one version of a record type.
///
/// Field order is wire order. The schema's width is the sum of its
/// packers' widths and does not include any version tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Builds a schema from fields in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateFieldDeclaration`] if a name repeats.
    pub fn from_fields(record_type: &str, fields: Vec<Field>) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(CoreError::DuplicateFieldDeclaration {
                    record_type: record_type.to_string(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self { fields })
    }

    /// Total encoded width of all fields.
    pub fn width(&self) -> usize {
        self.fields.iter().map(|f| f.packer.width()).sum()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in wire order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field names in wire order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a field in wire order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns true if a field with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Field> {
        let index = self.position(name)?;
        Some(self.fields.remove(index))
    }

    /// Inserts `field` right after `anchor`. Returns false if the anchor is missing.
    pub(crate) fn insert_after(&mut self, anchor: &str, field: Field) -> bool {
        match self.position(anchor) {
            Some(index) => {
                self.fields.insert(index + 1, field);
                true
            }
            None => false,
        }
    }

    /// Swaps a field's packer in place. Returns false if the field is missing.
    pub(crate) fn replace_packer(&mut self, name: &str, packer: Packer) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.packer = packer;
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", field.name, field.packer)?;
        }
        f.write_str(")")
    }
}
