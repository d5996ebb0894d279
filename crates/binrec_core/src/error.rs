//! Error types for binrec core.

use binrec_codec::CodecError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while defining record types or decoding and encoding records.
///
/// The `DuplicateFieldDeclaration`, `UnresolvableLocatedAfter`,
/// `InvalidMigration`, `WidthLimitExceeded` and `Unversioned` variants only
/// come out of [`RecordTypeBuilder::build`](crate::RecordTypeBuilder::build).
/// Everything else is a decode, encode or field-access failure.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Packer-level failure (truncated input, out-of-range or mis-shaped value).
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// More bytes than the schema for the encoded version accounts for.
    #[error("trailing bytes: schema is {expected} bytes, got {actual}")]
    TrailingBytes {
        /// Width of the schema the input was decoded with.
        expected: usize,
        /// Bytes present after the version tag.
        actual: usize,
    },

    /// Version tag outside `1..=current`.
    #[error("unknown version {version} for {record_type} (current version is {current})")]
    UnknownVersion {
        /// Record type being decoded.
        record_type: String,
        /// Version found in the input.
        version: u8,
        /// The record type's current version.
        current: u8,
    },

    /// Migrated values do not line up with the current schema.
    #[error("schema mismatch in {record_type}: {message}")]
    SchemaMismatch {
        /// Record type being decoded.
        record_type: String,
        /// What did not line up.
        message: String,
    },

    /// A field name appears twice in a schema.
    #[error("duplicate field `{field}` in {record_type}")]
    DuplicateFieldDeclaration {
        /// Record type being defined.
        record_type: String,
        /// The repeated field name.
        field: String,
    },

    /// A removed field's anchor does not exist in a historical schema.
    #[error(
        "removed field `{field}` is located after `{located_after}`, \
         which does not exist at version {version} of {record_type}"
    )]
    UnresolvableLocatedAfter {
        /// Record type being defined.
        record_type: String,
        /// The removed field.
        field: String,
        /// The anchor that could not be found.
        located_after: String,
        /// The version being reconstructed.
        version: u8,
    },

    /// A migration rule is inconsistent with the type it is attached to.
    #[error("invalid migration for {record_type}: {message}")]
    InvalidMigration {
        /// Record type being defined.
        record_type: String,
        /// Why the rule was rejected.
        message: String,
    },

    /// A fallible transform refused a value.
    #[error("transform of `{field}` from version {from_version} failed: {message}")]
    TransformFailed {
        /// Field the rule targets.
        field: String,
        /// Version the rule upgrades from.
        from_version: u8,
        /// Message returned by the transform.
        message: String,
    },

    /// Field name not present in the current schema.
    #[error("unknown field `{field}` in {record_type}")]
    UnknownField {
        /// Record type accessed.
        record_type: String,
        /// The missing field name.
        field: String,
    },

    /// Wrong number of values passed to construct.
    #[error("{record_type} has {expected} fields, got {actual} values")]
    FieldCountMismatch {
        /// Record type constructed.
        record_type: String,
        /// Number of fields in the current schema.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// A schema is wider than the configured limit.
    #[error("version {version} of {record_type} is {width} bytes wide, limit is {limit}")]
    WidthLimitExceeded {
        /// Record type being defined.
        record_type: String,
        /// Version whose schema is too wide.
        version: u8,
        /// Width of that schema, version tag included.
        width: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Migrations declared on a type that has no version number.
    #[error("{record_type} is unversioned and cannot declare migrations")]
    Unversioned {
        /// Record type being defined.
        record_type: String,
    },
}

impl CoreError {
    /// Creates a schema mismatch error.
    pub fn schema_mismatch(record_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            record_type: record_type.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid migration error.
    pub fn invalid_migration(record_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMigration {
            record_type: record_type.into(),
            message: message.into(),
        }
    }

    /// Creates an unknown field error.
    pub fn unknown_field(record_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            record_type: record_type.into(),
            field: field.into(),
        }
    }

    /// Returns true if the input ended before the schema was satisfied.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Codec(CodecError::TruncatedInput { .. }))
    }

    /// Returns true for errors that can only be raised while defining a type.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateFieldDeclaration { .. }
                | Self::UnresolvableLocatedAfter { .. }
                | Self::InvalidMigration { .. }
                | Self::WidthLimitExceeded { .. }
                | Self::Unversioned { .. }
        )
    }
}
