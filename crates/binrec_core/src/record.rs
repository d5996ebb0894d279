//! Record types and record instances.
//!
//! A [`RecordType`] bundles the current schema, the optional version number
//! and the migration rules of one kind of record. It is defined once with a
//! [`RecordTypeBuilder`] and is immutable afterwards; clones share the same
//! metadata and can be used from any number of threads.
//!
//! A [`Record`] is an owned set of values laid out by the current schema.
//!
//! ## Wire Layout
//!
//! ```text
//! versioned:    [version: u8][field 1]...[field N]
//! unversioned:  [field 1]...[field N]
//! ```
//!
//! Encoding always writes the current version. Decoding accepts any version
//! from 1 to the current one and migrates the values forward.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::history::{self, HistoricalSchemas};
use crate::migration::{MigrationInfo, MigrationRegistry, MigrationRule, MigrationVersion, ValueSet};
use crate::schema::{Field, Schema};
use binrec_codec::{CodecError, PackDecoder, PackEncoder, Packer, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug)]
struct RecordTypeInner {
    name: String,
    version: Option<MigrationVersion>,
    schema: Arc<Schema>,
    registry: MigrationRegistry,
    history: Option<HistoricalSchemas>,
    config: Config,
}

/// A defined kind of record: current schema, version and migrations.
#[derive(Debug, Clone)]
pub struct RecordType {
    inner: Arc<RecordTypeInner>,
}

/// Declares a record type field by field.
///
/// ```
/// use binrec_codec::Packer;
/// use binrec_core::{MigrationRule, RecordType};
///
/// let dna = RecordType::builder("ToonDNA")
///     .version(2)
///     .field("torsoIndex", Packer::uint8())
///     .field("eyelidShape", Packer::uint8())
///     .migration(MigrationRule::added(1, "eyelidShape", || 0))
///     .build()
///     .unwrap();
///
/// assert_eq!(dna.encoded_len(1).unwrap(), 2);
/// assert_eq!(dna.encoded_len(2).unwrap(), 3);
/// ```
#[derive(Debug)]
pub struct RecordTypeBuilder {
    name: String,
    version: Option<MigrationVersion>,
    fields: Vec<Field>,
    rules: Vec<MigrationRule>,
    config: Config,
}

impl RecordTypeBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            fields: Vec::new(),
            rules: Vec::new(),
            config: Config::default(),
        }
    }

    /// Makes the type versioned, with `version` as its current version.
    #[must_use]
    pub fn version(mut self, version: MigrationVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Appends a field to the current schema.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, packer: Packer) -> Self {
        self.fields.push(Field::new(name, packer));
        self
    }

    /// Declares a migration rule.
    #[must_use]
    pub fn migration(mut self, rule: MigrationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Overrides the default configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Validates the declaration and produces the record type.
    ///
    /// Every historical schema is reconstructed here, so a rule that cannot
    /// be undone fails now rather than on the first decode.
    ///
    /// # Errors
    ///
    /// Returns a definition error (see [`CoreError::is_definition_error`])
    /// if fields repeat, rules are inconsistent, or a layout is too wide.
    pub fn build(self) -> CoreResult<RecordType> {
        let Self {
            name,
            version,
            fields,
            rules,
            config,
        } = self;

        let schema = Arc::new(Schema::from_fields(&name, fields)?);
        let limit = config.max_record_width;

        let (registry, history) = match version {
            None => {
                if !rules.is_empty() {
                    return Err(CoreError::Unversioned { record_type: name });
                }
                if schema.width() > limit {
                    return Err(CoreError::WidthLimitExceeded {
                        record_type: name,
                        version: 0,
                        width: schema.width(),
                        limit,
                    });
                }
                (MigrationRegistry::new(&name, 1), None)
            }
            Some(0) => {
                return Err(CoreError::invalid_migration(
                    &name,
                    "record versions start at 1",
                ));
            }
            Some(current) => {
                let mut registry = MigrationRegistry::new(&name, current);
                for rule in rules {
                    registry.register(rule)?;
                }
                let history = HistoricalSchemas::build(&name, &schema, &registry)?;
                for (version, layout) in history.iter() {
                    let width = layout.width() + 1;
                    if width > limit {
                        return Err(CoreError::WidthLimitExceeded {
                            record_type: name,
                            version,
                            width,
                            limit,
                        });
                    }
                }
                let history = config.precompute_history.then_some(history);
                (registry, history)
            }
        };

        debug!(
            record_type = %name,
            version = ?version,
            width = schema.width(),
            rules = registry.len(),
            "defined record type"
        );

        Ok(RecordType {
            inner: Arc::new(RecordTypeInner {
                name,
                version,
                schema,
                registry,
                history,
                config,
            }),
        })
    }
}

impl RecordType {
    /// Starts declaring a record type.
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(name)
    }

    /// Name of the type.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current version, or `None` for an unversioned type.
    pub fn version(&self) -> Option<MigrationVersion> {
        self.inner.version
    }

    /// The current schema.
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// Configuration the type was defined with.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Declared migration rules, in declaration order.
    pub fn migrations(&self) -> Vec<MigrationInfo> {
        self.inner.registry.list()
    }

    /// The schema that was current at `version`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownVersion`] if `version` is outside
    /// `1..=current`, and always for unversioned types.
    pub fn schema_at(&self, version: MigrationVersion) -> CoreResult<Arc<Schema>> {
        let current = self.inner.version.unwrap_or(0);
        if version == 0 || version > current {
            return Err(CoreError::UnknownVersion {
                record_type: self.inner.name.clone(),
                version,
                current,
            });
        }
        if version == current {
            return Ok(Arc::clone(&self.inner.schema));
        }
        match &self.inner.history {
            Some(history) => history.get(version).map(Arc::clone).ok_or_else(|| {
                CoreError::UnknownVersion {
                    record_type: self.inner.name.clone(),
                    version,
                    current,
                }
            }),
            None => history::reconstruct(
                &self.inner.name,
                &self.inner.schema,
                &self.inner.registry,
                version,
            )
            .map(Arc::new),
        }
    }

    /// Exact length of a byte string encoded at `version`, tag included.
    ///
    /// Unversioned types have a single untagged layout; `version` is
    /// ignored and the current schema width is returned.
    ///
    /// # Errors
    ///
    /// Same as [`schema_at`](Self::schema_at), for versioned types.
    pub fn encoded_len(&self, version: MigrationVersion) -> CoreResult<usize> {
        match self.inner.version {
            Some(_) => Ok(self.schema_at(version)?.width() + 1),
            None => Ok(self.inner.schema.width()),
        }
    }

    /// Exact length of a byte string encoded by this type today.
    pub fn current_encoded_len(&self) -> usize {
        self.inner.schema.width() + usize::from(self.inner.version.is_some())
    }

    /// Creates a record from values in current-schema order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FieldCountMismatch`] for the wrong number of
    /// values, or a codec error if a value does not fit its packer.
    pub fn construct<I>(&self, values: I) -> CoreResult<Record>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let schema = self.schema();
        if values.len() != schema.len() {
            return Err(CoreError::FieldCountMismatch {
                record_type: self.inner.name.clone(),
                expected: schema.len(),
                actual: values.len(),
            });
        }
        for (field, value) in schema.fields().iter().zip(&values) {
            field.packer.validate(value)?;
        }
        Ok(Record {
            record_type: self.clone(),
            values,
        })
    }

    /// Decodes bytes produced by any supported version of this type.
    ///
    /// # Errors
    ///
    /// - [`CodecError::TruncatedInput`] if the input is shorter than the
    ///   version tag plus that version's schema
    /// - [`CoreError::TrailingBytes`] if it is longer
    /// - [`CoreError::UnknownVersion`] for a tag outside `1..=current`
    /// - [`CoreError::SchemaMismatch`] if migrations do not produce the
    ///   current schema
    pub fn decode(&self, bytes: &[u8]) -> CoreResult<Record> {
        let mut decoder = PackDecoder::new(bytes);
        let (version, schema) = match self.inner.version {
            Some(_) => {
                let version = decoder.read_byte()?;
                (Some(version), self.schema_at(version)?)
            }
            None => (None, Arc::clone(&self.inner.schema)),
        };

        let expected = schema.width();
        let actual = decoder.remaining().len();
        if actual < expected {
            return Err(CodecError::truncated(expected, actual).into());
        }
        if actual > expected {
            return Err(CoreError::TrailingBytes { expected, actual });
        }

        let values = match version {
            Some(source) if Some(source) != self.inner.version => {
                let mut set = ValueSet::new();
                for field in schema.fields() {
                    set.insert(field.name.clone(), decoder.decode(&field.packer)?);
                }
                debug!(
                    record_type = %self.inner.name,
                    from = source,
                    to = ?self.inner.version,
                    "migrating record"
                );
                self.inner.registry.apply_forward(&mut set, source)?;
                self.take_current(set)?
            }
            _ => schema
                .fields()
                .iter()
                .map(|field| decoder.decode(&field.packer))
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Record {
            record_type: self.clone(),
            values,
        })
    }

    /// Lines migrated values up with the current schema.
    fn take_current(&self, mut set: ValueSet) -> CoreResult<Vec<Value>> {
        let schema = self.schema();
        let mut values = Vec::with_capacity(schema.len());
        for field in schema.fields() {
            let Some(value) = set.remove(&field.name) else {
                return Err(self.mismatch(format!(
                    "field `{}` missing after migration",
                    field.name
                )));
            };
            field.packer.validate(&value)?;
            values.push(value);
        }
        if !set.is_empty() {
            let extra: Vec<_> = set.keys().map(String::as_str).collect();
            return Err(self.mismatch(format!(
                "fields {extra:?} left over after migration"
            )));
        }
        Ok(values)
    }

    fn mismatch(&self, message: String) -> CoreError {
        warn!(record_type = %self.inner.name, %message, "migration declarations do not match schema");
        CoreError::schema_mismatch(&self.inner.name, message)
    }

    fn same_type(&self, other: &RecordType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// One record, laid out by its type's current schema.
#[derive(Clone)]
pub struct Record {
    record_type: RecordType,
    values: Vec<Value>,
}

impl Record {
    /// The record's type.
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Value of a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record_type
            .schema()
            .position(name)
            .map(|index| &self.values[index])
    }

    /// Replaces a field's value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownField`] for a name outside the current
    /// schema, or a codec error if the value does not fit the field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> CoreResult<()> {
        let schema = self.record_type.schema();
        let index = schema
            .position(name)
            .ok_or_else(|| CoreError::unknown_field(self.record_type.name(), name))?;
        let value = value.into();
        schema.fields()[index].packer.validate(&value)?;
        self.values[index] = value;
        Ok(())
    }

    /// `(name, value)` pairs in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record_type.schema().names().zip(self.values.iter())
    }

    /// Values in schema order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the record, returning its values in schema order.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Encodes the record with the current schema.
    ///
    /// # Errors
    ///
    /// Returns a codec error if a value does not fit its packer.
    pub fn encode(&self) -> CoreResult<Vec<u8>> {
        let mut encoder = PackEncoder::with_capacity(self.record_type.current_encoded_len());
        if let Some(version) = self.record_type.version() {
            encoder.push_byte(version);
        }
        for (field, value) in self.record_type.schema().fields().iter().zip(&self.values) {
            encoder.encode(&field.packer, value)?;
        }
        Ok(encoder.into_bytes())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        (self.record_type.same_type(&other.record_type)
            || self
                .record_type
                .schema()
                .names()
                .eq(other.record_type.schema().names()))
            && self.values == other.values
    }
}

impl Eq for Record {}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.record_type.name());
        for (name, value) in self.fields() {
            s.field(name, value);
        }
        s.finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.record_type.name())?;
        for (i, (name, value)) in self.fields().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unversioned() -> RecordType {
        RecordType::builder("UnversionedParser")
            .field("fieldId", Packer::uint8())
            .field("fieldData", Packer::int16())
            .field(
                "extraArgs",
                Packer::tuple([Packer::int32(), Packer::int32(), Packer::int32()]),
            )
            .build()
            .unwrap()
    }

    fn widening() -> RecordType {
        RecordType::builder("SameFieldChange")
            .version(3)
            .field("myField", Packer::uint32())
            .migration(MigrationRule::converted(1, "myField", Packer::uint8(), |v| {
                v.as_integer().unwrap_or_default() + 1000
            }))
            .migration(MigrationRule::converted(2, "myField", Packer::uint16(), |v| {
                v.as_integer().unwrap_or_default() * 50
            }))
            .build()
            .unwrap()
    }

    #[test]
    fn unversioned_roundtrip() {
        let kind = unversioned();
        let record = kind
            .construct([Value::from(1), Value::from(2), Value::from((3, 4, 5))])
            .unwrap();
        let bytes = record.encode().unwrap();
        assert_eq!(bytes.len(), 15);
        assert_eq!(bytes[..3], [1, 0, 2]);
        assert_eq!(kind.decode(&bytes).unwrap(), record);
    }

    #[test]
    fn versioned_encode_prefixes_tag() {
        let kind = widening();
        let record = kind.construct([7]).unwrap();
        assert_eq!(record.encode().unwrap(), vec![3, 0, 0, 0, 7]);
        assert_eq!(kind.current_encoded_len(), 5);
    }

    #[test]
    fn decode_old_version_migrates() {
        let kind = widening();
        let record = kind.decode(&[1, 10]).unwrap();
        assert_eq!(record.get("myField"), Some(&Value::from(50_500)));

        let record = kind.decode(&[2, 0x03, 0xf2]).unwrap();
        assert_eq!(record.get("myField"), Some(&Value::from(50_500)));
    }

    #[test]
    fn decode_rejects_bad_lengths() {
        let kind = widening();
        assert!(kind.decode(&[]).unwrap_err().is_truncated());
        assert!(kind.decode(&[1]).unwrap_err().is_truncated());
        assert!(matches!(
            kind.decode(&[1, 10, 0]),
            Err(CoreError::TrailingBytes {
                expected: 1,
                actual: 2
            })
        ));
        assert!(kind.decode(&[3, 0, 0, 7]).unwrap_err().is_truncated());
    }

    #[test]
    fn decode_rejects_unknown_versions() {
        let kind = widening();
        for tag in [0u8, 4, 255] {
            assert!(matches!(
                kind.decode(&[tag, 0, 0, 0, 0]),
                Err(CoreError::UnknownVersion { version, current: 3, .. }) if version == tag
            ));
        }
    }

    #[test]
    fn construct_checks_arity_and_range() {
        let kind = unversioned();
        assert!(matches!(
            kind.construct([Value::from(1)]),
            Err(CoreError::FieldCountMismatch {
                expected: 3,
                actual: 1,
                ..
            })
        ));
        assert!(matches!(
            kind.construct([Value::from(256), Value::from(0), Value::from((0, 0, 0))]),
            Err(CoreError::Codec(CodecError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn set_changes_only_that_field() {
        let kind = unversioned();
        let mut record = kind
            .construct([Value::from(1), Value::from(2), Value::from((3, 4, 5))])
            .unwrap();
        let before = record.encode().unwrap();

        record.set("fieldData", -1).unwrap();
        let after = record.encode().unwrap();

        assert_eq!(before[0], after[0]);
        assert_eq!(after[1..3], [0xff, 0xff]);
        assert_eq!(before[3..], after[3..]);

        assert!(matches!(
            record.set("nope", 1),
            Err(CoreError::UnknownField { .. })
        ));
        assert!(record.set("fieldId", (1, 2)).is_err());
        assert_eq!(record.get("fieldId"), Some(&Value::from(1)));
    }

    #[test]
    fn display_and_debug() {
        let kind = unversioned();
        let record = kind
            .construct([Value::from(1), Value::from(-2), Value::from((3, 4, 5))])
            .unwrap();
        assert_eq!(
            record.to_string(),
            "UnversionedParser(fieldId=1, fieldData=-2, extraArgs=(3, 4, 5))"
        );
        assert!(format!("{record:?}").starts_with("UnversionedParser {"));
    }

    #[test]
    fn lazy_history_matches_precomputed() {
        let lazy = RecordType::builder("SameFieldChange")
            .version(3)
            .field("myField", Packer::uint32())
            .migration(MigrationRule::converted(1, "myField", Packer::uint8(), |v| {
                v.as_integer().unwrap_or_default() + 1000
            }))
            .migration(MigrationRule::converted(2, "myField", Packer::uint16(), |v| {
                v.as_integer().unwrap_or_default() * 50
            }))
            .config(Config::new().precompute_history(false))
            .build()
            .unwrap();
        let eager = widening();

        for version in 1..=3 {
            assert_eq!(
                *lazy.schema_at(version).unwrap(),
                *eager.schema_at(version).unwrap()
            );
        }
        assert_eq!(
            lazy.decode(&[1, 10]).unwrap(),
            eager.decode(&[1, 10]).unwrap()
        );
    }

    #[test]
    fn unversioned_has_no_history() {
        let kind = unversioned();
        assert_eq!(kind.version(), None);
        assert!(matches!(
            kind.schema_at(1),
            Err(CoreError::UnknownVersion { current: 0, .. })
        ));
        assert!(kind.migrations().is_empty());
    }

    #[test]
    fn unversioned_encoded_len_has_no_tag() {
        let kind = unversioned();
        assert_eq!(kind.encoded_len(1).unwrap(), 15);
        assert_eq!(kind.encoded_len(0).unwrap(), kind.current_encoded_len());

        let bytes = kind
            .construct([Value::from(1), Value::from(2), Value::from((3, 4, 5))])
            .unwrap()
            .encode()
            .unwrap();
        assert_eq!(bytes.len(), kind.encoded_len(1).unwrap());
    }

    #[test]
    fn unversioned_migrations_rejected() {
        let result = RecordType::builder("Plain")
            .field("a", Packer::uint8())
            .migration(MigrationRule::added(1, "a", || 0))
            .build();
        assert!(matches!(result, Err(CoreError::Unversioned { .. })));
    }

    #[test]
    fn version_zero_rejected() {
        let result = RecordType::builder("Zero")
            .version(0)
            .field("a", Packer::uint8())
            .build();
        assert!(result.unwrap_err().is_definition_error());
    }

    #[test]
    fn width_limit_applies_to_history() {
        let result = RecordType::builder("Shrunk")
            .version(2)
            .field("small", Packer::uint8())
            .migration(MigrationRule::converted(
                1,
                "small",
                Packer::tuple([Packer::uint32(), Packer::uint32()]),
                |_| 0,
            ))
            .config(Config::new().max_record_width(4))
            .build();
        assert!(matches!(
            result,
            Err(CoreError::WidthLimitExceeded {
                version: 1,
                width: 9,
                ..
            })
        ));
    }

    #[test]
    fn ill_typed_transform_fails_at_decode() {
        let kind = RecordType::builder("Bad")
            .version(2)
            .field("x", Packer::uint8())
            .migration(MigrationRule::converted(1, "x", Packer::uint8(), |_| 1000))
            .build()
            .unwrap();
        assert!(matches!(
            kind.decode(&[1, 0]),
            Err(CoreError::Codec(CodecError::OutOfRange { value: 1000, .. }))
        ));
    }

    proptest::proptest! {
        #[test]
        fn unversioned_roundtrip_any(
            id in proptest::prelude::any::<u8>(),
            data in proptest::prelude::any::<i16>(),
            extra in proptest::prelude::any::<(i32, i32, i32)>(),
        ) {
            let kind = unversioned();
            let record = kind
                .construct([Value::from(id), Value::from(data), Value::from(extra)])
                .unwrap();
            let decoded = kind.decode(&record.encode().unwrap()).unwrap();
            proptest::prop_assert_eq!(decoded, record);
        }
    }

    #[test]
    fn record_type_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecordType>();
        assert_send_sync::<Record>();
    }
}
