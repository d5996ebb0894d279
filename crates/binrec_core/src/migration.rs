//! Declarative field migrations.
//!
//! A record type that changes shape over time keeps only its latest
//! schema. Each change between two adjacent versions is declared as a
//! [`MigrationRule`] attached to the type:
//!
//! - **Converted**: the field existed before and after, its packer or
//!   value may change
//! - **Added**: the field is new in the next version and gets a default
//! - **Removed**: the field existed before and is dropped
//!
//! Rules serve two purposes. Read backwards they describe how to rebuild
//! an older layout (see [`crate::history`]); read forwards they turn values
//! decoded with that layout into values for the current schema.
//!
//! ## Usage
//!
//! ```
//! use binrec_codec::{Packer, Value};
//! use binrec_core::migration::MigrationRule;
//!
//! let widen = MigrationRule::converted(1, "myField", Packer::uint8(), |old| {
//!     old.as_integer().unwrap_or_default() + 1000
//! });
//! assert_eq!(widen.from_version(), 1);
//! assert_eq!(widen.old_packer(), Some(&Packer::uint8()));
//! ```

use crate::error::{CoreError, CoreResult};
use binrec_codec::{Packer, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Version number carried in the record's version tag.
pub type MigrationVersion = u8;

/// Field values keyed by name, as they stand partway through migration.
pub type ValueSet = BTreeMap<String, Value>;

/// Maps a converted field's old value to its new value.
pub type ConvertFn = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Produces the default for an added field.
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Receives a removed field's last value.
pub type ConsumeFn = Arc<dyn Fn(Value) + Send + Sync>;

/// The three shapes of field change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigrationKind {
    /// Field kept, value or packer changed.
    Converted,
    /// Field introduced.
    Added,
    /// Field dropped.
    Removed,
}

impl fmt::Display for MigrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MigrationKind::Converted => "converted",
            MigrationKind::Added => "added",
            MigrationKind::Removed => "removed",
        })
    }
}

/// What a rule does, with the data each kind needs.
#[derive(Clone)]
pub enum MigrationAction {
    /// Replace the value using `transform`; `old_packer` is the pre-migration layout.
    Converted {
        /// Packer the field used before this step.
        old_packer: Packer,
        /// Old value to new value.
        transform: ConvertFn,
    },
    /// Insert the field with a default value.
    Added {
        /// Default value source.
        default: DefaultFn,
    },
    /// Drop the field after handing its value to `consume`.
    Removed {
        /// Packer the field used before it was removed.
        old_packer: Packer,
        /// Field that preceded the removed one in older layouts.
        located_after: String,
        /// Receives the discarded value.
        consume: ConsumeFn,
    },
}

/// One declared change, upgrading `from_version` to `from_version + 1`.
#[derive(Clone)]
pub struct MigrationRule {
    from_version: MigrationVersion,
    target_field: String,
    name: Option<String>,
    action: MigrationAction,
}

impl MigrationRule {
    /// A field whose value changes, possibly to a different packer.
    pub fn converted<F, R>(
        from_version: MigrationVersion,
        target_field: impl Into<String>,
        old_packer: Packer,
        transform: F,
    ) -> Self
    where
        F: Fn(Value) -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        Self::new(
            from_version,
            target_field,
            MigrationAction::Converted {
                old_packer,
                transform: Arc::new(move |old| Ok(transform(old).into())),
            },
        )
    }

    /// Like [`converted`](Self::converted), but the transform may reject a value.
    ///
    /// A rejection surfaces from decode as [`CoreError::TransformFailed`].
    pub fn try_converted<F, R, E>(
        from_version: MigrationVersion,
        target_field: impl Into<String>,
        old_packer: Packer,
        transform: F,
    ) -> Self
    where
        F: Fn(Value) -> Result<R, E> + Send + Sync + 'static,
        R: Into<Value>,
        E: fmt::Display,
    {
        Self::new(
            from_version,
            target_field,
            MigrationAction::Converted {
                old_packer,
                transform: Arc::new(move |old| {
                    transform(old).map(Into::into).map_err(|e| e.to_string())
                }),
            },
        )
    }

    /// A field introduced in `from_version + 1`.
    pub fn added<F, R>(
        from_version: MigrationVersion,
        target_field: impl Into<String>,
        default: F,
    ) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        Self::new(
            from_version,
            target_field,
            MigrationAction::Added {
                default: Arc::new(move || default().into()),
            },
        )
    }

    /// A field dropped in `from_version + 1`.
    ///
    /// `located_after` names the field that preceded it in older layouts.
    pub fn removed<F>(
        from_version: MigrationVersion,
        target_field: impl Into<String>,
        old_packer: Packer,
        located_after: impl Into<String>,
        consume: F,
    ) -> Self
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        Self::new(
            from_version,
            target_field,
            MigrationAction::Removed {
                old_packer,
                located_after: located_after.into(),
                consume: Arc::new(consume),
            },
        )
    }

    fn new(
        from_version: MigrationVersion,
        target_field: impl Into<String>,
        action: MigrationAction,
    ) -> Self {
        Self {
            from_version,
            target_field: target_field.into(),
            name: None,
            action,
        }
    }

    /// Attaches a human-readable name, shown in logs and listings.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Version this rule upgrades from.
    pub fn from_version(&self) -> MigrationVersion {
        self.from_version
    }

    /// Field produced or consumed by this rule.
    pub fn target_field(&self) -> &str {
        &self.target_field
    }

    /// Optional name given with [`named`](Self::named).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Kind of change.
    pub fn kind(&self) -> MigrationKind {
        match self.action {
            MigrationAction::Converted { .. } => MigrationKind::Converted,
            MigrationAction::Added { .. } => MigrationKind::Added,
            MigrationAction::Removed { .. } => MigrationKind::Removed,
        }
    }

    /// The kind-specific payload.
    pub fn action(&self) -> &MigrationAction {
        &self.action
    }

    /// Pre-migration packer, for converted and removed rules.
    pub fn old_packer(&self) -> Option<&Packer> {
        match &self.action {
            MigrationAction::Converted { old_packer, .. }
            | MigrationAction::Removed { old_packer, .. } => Some(old_packer),
            MigrationAction::Added { .. } => None,
        }
    }

    /// Anchor field of a removed rule.
    pub fn located_after(&self) -> Option<&str> {
        match &self.action {
            MigrationAction::Removed { located_after, .. } => Some(located_after),
            _ => None,
        }
    }

    /// Applies this rule forward to a value set.
    fn apply(&self, record_type: &str, values: &mut ValueSet) -> CoreResult<()> {
        let field = self.target_field.as_str();
        match &self.action {
            MigrationAction::Converted { transform, .. } => {
                let old = values.remove(field).ok_or_else(|| {
                    CoreError::schema_mismatch(
                        record_type,
                        format!(
                            "converted field `{field}` missing at version {}",
                            self.from_version
                        ),
                    )
                })?;
                let new = transform(old).map_err(|message| CoreError::TransformFailed {
                    field: field.to_string(),
                    from_version: self.from_version,
                    message,
                })?;
                values.insert(field.to_string(), new);
            }
            MigrationAction::Added { default } => {
                if values.contains_key(field) {
                    return Err(CoreError::schema_mismatch(
                        record_type,
                        format!(
                            "added field `{field}` already present at version {}",
                            self.from_version
                        ),
                    ));
                }
                values.insert(field.to_string(), default());
            }
            MigrationAction::Removed { consume, .. } => {
                let old = values.remove(field).ok_or_else(|| {
                    CoreError::schema_mismatch(
                        record_type,
                        format!(
                            "removed field `{field}` missing at version {}",
                            self.from_version
                        ),
                    )
                })?;
                consume(old);
            }
        }
        trace!(
            record_type,
            field,
            kind = %self.kind(),
            from_version = self.from_version,
            rule = self.name.as_deref().unwrap_or(""),
            "applied migration"
        );
        Ok(())
    }
}

impl fmt::Debug for MigrationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("MigrationRule");
        s.field("from_version", &self.from_version)
            .field("target_field", &self.target_field)
            .field("kind", &self.kind());
        if let Some(name) = &self.name {
            s.field("name", name);
        }
        if let Some(packer) = self.old_packer() {
            s.field("old_packer", packer);
        }
        if let Some(anchor) = self.located_after() {
            s.field("located_after", &anchor);
        }
        s.finish_non_exhaustive()
    }
}

/// Information about a registered rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationInfo {
    /// Version the rule upgrades from.
    pub from_version: MigrationVersion,
    /// Field the rule targets.
    pub target_field: String,
    /// Kind of change.
    pub kind: MigrationKind,
    /// Optional rule name.
    pub name: Option<String>,
}

/// Per-record-type table of migration rules.
///
/// Rules are kept in declaration order. The registry is filled while a
/// record type is being defined and is read-only afterwards.
#[derive(Debug, Clone)]
pub struct MigrationRegistry {
    record_type: String,
    current_version: MigrationVersion,
    rules: Vec<MigrationRule>,
}

impl MigrationRegistry {
    /// Creates an empty registry for a type at `current_version`.
    pub fn new(record_type: impl Into<String>, current_version: MigrationVersion) -> Self {
        Self {
            record_type: record_type.into(),
            current_version,
            rules: Vec::new(),
        }
    }

    /// Registers a rule.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidMigration`] if `from_version` is outside
    /// `1..current_version`, or another rule at the same step already
    /// targets the same field.
    pub fn register(&mut self, rule: MigrationRule) -> CoreResult<()> {
        let from = rule.from_version;
        if from == 0 || from >= self.current_version {
            return Err(CoreError::invalid_migration(
                &self.record_type,
                format!(
                    "rule for `{}` upgrades from version {from}, expected 1..={}",
                    rule.target_field,
                    self.current_version.saturating_sub(1)
                ),
            ));
        }
        if self
            .rules
            .iter()
            .any(|r| r.from_version == from && r.target_field == rule.target_field)
        {
            return Err(CoreError::invalid_migration(
                &self.record_type,
                format!(
                    "field `{}` targeted twice by rules from version {from}",
                    rule.target_field
                ),
            ));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// The version rules migrate towards.
    pub fn current_version(&self) -> MigrationVersion {
        self.current_version
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[MigrationRule] {
        &self.rules
    }

    /// Returns list of registered rules.
    pub fn list(&self) -> Vec<MigrationInfo> {
        self.rules
            .iter()
            .map(|r| MigrationInfo {
                from_version: r.from_version,
                target_field: r.target_field.clone(),
                kind: r.kind(),
                name: r.name.clone(),
            })
            .collect()
    }

    /// Rules upgrading from exactly `step`, in declaration order.
    pub fn rules_from(&self, step: MigrationVersion) -> impl Iterator<Item = &MigrationRule> {
        self.rules.iter().filter(move |r| r.from_version == step)
    }

    /// Rules to undo when rebuilding `version`: every rule with
    /// `from_version >= version`, newest step first, later declarations
    /// first within a step.
    pub fn undo_order(&self, version: MigrationVersion) -> Vec<&MigrationRule> {
        let mut rules: Vec<_> = self
            .rules
            .iter()
            .rev()
            .filter(|r| r.from_version >= version)
            .collect();
        // Stable sort keeps reversed declaration order within a step.
        rules.sort_by(|a, b| b.from_version.cmp(&a.from_version));
        rules
    }

    /// Replays every step from `from_version` up to the current version.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SchemaMismatch`] when a rule's target is not
    /// where it should be, and [`CoreError::TransformFailed`] when a
    /// fallible transform rejects a value.
    pub fn apply_forward(
        &self,
        values: &mut ValueSet,
        from_version: MigrationVersion,
    ) -> CoreResult<()> {
        for step in from_version..self.current_version {
            for rule in self.rules_from(step) {
                rule.apply(&self.record_type, values)?;
            }
        }
        Ok(())
    }
}
