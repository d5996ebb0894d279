//! Historical schema reconstruction.
//!
//! Only the current schema of a record type is declared. The layout of any
//! older version is derived by undoing migration rules against it, newest
//! step first:
//!
//! - an added field is taken out
//! - a removed field is put back right after its `located_after` anchor
//! - a converted field gets its old packer back, in the same position
//!
//! Undoing one step at a time from version `v` gives the same result as
//! undoing everything from the current schema down to `v - 1` directly;
//! [`HistoricalSchemas`] relies on this to build every version in one pass.

use crate::error::{CoreError, CoreResult};
use crate::migration::{MigrationAction, MigrationRegistry, MigrationRule, MigrationVersion};
use crate::schema::{Field, Schema};
use std::sync::Arc;
use tracing::trace;

/// Rebuilds the schema of `version` from the current schema.
///
/// # Errors
///
/// Returns a definition error if a rule cannot be undone: an added or
/// converted field that is absent, a removed field that is already present,
/// or a removed field whose anchor is missing.
pub fn reconstruct(
    record_type: &str,
    current: &Schema,
    registry: &MigrationRegistry,
    version: MigrationVersion,
) -> CoreResult<Schema> {
    let mut schema = current.clone();
    for rule in registry.undo_order(version) {
        undo(record_type, &mut schema, rule)?;
    }
    trace!(record_type, version, layout = %schema, "reconstructed schema");
    Ok(schema)
}

/// Rebuilds the schema of `version - 1` from the schema of `version`.
///
/// # Errors
///
/// Same as [`reconstruct`].
pub fn step_back(
    record_type: &str,
    schema: &Schema,
    registry: &MigrationRegistry,
    version: MigrationVersion,
) -> CoreResult<Schema> {
    let mut older = schema.clone();
    let step = version.saturating_sub(1);
    let rules: Vec<_> = registry.rules_from(step).collect();
    for rule in rules.into_iter().rev() {
        undo(record_type, &mut older, rule)?;
    }
    Ok(older)
}

fn undo(record_type: &str, schema: &mut Schema, rule: &MigrationRule) -> CoreResult<()> {
    let field = rule.target_field();
    let version = rule.from_version();
    match rule.action() {
        MigrationAction::Added { .. } => {
            if schema.remove(field).is_none() {
                return Err(CoreError::invalid_migration(
                    record_type,
                    format!("field `{field}` added after version {version} does not exist"),
                ));
            }
        }
        MigrationAction::Converted { old_packer, .. } => {
            if !schema.replace_packer(field, old_packer.clone()) {
                return Err(CoreError::invalid_migration(
                    record_type,
                    format!("field `{field}` converted after version {version} does not exist"),
                ));
            }
        }
        MigrationAction::Removed {
            old_packer,
            located_after,
            ..
        } => {
            if schema.contains(field) {
                return Err(CoreError::DuplicateFieldDeclaration {
                    record_type: record_type.to_string(),
                    field: field.to_string(),
                });
            }
            if !schema.insert_after(located_after, Field::new(field, old_packer.clone())) {
                return Err(CoreError::UnresolvableLocatedAfter {
                    record_type: record_type.to_string(),
                    field: field.to_string(),
                    located_after: located_after.clone(),
                    version,
                });
            }
        }
    }
    Ok(())
}

/// Every schema of a versioned record type, indexed by version.
#[derive(Debug, Clone)]
pub struct HistoricalSchemas {
    // schemas[v - 1] is the layout of version v.
    schemas: Vec<Arc<Schema>>,
}

impl HistoricalSchemas {
    /// Builds the schemas of versions `1..=current_version`.
    ///
    /// # Errors
    ///
    /// Same as [`reconstruct`].
    pub fn build(
        record_type: &str,
        current: &Arc<Schema>,
        registry: &MigrationRegistry,
    ) -> CoreResult<Self> {
        let current_version = registry.current_version();
        let mut newest_first = Vec::with_capacity(usize::from(current_version));
        newest_first.push(Arc::clone(current));
        for version in (2..=current_version).rev() {
            let newer = newest_first.last().map_or_else(|| Arc::clone(current), Arc::clone);
            let older = step_back(record_type, &newer, registry, version)?;
            trace!(record_type, version = version - 1, layout = %older, "reconstructed schema");
            newest_first.push(Arc::new(older));
        }
        newest_first.reverse();
        Ok(Self {
            schemas: newest_first,
        })
    }

    /// Schema of `version`, if it is in range.
    pub fn get(&self, version: MigrationVersion) -> Option<&Arc<Schema>> {
        usize::from(version)
            .checked_sub(1)
            .and_then(|index| self.schemas.get(index))
    }

    /// Number of versions held.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if no versions are held.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Iterates `(version, schema)` from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = (MigrationVersion, &Arc<Schema>)> {
        (1..=MigrationVersion::MAX).zip(self.schemas.iter())
    }
}
