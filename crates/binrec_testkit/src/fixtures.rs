//! Record type fixtures.
//!
//! Each family models one type at several points in its history. The
//! `_old`/`_intermediate` variants stand in for earlier releases of the same
//! type and are used to produce byte strings the newest variant must still
//! decode.

use binrec_codec::{Packer, Value};
use binrec_core::{MigrationRule, RecordType};

/// Palette that ToonDNA's single-byte color indexed before it became RGB.
pub const TOON_PALETTE: [(u8, u8, u8); 4] = [(0, 0, 0), (255, 255, 255), (200, 0, 0), (0, 0, 200)];

fn rgb() -> Packer {
    Packer::tuple([Packer::uint8(), Packer::uint8(), Packer::uint8()])
}

fn monochrome(old: Value) -> Value {
    if old == Value::from(0) {
        Value::from((0, 0, 0))
    } else {
        Value::from((255, 255, 255))
    }
}

/// Unversioned `(uint8, int16, tuple(int32, int32, int32))`.
pub fn unversioned_parser() -> RecordType {
    RecordType::builder("UnversionedParser")
        .field("fieldId", Packer::uint8())
        .field("fieldData", Packer::int16())
        .field(
            "extraArgs",
            Packer::tuple([Packer::int32(), Packer::int32(), Packer::int32()]),
        )
        .build()
        .expect("valid fixture")
}

/// Version 1 of the color family: `(color: uint8, unusedField: uint8)`.
pub fn versioned_old() -> RecordType {
    RecordType::builder("VersionedParser")
        .version(1)
        .field("color", Packer::uint8())
        .field("unusedField", Packer::uint8())
        .build()
        .expect("valid fixture")
}

/// Version 2 of the color family: `bodyIndex` added after v1.
pub fn versioned_intermediate() -> RecordType {
    RecordType::builder("VersionedParser")
        .version(2)
        .field("color", Packer::uint8())
        .field("bodyIndex", Packer::uint8())
        .field("unusedField", Packer::uint8())
        .migration(MigrationRule::added(1, "bodyIndex", || 0).named("bodyIndexAdded"))
        .build()
        .expect("valid fixture")
}

/// Version 3 of the color family: `color` becomes RGB, `unusedField` is gone.
pub fn versioned_new() -> RecordType {
    RecordType::builder("VersionedParser")
        .version(3)
        .field("color", rgb())
        .field("bodyIndex", Packer::uint8())
        .migration(MigrationRule::added(1, "bodyIndex", || 0).named("bodyIndexAdded"))
        .migration(
            MigrationRule::converted(2, "color", Packer::uint8(), monochrome)
                .named("tupleBasedColors"),
        )
        .migration(
            MigrationRule::removed(2, "unusedField", Packer::uint8(), "bodyIndex", |_| {})
                .named("removeUnusedField"),
        )
        .build()
        .expect("valid fixture")
}

/// Version 1 of the widening family: `myField: uint8`.
pub fn same_field_a() -> RecordType {
    RecordType::builder("SameFieldChange")
        .version(1)
        .field("myField", Packer::uint8())
        .build()
        .expect("valid fixture")
}

fn shift_up() -> MigrationRule {
    MigrationRule::converted(1, "myField", Packer::uint8(), |old| {
        old.as_integer().unwrap_or_default() + 1000
    })
    .named("rangeIncrease")
}

/// Version 2 of the widening family: `myField: uint16`, `x -> x + 1000`.
pub fn same_field_b() -> RecordType {
    RecordType::builder("SameFieldChange")
        .version(2)
        .field("myField", Packer::uint16())
        .migration(shift_up())
        .build()
        .expect("valid fixture")
}

/// Version 3 of the widening family: `myField: uint32`, then `x -> x * 50`.
pub fn same_field_c() -> RecordType {
    RecordType::builder("SameFieldChange")
        .version(3)
        .field("myField", Packer::uint32())
        .migration(shift_up())
        .migration(
            MigrationRule::converted(2, "myField", Packer::uint16(), |old| {
                old.as_integer().unwrap_or_default() * 50
            })
            .named("rangeIncreaseAgain"),
        )
        .build()
        .expect("valid fixture")
}

/// ToonDNA v3: color went from a palette index to RGB after v1, and eyelid
/// shapes were introduced after v2.
pub fn toon_dna() -> RecordType {
    RecordType::builder("ToonDNA")
        .version(3)
        .field("torsoIndex", Packer::uint8())
        .field("legSize", Packer::uint8())
        .field("species", Packer::uint8())
        .field("color", rgb())
        .field("eyelidShape", Packer::uint8())
        .migration(
            MigrationRule::try_converted(1, "color", Packer::uint8(), |old| {
                old.as_integer()
                    .and_then(|index| usize::try_from(index).ok())
                    .and_then(|index| TOON_PALETTE.get(index).copied())
                    .map(Value::from)
                    .ok_or_else(|| format!("no palette entry {old}"))
            })
            .named("colorToTuple"),
        )
        .migration(MigrationRule::added(2, "eyelidShape", || 0).named("defaultEyelidShape"))
        .build()
        .expect("valid fixture")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_build() {
        let all = [
            unversioned_parser(),
            versioned_old(),
            versioned_intermediate(),
            versioned_new(),
            same_field_a(),
            same_field_b(),
            same_field_c(),
            toon_dna(),
        ];
        assert_eq!(all.len(), 8);
    }

    #[test]
    fn intermediate_layout_matches_history_of_new() {
        let new = versioned_new();
        assert_eq!(
            *new.schema_at(2).unwrap(),
            *versioned_intermediate().schema()
        );
        assert_eq!(*new.schema_at(1).unwrap(), *versioned_old().schema());
    }
}
