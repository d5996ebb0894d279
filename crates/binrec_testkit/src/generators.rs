//! Property-based test generators using proptest.
//!
//! Provides strategies for generating packers and values that are
//! guaranteed to fit them.

use binrec_codec::{Packer, Value};
use binrec_core::RecordType;
use proptest::prelude::*;

/// Strategy for generating any integer packer.
pub fn scalar_packer_strategy() -> impl Strategy<Value = Packer> {
    prop_oneof![
        Just(Packer::uint8()),
        Just(Packer::int8()),
        Just(Packer::uint16()),
        Just(Packer::int16()),
        Just(Packer::uint32()),
        Just(Packer::int32()),
    ]
}

/// Strategy for generating packers, including nested tuples.
pub fn packer_strategy() -> impl Strategy<Value = Packer> {
    scalar_packer_strategy().prop_recursive(2, 16, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Packer::Tuple)
    })
}

/// Strategy for generating values that `packer` accepts.
pub fn value_strategy(packer: &Packer) -> BoxedStrategy<Value> {
    match packer {
        Packer::Tuple(items) => {
            let parts: Vec<_> = items.iter().map(value_strategy).collect();
            parts.prop_map(Value::Tuple).boxed()
        }
        scalar => {
            let (min, max) = scalar.range().unwrap_or((0, 0));
            (min..=max).prop_map(Value::Integer).boxed()
        }
    }
}

/// Strategy for generating field lists with unique names.
pub fn fields_strategy() -> impl Strategy<Value = Vec<(String, Packer)>> {
    prop::collection::vec(packer_strategy(), 1..6).prop_map(|packers| {
        packers
            .into_iter()
            .enumerate()
            .map(|(i, packer)| (format!("field{i}"), packer))
            .collect()
    })
}

/// Strategy for generating a full set of current-schema values for a type.
pub fn record_values_strategy(record_type: &RecordType) -> BoxedStrategy<Vec<Value>> {
    let parts: Vec<_> = record_type
        .schema()
        .fields()
        .iter()
        .map(|field| value_strategy(&field.packer))
        .collect();
    parts.boxed()
}

/// Builds an unversioned record type from generated fields.
pub fn unversioned_type(fields: &[(String, Packer)]) -> RecordType {
    fields
        .iter()
        .fold(RecordType::builder("Generated"), |builder, (name, packer)| {
            builder.field(name.clone(), packer.clone())
        })
        .build()
        .expect("generated names are unique")
}
