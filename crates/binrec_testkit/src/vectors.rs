//! Byte-level test vectors for binrec record types.
//!
//! Each vector names a fixture, an input byte string and either the bytes
//! the decoded record re-encodes to or the error kind decoding must raise.
//! They pin the wire format (big-endian, leading version byte) so that any
//! other implementation can be checked against the same data.

use crate::fixtures;
use binrec_codec::CodecError;
use binrec_core::{CoreError, RecordType};
use serde::{Deserialize, Serialize};

/// A test vector that can be shared across implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Fixture the input is decoded with (see [`fixture`]).
    pub record_type: String,
    /// Input data (hex-encoded).
    pub input_hex: String,
    /// Re-encoded output (hex-encoded), when decoding succeeds.
    pub expected_hex: Option<String>,
    /// Expected error kind (see [`error_kind`]), when decoding fails.
    pub expected_error: Option<String>,
}

fn ok(id: &str, description: &str, record_type: &str, input: &str, expected: &str) -> TestVector {
    TestVector {
        id: id.into(),
        description: description.into(),
        record_type: record_type.into(),
        input_hex: input.into(),
        expected_hex: Some(expected.into()),
        expected_error: None,
    }
}

fn err(id: &str, description: &str, record_type: &str, input: &str, error: &str) -> TestVector {
    TestVector {
        id: id.into(),
        description: description.into(),
        record_type: record_type.into(),
        input_hex: input.into(),
        expected_hex: None,
        expected_error: Some(error.into()),
    }
}

/// Looks up a fixture by the name used in vectors.
pub fn fixture(name: &str) -> Option<RecordType> {
    let record_type = match name {
        "unversioned_parser" => fixtures::unversioned_parser(),
        "versioned_old" => fixtures::versioned_old(),
        "versioned_intermediate" => fixtures::versioned_intermediate(),
        "versioned_new" => fixtures::versioned_new(),
        "same_field_a" => fixtures::same_field_a(),
        "same_field_b" => fixtures::same_field_b(),
        "same_field_c" => fixtures::same_field_c(),
        "toon_dna" => fixtures::toon_dna(),
        _ => return None,
    };
    Some(record_type)
}

/// Stable name of an error's kind, as used in `expected_error`.
pub fn error_kind(error: &CoreError) -> &'static str {
    match error {
        CoreError::Codec(CodecError::TruncatedInput { .. }) => "TruncatedInput",
        CoreError::Codec(CodecError::OutOfRange { .. }) => "OutOfRange",
        CoreError::Codec(CodecError::ShapeMismatch { .. }) => "ShapeMismatch",
        CoreError::TrailingBytes { .. } => "TrailingBytes",
        CoreError::UnknownVersion { .. } => "UnknownVersion",
        CoreError::SchemaMismatch { .. } => "SchemaMismatch",
        CoreError::DuplicateFieldDeclaration { .. } => "DuplicateFieldDeclaration",
        CoreError::UnresolvableLocatedAfter { .. } => "UnresolvableLocatedAfter",
        CoreError::InvalidMigration { .. } => "InvalidMigration",
        CoreError::TransformFailed { .. } => "TransformFailed",
        CoreError::UnknownField { .. } => "UnknownField",
        CoreError::FieldCountMismatch { .. } => "FieldCountMismatch",
        CoreError::WidthLimitExceeded { .. } => "WidthLimitExceeded",
        CoreError::Unversioned { .. } => "Unversioned",
    }
}

/// Decode and re-encode vectors.
pub fn record_vectors() -> Vec<TestVector> {
    vec![
        ok(
            "unversioned_example",
            "uint8, int16, tuple(int32 x3) with (1, 2, (3, 4, 5))",
            "unversioned_parser",
            "010002000000030000000400000005",
            "010002000000030000000400000005",
        ),
        ok(
            "versioned_v1_to_v3",
            "v1 color 3 becomes white, bodyIndex defaults to 0, unusedField dropped",
            "versioned_new",
            "010305",
            "03ffffff00",
        ),
        ok(
            "versioned_v2_to_v3",
            "v2 with bodyIndex 0 converges with the v1 vector",
            "versioned_new",
            "02030005",
            "03ffffff00",
        ),
        ok(
            "versioned_v1_black",
            "color 0 maps to black",
            "versioned_new",
            "010009",
            "0300000000",
        ),
        ok(
            "versioned_v1_to_v2",
            "bodyIndex inserted between color and unusedField",
            "versioned_intermediate",
            "010305",
            "02030005",
        ),
        ok(
            "same_field_v1_to_v3",
            "uint8 10 -> uint16 1010 -> uint32 50500",
            "same_field_c",
            "010a",
            "030000c544",
        ),
        ok(
            "same_field_v1_to_v2",
            "uint8 10 -> uint16 1010",
            "same_field_b",
            "010a",
            "0203f2",
        ),
        ok(
            "same_field_v2_to_v3",
            "uint16 1010 -> uint32 50500",
            "same_field_c",
            "0203f2",
            "030000c544",
        ),
        ok(
            "toon_dna_v1",
            "palette index 3 becomes (0, 0, 200), eyelidShape defaults to 0",
            "toon_dna",
            "0102050403",
            "030205040000c800",
        ),
        err(
            "same_field_truncated",
            "version byte without payload",
            "same_field_c",
            "01",
            "TruncatedInput",
        ),
        err(
            "same_field_trailing",
            "v1 payload with an extra byte",
            "same_field_c",
            "010a00",
            "TrailingBytes",
        ),
        err(
            "same_field_v3_short",
            "v3 tag with a v2-sized payload",
            "same_field_c",
            "0303f2",
            "TruncatedInput",
        ),
        err(
            "unknown_version",
            "version 4 of a version 3 type",
            "same_field_c",
            "0400000000",
            "UnknownVersion",
        ),
        err(
            "version_zero",
            "versions start at 1",
            "same_field_c",
            "000a",
            "UnknownVersion",
        ),
        err(
            "empty_input",
            "no version byte at all",
            "versioned_new",
            "",
            "TruncatedInput",
        ),
        err(
            "toon_dna_bad_palette",
            "palette index 9 has no color",
            "toon_dna",
            "0102050409",
            "TransformFailed",
        ),
    ]
}

/// Returns all test vectors as JSON.
pub fn all_vectors_json() -> String {
    serde_json::to_string_pretty(&record_vectors()).expect("vectors serialize")
}

/// Encodes bytes as lowercase hexadecimal.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decodes a hexadecimal string to bytes, ignoring whitespace.
///
/// Returns `None` for an odd number of digits or a non-hex character.
pub fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let hex: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if hex.len() % 2 != 0 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_vectors() {
        for vector in record_vectors() {
            let record_type = fixture(&vector.record_type)
                .unwrap_or_else(|| panic!("unknown fixture {}", vector.record_type));
            let input = hex_decode(&vector.input_hex)
                .unwrap_or_else(|| panic!("vector {} has bad hex", vector.id));

            match (record_type.decode(&input), &vector.expected_hex) {
                (Ok(record), Some(expected)) => {
                    let encoded = record.encode().unwrap();
                    assert_eq!(hex_encode(&encoded), *expected, "vector {}", vector.id);
                }
                (Err(e), None) => {
                    assert_eq!(
                        Some(error_kind(&e)),
                        vector.expected_error.as_deref(),
                        "vector {}",
                        vector.id
                    );
                }
                (result, _) => panic!("vector {} unexpected result: {result:?}", vector.id),
            }
        }
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(hex_encode(&[0x00, 0xab, 0xff]), "00abff");
        assert_eq!(hex_decode("00 ab ff"), Some(vec![0x00, 0xab, 0xff]));
        assert_eq!(hex_decode(""), Some(vec![]));
    }

    #[test]
    fn test_hex_decode_rejects_malformed() {
        assert_eq!(hex_decode("abc"), None);
        assert_eq!(hex_decode("0g"), None);
        assert_eq!(hex_decode("é0"), None);
        assert_eq!(hex_decode("+1"), None);
    }

    #[test]
    fn test_all_vectors_json() {
        let json = all_vectors_json();
        let parsed: Vec<TestVector> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), record_vectors().len());
        assert!(json.contains("same_field_v1_to_v3"));
    }

    #[test]
    fn test_unknown_fixture() {
        assert!(fixture("nope").is_none());
    }
}
