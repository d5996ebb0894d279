//! Fuzz testing harnesses for binrec.
//!
//! These targets can be driven by cargo-fuzz or by proptest with arbitrary
//! byte input.

use binrec_core::{CoreError, RecordType};

/// Fuzz target for decoding.
///
/// Arbitrary bytes must either decode or return an error, never panic.
/// Definition errors can never come out of decode.
pub fn fuzz_decode(record_type: &RecordType, data: &[u8]) {
    if let Err(e) = record_type.decode(data) {
        assert!(!e.is_definition_error(), "definition error from decode: {e}");
    }
}

/// Fuzz target for decode stability.
///
/// Whatever decodes must re-encode to a current-version byte string of the
/// exact current width, and that string must decode to an equal record.
pub fn fuzz_roundtrip(record_type: &RecordType, data: &[u8]) {
    let Ok(record) = record_type.decode(data) else {
        return;
    };
    let encoded = record.encode().expect("decoded record re-encodes");
    assert_eq!(encoded.len(), record_type.current_encoded_len());
    if let Some(version) = record_type.version() {
        assert_eq!(encoded.first(), Some(&version));
    }
    let decoded = record_type.decode(&encoded).expect("re-encoded bytes decode");
    assert_eq!(decoded, record, "roundtrip mismatch");
}

/// Fuzz target for length checks.
///
/// A decode that fails on a well-tagged input of the wrong length must fail
/// with a length error, not a wrongly shaped record.
pub fn fuzz_length_errors(record_type: &RecordType, data: &[u8]) {
    let expected = match (record_type.version(), data.first()) {
        (Some(_), Some(&tag)) => match record_type.encoded_len(tag) {
            Ok(len) => len,
            Err(_) => return,
        },
        (Some(_), None) => return,
        (None, _) => record_type.current_encoded_len(),
    };
    let result = record_type.decode(data);
    if data.len() < expected {
        assert!(matches!(result, Err(ref e) if e.is_truncated()));
    } else if data.len() > expected {
        assert!(matches!(result, Err(CoreError::TrailingBytes { .. })));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{toon_dna, unversioned_parser, versioned_new};

    #[test]
    fn known_inputs_do_not_panic() {
        let types = [unversioned_parser(), versioned_new(), toon_dna()];
        let inputs: [&[u8]; 5] = [&[], &[1], &[1, 3, 5], &[3, 0, 0, 0, 0], &[0xff; 20]];
        for record_type in &types {
            for data in inputs {
                fuzz_decode(record_type, data);
                fuzz_roundtrip(record_type, data);
                fuzz_length_errors(record_type, data);
            }
        }
    }
}
