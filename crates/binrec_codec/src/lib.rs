//! # binrec Codec
//!
//! Fixed-width binary packers for binrec records.
//!
//! A [`Packer`] describes the wire layout of one field:
//! - Unsigned and signed integers of 1, 2 or 4 bytes
//! - Tuples of other packers, laid out back to back
//!
//! Every packer has a fixed width. There are no length prefixes and no
//! self-describing tags, so bytes are only meaningful next to the schema
//! that produced them.
//!
//! ## Byte Order
//!
//! All multi-byte integers are big-endian. Signed integers use two's
//! complement.
//!
//! ## Usage
//!
//! ```
//! use binrec_codec::{Packer, Value};
//!
//! let packer = Packer::tuple([Packer::uint8(), Packer::int16()]);
//! let bytes = packer.encode(&Value::from((1, -2))).unwrap();
//! assert_eq!(bytes.len(), packer.width());
//!
//! let (decoded, _) = packer.decode(&bytes).unwrap();
//! assert_eq!(decoded, Value::from((1, -2)));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod packer;
mod value;

pub use decoder::PackDecoder;
pub use encoder::PackEncoder;
pub use error::{CodecError, CodecResult};
pub use packer::Packer;
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn roundtrip_unversioned_example_fields() {
        let packers = [
            Packer::uint8(),
            Packer::int16(),
            Packer::tuple([Packer::int32(), Packer::int32(), Packer::int32()]),
        ];
        let values = [Value::from(1), Value::from(2), Value::from((3, 4, 5))];

        let mut encoder = PackEncoder::new();
        for (packer, value) in packers.iter().zip(&values) {
            encoder.encode(packer, value).unwrap();
        }
        let bytes = encoder.into_bytes();
        assert_eq!(bytes.len(), 1 + 2 + 12);

        let mut decoder = PackDecoder::new(&bytes);
        for (packer, value) in packers.iter().zip(&values) {
            assert_eq!(&decoder.decode(packer).unwrap(), value);
        }
        assert!(decoder.is_empty());
    }

    proptest! {
        #[test]
        fn int16_roundtrip(n in any::<i16>()) {
            let value = Value::from(n);
            let bytes = Packer::int16().encode(&value).unwrap();
            prop_assert_eq!(bytes.as_slice(), &n.to_be_bytes()[..]);
            prop_assert_eq!(Packer::int16().decode(&bytes).unwrap(), (value, 2));
        }

        #[test]
        fn uint32_roundtrip(n in any::<u32>()) {
            let value = Value::from(n);
            let bytes = Packer::uint32().encode(&value).unwrap();
            prop_assert_eq!(Packer::uint32().decode(&bytes).unwrap(), (value, 4));
        }

        #[test]
        fn uint8_rejects_everything_above_255(n in 256i64..=i64::from(u32::MAX)) {
            let is_out_of_range = matches!(
                Packer::uint8().encode(&Value::Integer(n)),
                Err(CodecError::OutOfRange { .. })
            );
            prop_assert!(is_out_of_range);
        }
    }
}
