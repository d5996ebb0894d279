//! Fixed-width packer descriptors.

use crate::decoder::PackDecoder;
use crate::encoder::PackEncoder;
use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Describes how to read and write one value of a fixed byte width.
///
/// Packers are stateless descriptors: they never hold a value, and two
/// packers are interchangeable exactly when they compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Packer {
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 16-bit integer, big-endian.
    U16,
    /// Signed 16-bit integer, big-endian.
    I16,
    /// Unsigned 32-bit integer, big-endian.
    U32,
    /// Signed 32-bit integer, big-endian.
    I32,
    /// Concatenation of sub-packers in declared order.
    Tuple(Vec<Packer>),
}

impl Packer {
    /// Unsigned 8-bit packer.
    pub const fn uint8() -> Self {
        Packer::U8
    }

    /// Signed 8-bit packer.
    pub const fn int8() -> Self {
        Packer::I8
    }

    /// Unsigned 16-bit packer.
    pub const fn uint16() -> Self {
        Packer::U16
    }

    /// Signed 16-bit packer.
    pub const fn int16() -> Self {
        Packer::I16
    }

    /// Unsigned 32-bit packer.
    pub const fn uint32() -> Self {
        Packer::U32
    }

    /// Signed 32-bit packer.
    pub const fn int32() -> Self {
        Packer::I32
    }

    /// Tuple packer over the given sub-packers.
    pub fn tuple(packers: impl IntoIterator<Item = Packer>) -> Self {
        Packer::Tuple(packers.into_iter().collect())
    }

    /// Number of bytes this packer always reads and writes.
    pub fn width(&self) -> usize {
        match self {
            Packer::U8 | Packer::I8 => 1,
            Packer::U16 | Packer::I16 => 2,
            Packer::U32 | Packer::I32 => 4,
            Packer::Tuple(items) => items.iter().map(Packer::width).sum(),
        }
    }

    /// Inclusive integer range accepted by a scalar packer.
    ///
    /// Returns `None` for tuple packers.
    pub fn range(&self) -> Option<(i64, i64)> {
        match self {
            Packer::U8 => Some((0, i64::from(u8::MAX))),
            Packer::I8 => Some((i64::from(i8::MIN), i64::from(i8::MAX))),
            Packer::U16 => Some((0, i64::from(u16::MAX))),
            Packer::I16 => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            Packer::U32 => Some((0, i64::from(u32::MAX))),
            Packer::I32 => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            Packer::Tuple(_) => None,
        }
    }

    /// Check that a value can be packed, without producing bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::OutOfRange`] for integers that do not fit and
    /// [`CodecError::ShapeMismatch`] when the value's shape is wrong.
    pub fn validate(&self, value: &Value) -> CodecResult<()> {
        match (self, value) {
            (Packer::Tuple(packers), Value::Tuple(items)) => {
                if packers.len() != items.len() {
                    return Err(CodecError::shape_mismatch(
                        self.to_string(),
                        value.shape(),
                    ));
                }
                packers
                    .iter()
                    .zip(items)
                    .try_for_each(|(packer, item)| packer.validate(item))
            }
            (Packer::Tuple(_), Value::Integer(_)) | (_, Value::Tuple(_)) => Err(
                CodecError::shape_mismatch(self.to_string(), value.shape()),
            ),
            (scalar, Value::Integer(n)) => {
                let (min, max) = scalar.range().unwrap_or((i64::MIN, i64::MAX));
                if *n < min || *n > max {
                    return Err(CodecError::OutOfRange {
                        packer: scalar.to_string(),
                        value: *n,
                    });
                }
                Ok(())
            }
        }
    }

    /// Encode a value into exactly [`width`](Self::width) bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not fit this packer.
    pub fn encode(&self, value: &Value) -> CodecResult<Vec<u8>> {
        let mut encoder = PackEncoder::with_capacity(self.width());
        encoder.encode(self, value)?;
        Ok(encoder.into_bytes())
    }

    /// Decode a value from the front of `bytes`.
    ///
    /// Returns the value and the number of bytes consumed, which is always
    /// this packer's width.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TruncatedInput`] if fewer than
    /// [`width`](Self::width) bytes are available.
    pub fn decode(&self, bytes: &[u8]) -> CodecResult<(Value, usize)> {
        let mut decoder = PackDecoder::new(bytes);
        let value = decoder.decode(self)?;
        Ok((value, decoder.position()))
    }
}

impl fmt::Display for Packer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packer::U8 => f.write_str("uint8"),
            Packer::I8 => f.write_str("int8"),
            Packer::U16 => f.write_str("uint16"),
            Packer::I16 => f.write_str("int16"),
            Packer::U32 => f.write_str("uint32"),
            Packer::I32 => f.write_str("int32"),
            Packer::Tuple(items) => {
                f.write_str("tuple(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_widths() {
        assert_eq!(Packer::uint8().width(), 1);
        assert_eq!(Packer::int8().width(), 1);
        assert_eq!(Packer::uint16().width(), 2);
        assert_eq!(Packer::int16().width(), 2);
        assert_eq!(Packer::uint32().width(), 4);
        assert_eq!(Packer::int32().width(), 4);
    }

    #[test]
    fn tuple_width_is_sum() {
        let packer = Packer::tuple([Packer::int32(), Packer::int32(), Packer::int32()]);
        assert_eq!(packer.width(), 12);

        let nested = Packer::tuple([Packer::uint8(), packer]);
        assert_eq!(nested.width(), 13);

        assert_eq!(Packer::tuple([]).width(), 0);
    }

    #[test]
    fn display_names() {
        assert_eq!(Packer::uint16().to_string(), "uint16");
        assert_eq!(
            Packer::tuple([Packer::uint8(), Packer::tuple([Packer::int32()])]).to_string(),
            "tuple(uint8, tuple(int32))"
        );
    }

    #[test]
    fn validate_ranges() {
        assert!(Packer::uint8().validate(&Value::from(255)).is_ok());
        assert!(matches!(
            Packer::uint8().validate(&Value::from(256)),
            Err(CodecError::OutOfRange { value: 256, .. })
        ));
        assert!(matches!(
            Packer::uint16().validate(&Value::from(-1)),
            Err(CodecError::OutOfRange { .. })
        ));
        assert!(Packer::int8().validate(&Value::from(-128)).is_ok());
        assert!(Packer::int8().validate(&Value::from(128)).is_err());
        assert!(Packer::uint32().validate(&Value::from(u32::MAX)).is_ok());
        assert!(Packer::int32()
            .validate(&Value::Integer(i64::from(i32::MAX) + 1))
            .is_err());
    }

    #[test]
    fn validate_shapes() {
        let packer = Packer::tuple([Packer::uint8(), Packer::uint8()]);
        assert!(packer.validate(&Value::from((1, 2))).is_ok());
        assert!(matches!(
            packer.validate(&Value::from((1, 2, 3))),
            Err(CodecError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            packer.validate(&Value::from(1)),
            Err(CodecError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            Packer::uint8().validate(&Value::from((1, 2))),
            Err(CodecError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn decode_reports_consumed_width() {
        let (value, consumed) = Packer::uint16().decode(&[0x01, 0x02, 0xff]).unwrap();
        assert_eq!(value, Value::from(0x0102));
        assert_eq!(consumed, 2);
    }

    #[test]
    fn decode_truncated() {
        let packer = Packer::tuple([Packer::uint8(), Packer::uint32()]);
        assert_eq!(
            packer.decode(&[1, 2, 3]),
            Err(CodecError::TruncatedInput {
                needed: 4,
                available: 2
            })
        );
    }
}
