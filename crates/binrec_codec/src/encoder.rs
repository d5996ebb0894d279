//! Fixed-width encoder.

use crate::error::{CodecError, CodecResult};
use crate::packer::Packer;
use crate::value::Value;

/// Appends packed values to a byte buffer.
///
/// Values are validated before any byte is written, so a failed
/// [`encode`](Self::encode) leaves the buffer untouched.
pub struct PackEncoder {
    buffer: Vec<u8>,
}

impl PackEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new encoder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Append one value using the given packer.
    pub fn encode(&mut self, packer: &Packer, value: &Value) -> CodecResult<()> {
        packer.validate(value)?;
        self.write(packer, value)
    }

    /// Append a raw byte, such as a version tag.
    pub fn push_byte(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    /// Consume this encoder and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn write(&mut self, packer: &Packer, value: &Value) -> CodecResult<()> {
        match (packer, value) {
            (Packer::U8, Value::Integer(n)) => self.buffer.push(*n as u8),
            (Packer::I8, Value::Integer(n)) => self.buffer.push(*n as i8 as u8),
            (Packer::U16, Value::Integer(n)) => {
                self.buffer.extend_from_slice(&(*n as u16).to_be_bytes());
            }
            (Packer::I16, Value::Integer(n)) => {
                self.buffer.extend_from_slice(&(*n as i16).to_be_bytes());
            }
            (Packer::U32, Value::Integer(n)) => {
                self.buffer.extend_from_slice(&(*n as u32).to_be_bytes());
            }
            (Packer::I32, Value::Integer(n)) => {
                self.buffer.extend_from_slice(&(*n as i32).to_be_bytes());
            }
            (Packer::Tuple(packers), Value::Tuple(items)) => {
                for (packer, item) in packers.iter().zip(items) {
                    self.write(packer, item)?;
                }
            }
            _ => {
                return Err(CodecError::shape_mismatch(
                    packer.to_string(),
                    value.shape(),
                ))
            }
        }
        Ok(())
    }
}

impl Default for PackEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(packer: &Packer, value: impl Into<Value>) -> CodecResult<Vec<u8>> {
        packer.encode(&value.into())
    }

    #[test]
    fn encode_unsigned_big_endian() {
        assert_eq!(encode(&Packer::uint8(), 0xab).unwrap(), vec![0xab]);
        assert_eq!(encode(&Packer::uint16(), 0x0102).unwrap(), vec![0x01, 0x02]);
        assert_eq!(
            encode(&Packer::uint32(), 0x0102_0304).unwrap(),
            vec![0x01, 0x02, 0x03, 0x04]
        );
    }

    #[test]
    fn encode_signed_twos_complement() {
        assert_eq!(encode(&Packer::int8(), -1).unwrap(), vec![0xff]);
        assert_eq!(encode(&Packer::int16(), -2).unwrap(), vec![0xff, 0xfe]);
        assert_eq!(
            encode(&Packer::int32(), i32::MIN).unwrap(),
            vec![0x80, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn encode_tuple_concatenates_in_order() {
        let packer = Packer::tuple([Packer::int32(), Packer::int32(), Packer::int32()]);
        assert_eq!(
            encode(&packer, (3, 4, 5)).unwrap(),
            vec![0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0, 5]
        );
    }

    #[test]
    fn encode_out_of_range() {
        assert!(matches!(
            encode(&Packer::uint8(), 300),
            Err(CodecError::OutOfRange { value: 300, .. })
        ));
        assert!(matches!(
            encode(&Packer::int16(), 40_000),
            Err(CodecError::OutOfRange { .. })
        ));
    }

    #[test]
    fn failed_encode_leaves_buffer_untouched() {
        let mut encoder = PackEncoder::new();
        encoder.push_byte(9);
        let packer = Packer::tuple([Packer::uint8(), Packer::uint8()]);
        assert!(encoder.encode(&packer, &Value::from((1, 999))).is_err());
        assert_eq!(encoder.as_bytes(), &[9]);
        assert_eq!(encoder.len(), 1);
    }
}
