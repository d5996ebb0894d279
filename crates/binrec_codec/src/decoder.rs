//! Fixed-width decoder.

use crate::error::{CodecError, CodecResult};
use crate::packer::Packer;
use crate::value::Value;

/// Reads packed values sequentially from a byte slice.
pub struct PackDecoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PackDecoder<'a> {
    /// Create a new decoder for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Decode the next value with the given packer.
    pub fn decode(&mut self, packer: &Packer) -> CodecResult<Value> {
        let value = match packer {
            Packer::U8 => Value::Integer(i64::from(self.read_byte()?)),
            Packer::I8 => Value::Integer(i64::from(i8::from_be_bytes([self.read_byte()?]))),
            Packer::U16 => Value::Integer(i64::from(u16::from_be_bytes(self.read_array()?))),
            Packer::I16 => Value::Integer(i64::from(i16::from_be_bytes(self.read_array()?))),
            Packer::U32 => Value::Integer(i64::from(u32::from_be_bytes(self.read_array()?))),
            Packer::I32 => Value::Integer(i64::from(i32::from_be_bytes(self.read_array()?))),
            Packer::Tuple(packers) => {
                let mut items = Vec::with_capacity(packers.len());
                for packer in packers {
                    items.push(self.decode(packer)?);
                }
                Value::Tuple(items)
            }
        };
        Ok(value)
    }

    /// Read a single raw byte, such as a version tag.
    #[inline]
    pub fn read_byte(&mut self) -> CodecResult<u8> {
        let [byte] = self.read_array()?;
        Ok(byte)
    }

    /// Check if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let available = self.data.len() - self.pos;
        if available < N {
            return Err(CodecError::truncated(N, available));
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}
