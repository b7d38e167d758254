//! Wire codec helpers.
//!
//! Varints use the consensus encoding from [`bitcoin::consensus`], fixed-width
//! integers are little-endian.

use bitcoin::consensus::encode::{self, VarInt};

/// Codec error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("unexpected end of input: needed {needed} bytes at offset {offset}, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("invalid varint at offset {offset}: {reason}")]
    Varint { offset: usize, reason: String },
}

/// Cursor over a byte slice that hands out borrowed sub-slices.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the byte `offset` positions ahead without consuming anything.
    pub fn peek(&self, offset: usize) -> Option<u8> {
        self.data.get(self.pos + offset).copied()
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, CodecError> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_i32_le(&mut self) -> Result<i32, CodecError> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_i64_le(&mut self) -> Result<i64, CodecError> {
        self.read_array().map(i64::from_le_bytes)
    }

    /// Reads a consensus-encoded (canonical) varint.
    pub fn read_varint(&mut self) -> Result<u64, CodecError> {
        let offset = self.pos;
        let (VarInt(value), consumed) = encode::deserialize_partial::<VarInt>(&self.data[offset..])
            .map_err(|err| match self.peek(0) {
                None => CodecError::UnexpectedEof {
                    offset,
                    needed: 1,
                    available: 0,
                },
                Some(_) => CodecError::Varint {
                    offset,
                    reason: err.to_string(),
                },
            })?;
        self.pos += consumed;
        Ok(value)
    }
}

/// Encodes `n` as a consensus varint.
pub fn encode_varint(n: u64) -> Vec<u8> {
    encode::serialize(&VarInt(n))
}

/// Appends `data` to `out` prefixed with its varint length.
pub fn write_var_bytes(out: &mut Vec<u8>, data: &[u8]) {
    out.extend(encode_varint(data.len() as u64));
    out.extend_from_slice(data);
}

/// Returns a reversed copy of a fixed-size byte array.
pub fn reversed<const N: usize>(mut bytes: [u8; N]) -> [u8; N] {
    bytes.reverse();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_encoding() {
        let cases: [(u64, &str); 6] = [
            (0, "00"),
            (0xfc, "fc"),
            (0xfd, "fdfd00"),
            (0xffff, "fdffff"),
            (0x10000, "fe00000100"),
            (0x1_0000_0000, "ff0000000001000000"),
        ];
        for (n, expected) in cases {
            let encoded = encode_varint(n);
            assert_eq!(hex::encode(&encoded), expected, "encoding {n}");
            let mut reader = ByteReader::new(&encoded);
            assert_eq!(reader.read_varint(), Ok(n));
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn test_non_canonical_varint_is_rejected() {
        let data = hex::decode("fd0100").unwrap();
        let mut reader = ByteReader::new(&data);
        assert!(matches!(
            reader.read_varint(),
            Err(CodecError::Varint { offset: 0, .. })
        ));
    }

    #[test]
    fn test_truncated_reads() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_u16_le(), Ok(0x0201));
        assert_eq!(
            reader.read_u32_le(),
            Err(CodecError::UnexpectedEof {
                offset: 2,
                needed: 4,
                available: 1
            })
        );
        assert_eq!(reader.read_u8(), Ok(0x03));
        assert_eq!(
            ByteReader::new(&[]).read_varint(),
            Err(CodecError::UnexpectedEof {
                offset: 0,
                needed: 1,
                available: 0
            })
        );
    }
}
