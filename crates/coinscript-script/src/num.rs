//! Script numbers: minimal little-endian sign-magnitude integers.

use std::ops::{Add, Neg, Sub};

/// Script number error type.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum NumError {
    #[error("script number overflow")]
    Overflow,
    #[error("non-minimally encoded script number")]
    NotMinimallyEncoded,
}

/// Encodes `n` in the script number format; zero is the empty byte string.
pub fn encode_num(n: i64) -> Vec<u8> {
    ScriptNum::from(n).to_bytes()
}

/// Decodes a script number of up to eight bytes.
///
/// Non-minimal encodings are accepted, so `[0x00]` and `[0x80]` both decode to
/// zero.
pub fn decode_num(data: &[u8]) -> Result<i64, NumError> {
    ScriptNum::from_bytes(data, false, Some(ScriptNum::MAX_DECODE_SIZE)).map(|num| num.value())
}

/// A numeric type used in script arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScriptNum {
    value: i64,
}

impl<T: Into<i64>> From<T> for ScriptNum {
    fn from(value: T) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl ScriptNum {
    /// Maximum operand size of the arithmetic opcodes.
    pub const MAX_NUM_SIZE: usize = 4;

    /// Maximum operand size of the lock time opcodes.
    pub const LOCKTIME_NUM_SIZE: usize = 5;

    /// Largest encoding that still fits an `i64`.
    pub const MAX_DECODE_SIZE: usize = 8;

    /// Decodes `data`, rejecting operands longer than `max_size` (default
    /// [`Self::MAX_NUM_SIZE`]).
    pub fn from_bytes(
        data: &[u8],
        require_minimal: bool,
        max_size: Option<usize>,
    ) -> Result<Self, NumError> {
        let max_size = max_size.unwrap_or(Self::MAX_NUM_SIZE);

        if data.len() > max_size {
            return Err(NumError::Overflow);
        }

        let Some((&last, _)) = data.split_last() else {
            return Ok(Self { value: 0 });
        };

        if require_minimal && !Self::is_minimally_encoded(data) {
            return Err(NumError::NotMinimallyEncoded);
        }

        let magnitude = data
            .iter()
            .enumerate()
            .fold(0i64, |acc, (i, &byte)| acc | i64::from(byte).wrapping_shl(8 * i as u32));

        if last & 0x80 != 0 {
            let sign_bit = 0x80i64.wrapping_shl(8 * (data.len() as u32 - 1));
            Ok(Self {
                value: -(magnitude & !sign_bit),
            })
        } else {
            Ok(Self { value: magnitude })
        }
    }

    /// Minimal encoding of the number.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut magnitude = self.value.unsigned_abs();
        let mut result = Vec::with_capacity(9);

        while magnitude != 0 {
            result.push((magnitude & 0xff) as u8);
            magnitude >>= 8;
        }

        let negative = self.value < 0;

        if let Some(last) = result.last_mut() {
            if *last & 0x80 != 0 {
                result.push(if negative { 0x80 } else { 0x00 });
            } else if negative {
                *last |= 0x80;
            }
        }

        result
    }

    fn is_minimally_encoded(data: &[u8]) -> bool {
        match data {
            [] => true,
            [.., last] if last & 0x7f != 0 => true,
            // The last byte only carries the sign, which is fine when the byte
            // before it has its high bit set.
            [.., prev, _] => prev & 0x80 != 0,
            [_] => false,
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_negative()
    }

    pub fn abs(&self) -> Result<Self, NumError> {
        self.value
            .checked_abs()
            .map(|value| Self { value })
            .ok_or(NumError::Overflow)
    }
}

impl Add for ScriptNum {
    type Output = Result<Self, NumError>;

    fn add(self, other: Self) -> Result<Self, NumError> {
        self.value
            .checked_add(other.value)
            .map(|value| Self { value })
            .ok_or(NumError::Overflow)
    }
}

impl Sub for ScriptNum {
    type Output = Result<Self, NumError>;

    fn sub(self, other: Self) -> Result<Self, NumError> {
        self.value
            .checked_sub(other.value)
            .map(|value| Self { value })
            .ok_or(NumError::Overflow)
    }
}

impl Neg for ScriptNum {
    type Output = Result<Self, NumError>;

    fn neg(self) -> Result<Self, NumError> {
        self.value
            .checked_neg()
            .map(|value| Self { value })
            .ok_or(NumError::Overflow)
    }
}
