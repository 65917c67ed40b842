// Length prefix conventions
//
// Strings, byte arrays and arrays all start with a length (or count) prefix in
// one of three shapes:
// - Int16:   plain string length, -1 = null
// - Int32:   plain bytes length / array count, -1 = null
// - Compact: uvarint length+1, 0 = null (flexible versions)
//
// Nullability is decided by the caller (it is versioned schema metadata); the
// prefix only records the wire shape.

use bytes::{Buf, BufMut};

use super::super::constants::{COMPACT_NULL_LENGTH, PLAIN_NULL_LENGTH};
use super::super::error::{KafkaError, Result};
use super::primitives::{get_i16, get_i32, get_uvarint, put_i16, put_i32, put_uvarint};

/// Wire shape of a length or count prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    Int16,
    Int32,
    Compact,
}

impl LengthPrefix {
    /// Pick the prefix for a string-like or array payload
    ///
    /// `plain` is the fixed-width shape used before the flexible threshold.
    pub fn select(compact: bool, plain: LengthPrefix) -> Self {
        if compact {
            LengthPrefix::Compact
        } else {
            plain
        }
    }
}

/// Write a length prefix, `None` meaning null
pub fn write_length<B: BufMut>(
    buf: &mut B,
    length: Option<usize>,
    prefix: LengthPrefix,
    nullable: bool,
) -> Result<()> {
    let Some(length) = length else {
        if !nullable {
            return Err(KafkaError::NullValue);
        }
        return match prefix {
            LengthPrefix::Int16 => put_i16(buf, PLAIN_NULL_LENGTH as i16),
            LengthPrefix::Int32 => put_i32(buf, PLAIN_NULL_LENGTH),
            LengthPrefix::Compact => put_uvarint(buf, COMPACT_NULL_LENGTH),
        };
    };

    match prefix {
        LengthPrefix::Int16 => {
            let length = i16::try_from(length).map_err(|_| KafkaError::InvalidLength {
                length: length as i64,
                reason: "exceeds int16 length prefix",
            })?;
            put_i16(buf, length)
        }
        LengthPrefix::Int32 => {
            let length = i32::try_from(length).map_err(|_| KafkaError::InvalidLength {
                length: length as i64,
                reason: "exceeds int32 length prefix",
            })?;
            put_i32(buf, length)
        }
        LengthPrefix::Compact => {
            let encoded = u32::try_from(length)
                .ok()
                .and_then(|length| length.checked_add(1))
                .ok_or(KafkaError::InvalidLength {
                    length: length as i64,
                    reason: "exceeds compact length prefix",
                })?;
            put_uvarint(buf, encoded)
        }
    }
}

/// Read a length prefix, returning `None` for null
pub fn read_length<B: Buf>(
    buf: &mut B,
    prefix: LengthPrefix,
    nullable: bool,
) -> Result<Option<usize>> {
    let length = match prefix {
        LengthPrefix::Int16 => i64::from(get_i16(buf)?),
        LengthPrefix::Int32 => i64::from(get_i32(buf)?),
        LengthPrefix::Compact => i64::from(get_uvarint(buf)?) - 1,
    };

    if length == i64::from(PLAIN_NULL_LENGTH) {
        if nullable {
            return Ok(None);
        }
        return Err(KafkaError::InvalidLength {
            length: if prefix == LengthPrefix::Compact { 0 } else { length },
            reason: "null length for non-nullable field",
        });
    }
    if length < 0 {
        return Err(KafkaError::InvalidLength {
            length,
            reason: "negative length",
        });
    }
    Ok(Some(length as usize))
}
