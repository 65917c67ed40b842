// Collection codec
//
// Arrays are a count prefix followed by that many elements. The codec owns
// only the count convention (int32 with -1 = null, or compact uvarint
// count+1 with 0 = null); elements are written and read by a caller-supplied
// closure, which may itself recurse into records or nested arrays.
//
// Element failures are wrapped with their index so a failure deep inside a
// nested structure reports e.g. `topics[3].partitions[0].name`.

use bytes::{Buf, BufMut};

use super::super::error::{KafkaError, Result};
use super::length::{read_length, write_length, LengthPrefix};
use super::primitives::ensure_remaining;

/// Count-prefix convention of one array field at one version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayFormat {
    pub compact: bool,
    pub nullable: bool,
}

impl ArrayFormat {
    pub const PLAIN: ArrayFormat = ArrayFormat {
        compact: false,
        nullable: false,
    };
    pub const COMPACT: ArrayFormat = ArrayFormat {
        compact: true,
        nullable: false,
    };

    pub fn nullable(self) -> Self {
        ArrayFormat {
            nullable: true,
            ..self
        }
    }

    fn prefix(self) -> LengthPrefix {
        LengthPrefix::select(self.compact, LengthPrefix::Int32)
    }
}

/// Encode an array, `None` meaning null
pub fn put_array<B, T, F>(
    buf: &mut B,
    items: Option<&[T]>,
    format: ArrayFormat,
    mut put_item: F,
) -> Result<()>
where
    B: BufMut,
    F: FnMut(&mut B, &T) -> Result<()>,
{
    write_length(buf, items.map(<[T]>::len), format.prefix(), format.nullable)?;
    for (index, item) in items.unwrap_or_default().iter().enumerate() {
        put_item(buf, item).map_err(|e| e.at_index(index))?;
    }
    Ok(())
}

/// Decode an array, `None` meaning null
///
/// `min_item_width` is the fewest bytes one element can occupy. A declared
/// count above `max_len`, or one whose elements cannot fit in the bytes left
/// in the source, fails before any element is read. Elements that may occupy
/// zero bytes are bounded by `max_len` alone.
pub fn get_array<B, T, F>(
    buf: &mut B,
    format: ArrayFormat,
    max_len: usize,
    min_item_width: usize,
    mut get_item: F,
) -> Result<Option<Vec<T>>>
where
    B: Buf,
    F: FnMut(&mut B) -> Result<T>,
{
    let Some(count) = read_length(buf, format.prefix(), format.nullable)? else {
        return Ok(None);
    };
    if count > max_len {
        return Err(KafkaError::InvalidLength {
            length: count as i64,
            reason: "array count exceeds configured maximum",
        });
    }
    ensure_remaining(buf, count.saturating_mul(min_item_width))?;

    let capacity = match min_item_width {
        0 => count.min(buf.remaining()),
        width => count.min(buf.remaining() / width),
    };
    let mut items = Vec::with_capacity(capacity);
    for index in 0..count {
        items.push(get_item(buf).map_err(|e| e.at_index(index))?);
    }
    Ok(Some(items))
}
