// Tagged-field channel
//
// Every record level of a flexible message ends with an epilogue:
//
//   uvarint count
//   count x (uvarint tag, uvarint length, length raw bytes)
//
// Because every entry carries its own byte length, a reader that does not
// know a tag can always skip it, whatever the field's semantic type. That is
// what lets newer writers add optional fields without breaking older readers.
//
// This module only deals in raw (tag, payload) pairs. The engine decides which
// tags it knows for the current record level and decodes those payloads with
// the field's normal codec through `decode_payload`, which enforces that the
// decoder consumed exactly the declared length.

use std::collections::HashSet;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

use super::super::error::{KafkaError, Result};
use super::primitives::{ensure_capacity, ensure_remaining, get_uvarint, put_uvarint};

/// A raw tagged field: tag id and its serialized payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedField {
    pub tag: u32,
    pub payload: Bytes,
}

impl TaggedField {
    pub fn new(tag: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            tag,
            payload: payload.into(),
        }
    }

    /// Serialize a value into a scratch buffer and wrap it as a tagged field
    pub fn encode_with<F>(tag: u32, encode: F) -> Result<Self>
    where
        F: FnOnce(&mut BytesMut) -> Result<()>,
    {
        let mut scratch = BytesMut::new();
        encode(&mut scratch)?;
        Ok(Self {
            tag,
            payload: scratch.freeze(),
        })
    }

    /// Decode the payload, requiring the decoder to consume exactly all of it
    ///
    /// A decoder that stops short, or one that runs past the end of the
    /// payload, is a SchemaMismatch: the declared length and the schema
    /// disagree about the field's size.
    pub fn decode_payload<T, F>(&self, decode: F) -> Result<T>
    where
        F: FnOnce(&mut Bytes) -> Result<T>,
    {
        let declared = self.payload.len();
        let mut payload = self.payload.clone();
        let value = match decode(&mut payload) {
            Ok(value) => value,
            Err(err) => {
                let KafkaError::Truncated { needed, remaining } = *err.root() else {
                    return Err(err);
                };
                let mismatch = KafkaError::SchemaMismatch {
                    tag: self.tag,
                    declared,
                    consumed: declared - remaining + needed,
                };
                return Err(match err.path() {
                    Some(path) => mismatch.in_field(path),
                    None => mismatch,
                });
            }
        };
        if payload.has_remaining() {
            return Err(KafkaError::SchemaMismatch {
                tag: self.tag,
                declared,
                consumed: declared - payload.remaining(),
            });
        }
        Ok(value)
    }
}

/// Write a tagged-fields epilogue, entries in the given order
pub fn put_tagged_fields<B: BufMut>(buf: &mut B, fields: &[TaggedField]) -> Result<()> {
    let count = u32::try_from(fields.len()).map_err(|_| KafkaError::InvalidLength {
        length: fields.len() as i64,
        reason: "too many tagged fields",
    })?;
    put_uvarint(buf, count)?;
    for field in fields {
        let length = u32::try_from(field.payload.len()).map_err(|_| KafkaError::InvalidLength {
            length: field.payload.len() as i64,
            reason: "tagged field payload too large",
        })?;
        put_uvarint(buf, field.tag)?;
        put_uvarint(buf, length)?;
        ensure_capacity(buf, field.payload.len())?;
        buf.put_slice(&field.payload);
    }
    Ok(())
}

/// Read a tagged-fields epilogue into raw entries, in wire order
///
/// Tags may arrive in any order; a tag repeated within one epilogue is an
/// error. Payloads are sliced out without interpretation.
pub fn get_tagged_fields<B: Buf>(buf: &mut B) -> Result<Vec<TaggedField>> {
    let count = get_uvarint(buf)? as usize;
    // Each entry takes at least two bytes (tag and length)
    let mut fields = Vec::with_capacity(count.min(buf.remaining() / 2));
    let mut seen = HashSet::with_capacity(fields.capacity());

    for _ in 0..count {
        let tag = get_uvarint(buf)?;
        let length = get_uvarint(buf)? as usize;
        if !seen.insert(tag) {
            return Err(KafkaError::DuplicateTag(tag));
        }
        ensure_remaining(buf, length)?;
        trace!("Tagged field {} with {} byte payload", tag, length);
        fields.push(TaggedField {
            tag,
            payload: buf.copy_to_bytes(length),
        });
    }
    Ok(fields)
}

/// Skip a tagged-fields epilogue entirely, returning how many entries it held
///
/// Applies the same structural checks as `get_tagged_fields` without copying
/// any payload out.
pub fn skip_tagged_fields<B: Buf>(buf: &mut B) -> Result<usize> {
    let count = get_uvarint(buf)? as usize;
    let mut seen = HashSet::with_capacity(count.min(buf.remaining() / 2));
    for _ in 0..count {
        let tag = get_uvarint(buf)?;
        let length = get_uvarint(buf)? as usize;
        if !seen.insert(tag) {
            return Err(KafkaError::DuplicateTag(tag));
        }
        ensure_remaining(buf, length)?;
        buf.advance(length);
    }
    Ok(count)
}
