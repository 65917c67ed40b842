// String & byte-array codec
//
// Four encodings per payload type, {plain, compact} x {nullable, non-nullable}:
// - Plain strings carry an int16 length, plain bytes an int32 length, -1 = null
// - Compact strings and bytes carry a uvarint length+1, 0 = null
//
// The engine picks compact vs plain from the message's flexible mode and
// nullability from the field's nullable versions, then calls write_str /
// read_str (or the bytes pair) directly. The eight named wrappers below are the
// public face for callers hand-rolling a message outside the schema engine.

use bytes::{Buf, BufMut, Bytes};

use super::super::error::{KafkaError, Result};
use super::length::{read_length, write_length, LengthPrefix};
use super::primitives::{ensure_capacity, ensure_remaining};

pub fn write_str<B: BufMut>(
    buf: &mut B,
    value: Option<&str>,
    compact: bool,
    nullable: bool,
) -> Result<()> {
    write_raw(
        buf,
        value.map(str::as_bytes),
        LengthPrefix::select(compact, LengthPrefix::Int16),
        nullable,
    )
}

pub fn read_str<B: Buf>(
    buf: &mut B,
    compact: bool,
    nullable: bool,
    validate_utf8: bool,
) -> Result<Option<String>> {
    let prefix = LengthPrefix::select(compact, LengthPrefix::Int16);
    let Some(raw) = read_raw(buf, prefix, nullable)? else {
        return Ok(None);
    };
    let text = if validate_utf8 {
        std::str::from_utf8(&raw)?.to_owned()
    } else {
        String::from_utf8_lossy(&raw).into_owned()
    };
    Ok(Some(text))
}

pub fn write_bytes<B: BufMut>(
    buf: &mut B,
    value: Option<&[u8]>,
    compact: bool,
    nullable: bool,
) -> Result<()> {
    write_raw(
        buf,
        value,
        LengthPrefix::select(compact, LengthPrefix::Int32),
        nullable,
    )
}

pub fn read_bytes<B: Buf>(buf: &mut B, compact: bool, nullable: bool) -> Result<Option<Bytes>> {
    read_raw(buf, LengthPrefix::select(compact, LengthPrefix::Int32), nullable)
}

fn write_raw<B: BufMut>(
    buf: &mut B,
    value: Option<&[u8]>,
    prefix: LengthPrefix,
    nullable: bool,
) -> Result<()> {
    write_length(buf, value.map(<[u8]>::len), prefix, nullable)?;
    if let Some(payload) = value {
        ensure_capacity(buf, payload.len())?;
        buf.put_slice(payload);
    }
    Ok(())
}

fn read_raw<B: Buf>(buf: &mut B, prefix: LengthPrefix, nullable: bool) -> Result<Option<Bytes>> {
    let Some(length) = read_length(buf, prefix, nullable)? else {
        return Ok(None);
    };
    ensure_remaining(buf, length)?;
    Ok(Some(buf.copy_to_bytes(length)))
}

// ===== Named variants =====

/// Plain non-nullable string: int16 length + UTF-8
pub fn put_string<B: BufMut>(buf: &mut B, value: &str) -> Result<()> {
    write_str(buf, Some(value), false, false)
}

pub fn get_string<B: Buf>(buf: &mut B) -> Result<String> {
    read_str(buf, false, false, true)?.ok_or(KafkaError::NullValue)
}

/// Plain nullable string: int16 length, -1 = null
pub fn put_nullable_string<B: BufMut>(buf: &mut B, value: Option<&str>) -> Result<()> {
    write_str(buf, value, false, true)
}

pub fn get_nullable_string<B: Buf>(buf: &mut B) -> Result<Option<String>> {
    read_str(buf, false, true, true)
}

/// Compact non-nullable string: uvarint length+1 + UTF-8
pub fn put_compact_string<B: BufMut>(buf: &mut B, value: &str) -> Result<()> {
    write_str(buf, Some(value), true, false)
}

pub fn get_compact_string<B: Buf>(buf: &mut B) -> Result<String> {
    read_str(buf, true, false, true)?.ok_or(KafkaError::NullValue)
}

/// Compact nullable string: uvarint length+1, 0 = null
pub fn put_compact_nullable_string<B: BufMut>(buf: &mut B, value: Option<&str>) -> Result<()> {
    write_str(buf, value, true, true)
}

pub fn get_compact_nullable_string<B: Buf>(buf: &mut B) -> Result<Option<String>> {
    read_str(buf, true, true, true)
}

/// Plain non-nullable bytes: int32 length + payload
pub fn put_byte_array<B: BufMut>(buf: &mut B, value: &[u8]) -> Result<()> {
    write_bytes(buf, Some(value), false, false)
}

pub fn get_byte_array<B: Buf>(buf: &mut B) -> Result<Bytes> {
    read_bytes(buf, false, false)?.ok_or(KafkaError::NullValue)
}

/// Plain nullable bytes: int32 length, -1 = null
pub fn put_nullable_byte_array<B: BufMut>(buf: &mut B, value: Option<&[u8]>) -> Result<()> {
    write_bytes(buf, value, false, true)
}

pub fn get_nullable_byte_array<B: Buf>(buf: &mut B) -> Result<Option<Bytes>> {
    read_bytes(buf, false, true)
}

/// Compact non-nullable bytes: uvarint length+1 + payload
pub fn put_compact_byte_array<B: BufMut>(buf: &mut B, value: &[u8]) -> Result<()> {
    write_bytes(buf, Some(value), true, false)
}

pub fn get_compact_byte_array<B: Buf>(buf: &mut B) -> Result<Bytes> {
    read_bytes(buf, true, false)?.ok_or(KafkaError::NullValue)
}

/// Compact nullable bytes: uvarint length+1, 0 = null
pub fn put_compact_nullable_byte_array<B: BufMut>(
    buf: &mut B,
    value: Option<&[u8]>,
) -> Result<()> {
    write_bytes(buf, value, true, true)
}

pub fn get_compact_nullable_byte_array<B: Buf>(buf: &mut B) -> Result<Option<Bytes>> {
    read_bytes(buf, true, true)
}
