// Versioned field engine
//
// Encodes and decodes a Record against a MessageSchema at one protocol
// version. Per record level, in declaration order:
//
//   1. flexible = version >= flexible threshold (once per message; nested
//      records inherit it unchanged)
//   2. untagged field outside its version range: no bytes, decodes to its
//      default; inside: dispatched to the codec for its kind, compact or plain
//      per `flexible`, recursing into structs and arrays of structs
//   3. tagged fields in range are collected and, only when flexible, written
//      to / read from the record's tagged-fields epilogue after the main body
//
// The byte source or sink is borrowed for the duration of one call; tagged
// payloads are built in a scratch buffer local to the field being written.
// Any failure aborts the call and carries the failing field's path.

use std::collections::HashSet;

use bytes::{Buf, BufMut, BytesMut};
use tracing::{debug, trace};

use super::super::constants::{NULL_STRUCT_MARKER, PRESENT_STRUCT_MARKER, UUID_BYTES};
use super::super::error::{KafkaError, Result};
use super::collections::{get_array, put_array, ArrayFormat};
use super::primitives::*;
use super::schema::{FieldKind, FieldSpec, MessageSchema, RecordSpec};
use super::strings::{read_bytes, read_str, write_bytes, write_str};
use super::tagged::{get_tagged_fields, put_tagged_fields, skip_tagged_fields, TaggedField};
use super::value::{Record, Value};
use crate::config::CodecConfig;

/// Per-call parameters shared by every record level of one message
#[derive(Debug, Clone, Copy)]
struct Pass<'a> {
    version: i16,
    flexible: bool,
    config: &'a CodecConfig,
}

/// Schema-driven encoder/decoder
///
/// Holds only its configuration; every call is independent and a `Codec` can
/// be shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn pass(&self, schema: &MessageSchema, version: i16) -> Result<Pass<'_>> {
        schema.check_version(version)?;
        Ok(Pass {
            version,
            flexible: schema.is_flexible(version),
            config: &self.config,
        })
    }

    /// Encode `record` as `schema` at `version`
    ///
    /// Nothing is written if the version is unsupported. Fields missing from
    /// `record` are encoded as their schema default.
    pub fn encode<B: BufMut>(
        &self,
        schema: &MessageSchema,
        record: &Record,
        version: i16,
        buf: &mut B,
    ) -> Result<()> {
        let pass = self.pass(schema, version)?;
        trace!(
            "Encoding {} v{} (flexible={})",
            schema.name(),
            version,
            pass.flexible
        );
        encode_record(&pass, schema.root(), record, buf)
    }

    /// Decode a `schema` message at `version`
    ///
    /// Nothing is consumed if the version is unsupported.
    pub fn decode<B: Buf>(&self, schema: &MessageSchema, buf: &mut B, version: i16) -> Result<Record> {
        let pass = self.pass(schema, version)?;
        trace!(
            "Decoding {} v{} (flexible={}) from {} bytes",
            schema.name(),
            version,
            pass.flexible,
            buf.remaining()
        );
        decode_record(&pass, schema.root(), buf)
    }

    /// Exact encoded length of `record` as `schema` at `version`
    pub fn compute_size(&self, schema: &MessageSchema, record: &Record, version: i16) -> Result<usize> {
        let mut scratch = BytesMut::new();
        self.encode(schema, record, version, &mut scratch)?;
        Ok(scratch.len())
    }
}

impl MessageSchema {
    /// Encode with the default codec configuration
    pub fn encode<B: BufMut>(&self, record: &Record, buf: &mut B, version: i16) -> Result<()> {
        Codec::default().encode(self, record, version, buf)
    }

    /// Decode with the default codec configuration
    pub fn decode<B: Buf>(&self, buf: &mut B, version: i16) -> Result<Record> {
        Codec::default().decode(self, buf, version)
    }

    pub fn compute_size(&self, record: &Record, version: i16) -> Result<usize> {
        Codec::default().compute_size(self, record, version)
    }

    pub fn encode_with_config<B: BufMut>(
        &self,
        record: &Record,
        buf: &mut B,
        version: i16,
        config: &CodecConfig,
    ) -> Result<()> {
        Codec::new(config.clone())?.encode(self, record, version, buf)
    }

    pub fn decode_with_config<B: Buf>(
        &self,
        buf: &mut B,
        version: i16,
        config: &CodecConfig,
    ) -> Result<Record> {
        Codec::new(config.clone())?.decode(self, buf, version)
    }
}

// ===== Typed messages =====

/// A typed message that can be written at a given protocol version
pub trait Encodable {
    fn encode<B: BufMut>(&self, buf: &mut B, version: i16) -> Result<()>;

    /// Exact number of bytes `encode` would write
    fn compute_size(&self, version: i16) -> Result<usize> {
        let mut scratch = BytesMut::new();
        self.encode(&mut scratch, version)?;
        Ok(scratch.len())
    }
}

/// A typed message that can be read at a given protocol version
pub trait Decodable: Sized {
    fn decode<B: Buf>(buf: &mut B, version: i16) -> Result<Self>;
}

// ===== Encoding =====

fn encode_record<B: BufMut>(
    pass: &Pass<'_>,
    spec: &RecordSpec,
    record: &Record,
    buf: &mut B,
) -> Result<()> {
    let mut tagged = Vec::new();

    for field in spec.fields() {
        if !field.is_present(pass.version) {
            trace!(
                "{}.{} not present in v{}",
                spec.name(),
                field.name(),
                pass.version
            );
            continue;
        }
        let value = record.get(field.name()).unwrap_or(field.default());

        match field.tag() {
            None => encode_field(pass, field, value, buf).map_err(|e| e.in_field(field.name()))?,
            // Below the flexible threshold tagged fields have nowhere to go
            Some(_) if !pass.flexible => {}
            Some(_) if field.omits_default() && value == field.default() => {}
            Some(tag) => {
                let entry = TaggedField::encode_with(tag, |scratch| {
                    encode_field(pass, field, value, scratch)
                })
                .map_err(|e| e.in_field(field.name()))?;
                tagged.push(entry);
            }
        }
    }

    if pass.flexible {
        if pass.config.preserve_unknown_tags && !record.unknown_tagged_fields.is_empty() {
            let written: HashSet<u32> = tagged.iter().map(|entry| entry.tag).collect();
            for (tag, payload) in &record.unknown_tagged_fields {
                if written.contains(tag) {
                    debug!(
                        "{}: dropping retained tag {} shadowed by a known field",
                        spec.name(),
                        tag
                    );
                    continue;
                }
                tagged.push(TaggedField::new(*tag, payload.clone()));
            }
        }
        tagged.sort_by_key(|entry| entry.tag);
        put_tagged_fields(buf, &tagged)?;
    }
    Ok(())
}

fn encode_field<B: BufMut>(
    pass: &Pass<'_>,
    field: &FieldSpec,
    value: &Value,
    buf: &mut B,
) -> Result<()> {
    encode_value(pass, field.kind(), field.is_nullable(pass.version), value, buf)
}

fn encode_value<B: BufMut>(
    pass: &Pass<'_>,
    kind: &FieldKind,
    nullable: bool,
    value: &Value,
    buf: &mut B,
) -> Result<()> {
    match (kind, value) {
        (FieldKind::Bool, Value::Bool(v)) => put_bool(buf, *v),
        (FieldKind::Int8, Value::Int8(v)) => put_i8(buf, *v),
        (FieldKind::Int16, Value::Int16(v)) => put_i16(buf, *v),
        (FieldKind::Int32, Value::Int32(v)) => put_i32(buf, *v),
        (FieldKind::Int64, Value::Int64(v)) => put_i64(buf, *v),
        (FieldKind::Uint16, Value::Uint16(v)) => put_u16(buf, *v),
        (FieldKind::Uint32, Value::Uint32(v)) => put_u32(buf, *v),
        (FieldKind::Float64, Value::Float64(v)) => put_f64(buf, *v),
        (FieldKind::Uuid, Value::Uuid(v)) => put_uuid(buf, v),
        (FieldKind::VarInt, Value::VarInt(v)) => put_varint(buf, *v),
        (FieldKind::VarLong, Value::VarLong(v)) => put_varlong(buf, *v),
        (FieldKind::UnsignedVarInt, Value::UnsignedVarInt(v)) => put_uvarint(buf, *v),
        (FieldKind::String, Value::String(v)) => write_str(buf, v.as_deref(), pass.flexible, nullable),
        (FieldKind::Bytes, Value::Bytes(v)) => write_bytes(buf, v.as_deref(), pass.flexible, nullable),
        (FieldKind::Array(element), Value::Array(items)) => {
            let format = ArrayFormat {
                compact: pass.flexible,
                nullable,
            };
            // Array elements are never nullable themselves
            put_array(buf, items.as_deref(), format, |buf, item| {
                encode_value(pass, element, false, item, buf)
            })
        }
        (FieldKind::Struct(spec), Value::Struct(record)) => match (record, nullable) {
            (Some(record), true) => {
                put_i8(buf, PRESENT_STRUCT_MARKER)?;
                encode_record(pass, spec, record, buf)
            }
            (Some(record), false) => encode_record(pass, spec, record, buf),
            (None, true) => put_i8(buf, NULL_STRUCT_MARKER),
            (None, false) => Err(KafkaError::NullValue),
        },
        (kind, value) => Err(KafkaError::TypeMismatch {
            expected: kind.name(),
            found: value.kind_name(),
        }),
    }
}

// ===== Decoding =====

fn decode_record<B: Buf>(pass: &Pass<'_>, spec: &RecordSpec, buf: &mut B) -> Result<Record> {
    let mut record = Record::with_capacity(spec.fields().len());

    for field in spec.fields() {
        let value = if field.tag().is_none() && field.is_present(pass.version) {
            decode_field(pass, field, buf).map_err(|e| e.in_field(field.name()))?
        } else {
            field.default().clone()
        };
        record.push(field.name(), value);
    }

    if pass.flexible {
        decode_epilogue(pass, spec, &mut record, buf)?;
    }
    Ok(record)
}

fn decode_epilogue<B: Buf>(
    pass: &Pass<'_>,
    spec: &RecordSpec,
    record: &mut Record,
    buf: &mut B,
) -> Result<()> {
    let any_known = spec
        .fields()
        .iter()
        .any(|field| field.tag().is_some() && field.is_present(pass.version));

    // Nothing to decode or keep at this level: step over the payloads
    if !any_known && !pass.config.preserve_unknown_tags {
        let skipped = skip_tagged_fields(buf)?;
        if skipped > 0 {
            debug!("{}: skipped {} unknown tags", spec.name(), skipped);
        }
        return Ok(());
    }

    for entry in get_tagged_fields(buf)? {
        let known = spec
            .tagged_field(entry.tag)
            .filter(|field| field.is_present(pass.version));

        match known {
            Some(field) => {
                let value = entry
                    .decode_payload(|payload| decode_field(pass, field, payload))
                    .map_err(|e| e.in_field(field.name()))?;
                record.set(field.name(), value);
            }
            None if pass.config.preserve_unknown_tags => {
                debug!(
                    "{}: retaining unknown tag {} ({} bytes)",
                    spec.name(),
                    entry.tag,
                    entry.payload.len()
                );
                record.unknown_tagged_fields.insert(entry.tag, entry.payload);
            }
            None => {
                debug!(
                    "{}: skipping unknown tag {} ({} bytes)",
                    spec.name(),
                    entry.tag,
                    entry.payload.len()
                );
            }
        }
    }
    Ok(())
}

fn decode_field<B: Buf>(pass: &Pass<'_>, field: &FieldSpec, buf: &mut B) -> Result<Value> {
    decode_value(pass, field.kind(), field.is_nullable(pass.version), buf)
}

fn decode_value<B: Buf>(
    pass: &Pass<'_>,
    kind: &FieldKind,
    nullable: bool,
    buf: &mut B,
) -> Result<Value> {
    let value = match kind {
        FieldKind::Bool => Value::Bool(get_bool(buf)?),
        FieldKind::Int8 => Value::Int8(get_i8(buf)?),
        FieldKind::Int16 => Value::Int16(get_i16(buf)?),
        FieldKind::Int32 => Value::Int32(get_i32(buf)?),
        FieldKind::Int64 => Value::Int64(get_i64(buf)?),
        FieldKind::Uint16 => Value::Uint16(get_u16(buf)?),
        FieldKind::Uint32 => Value::Uint32(get_u32(buf)?),
        FieldKind::Float64 => Value::Float64(get_f64(buf)?),
        FieldKind::Uuid => Value::Uuid(get_uuid(buf)?),
        FieldKind::VarInt => Value::VarInt(get_varint(buf)?),
        FieldKind::VarLong => Value::VarLong(get_varlong(buf)?),
        FieldKind::UnsignedVarInt => Value::UnsignedVarInt(get_uvarint(buf)?),
        FieldKind::String => Value::String(read_str(
            buf,
            pass.flexible,
            nullable,
            pass.config.validate_utf8,
        )?),
        FieldKind::Bytes => Value::Bytes(read_bytes(buf, pass.flexible, nullable)?),
        FieldKind::Array(element) => {
            let format = ArrayFormat {
                compact: pass.flexible,
                nullable,
            };
            Value::Array(get_array(
                buf,
                format,
                pass.config.max_collection_len,
                min_width(pass, element, false),
                |buf| decode_value(pass, element, false, buf),
            )?)
        }
        FieldKind::Struct(spec) => {
            if nullable {
                match get_i8(buf)? {
                    NULL_STRUCT_MARKER => return Ok(Value::Struct(None)),
                    PRESENT_STRUCT_MARKER => {}
                    marker => {
                        return Err(KafkaError::InvalidLength {
                            length: i64::from(marker),
                            reason: "invalid nullable struct marker",
                        })
                    }
                }
            }
            Value::Struct(Some(decode_record(pass, spec, buf)?))
        }
    };
    Ok(value)
}

/// Fewest bytes a value of `kind` can occupy at this pass's version
fn min_width(pass: &Pass<'_>, kind: &FieldKind, nullable: bool) -> usize {
    match kind {
        FieldKind::Bool | FieldKind::Int8 => 1,
        FieldKind::Int16 | FieldKind::Uint16 => 2,
        FieldKind::Int32 | FieldKind::Uint32 => 4,
        FieldKind::Int64 | FieldKind::Float64 => 8,
        FieldKind::Uuid => UUID_BYTES,
        FieldKind::VarInt | FieldKind::VarLong | FieldKind::UnsignedVarInt => 1,
        // Compact prefixes are at least one uvarint byte
        FieldKind::String if pass.flexible => 1,
        FieldKind::String => 2,
        FieldKind::Bytes | FieldKind::Array(_) if pass.flexible => 1,
        FieldKind::Bytes | FieldKind::Array(_) => 4,
        FieldKind::Struct(_) if nullable => 1,
        FieldKind::Struct(spec) => {
            let body: usize = spec
                .fields()
                .iter()
                .filter(|field| field.tag().is_none() && field.is_present(pass.version))
                .map(|field| min_width(pass, field.kind(), field.is_nullable(pass.version)))
                .sum();
            body + usize::from(pass.flexible)
        }
    }
}
