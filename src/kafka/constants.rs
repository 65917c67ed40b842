//! Kafka wire codec constants
//!
//! This module centralizes the magic numbers of the wire format so the codec
//! modules never spell out a raw `-1` or `0x80`.
//!
//! # Terminology
//! - **Plain encoding**: fixed-width length prefixes (`int16` for strings,
//!   `int32` for bytes and arrays) with `-1` meaning null
//! - **Compact encoding**: `uvarint` length-plus-one prefixes with `0` meaning null,
//!   used by flexible versions

// ===== Protocol Error Codes =====
// See: https://kafka.apache.org/protocol.html#protocol_error_codes

/// The server experienced an unexpected error when processing the request
pub const ERROR_UNKNOWN_SERVER_ERROR: i16 = -1;

/// No error
pub const ERROR_NONE: i16 = 0;

/// Message contents do not match the schema (truncated, bad lengths, bad UTF-8)
pub const ERROR_CORRUPT_MESSAGE: i16 = 2;

/// The version of the API is not supported
pub const ERROR_UNSUPPORTED_VERSION: i16 = 35;

/// The request was structurally valid but semantically invalid
pub const ERROR_INVALID_REQUEST: i16 = 42;

// ===== API Keys =====

/// API key for ApiVersions requests
///
/// The only message type shipped as a built-in schema instance
pub const API_KEY_API_VERSIONS: i16 = 18;

// ===== Wire Format =====

/// Plain length prefix denoting a null string, byte array or array
pub const PLAIN_NULL_LENGTH: i32 = -1;

/// Compact length prefix denoting a null string, byte array or array
pub const COMPACT_NULL_LENGTH: u32 = 0;

/// Presence marker written before a nullable struct that is null
pub const NULL_STRUCT_MARKER: i8 = -1;

/// Presence marker written before a nullable struct that is present
pub const PRESENT_STRUCT_MARKER: i8 = 1;

/// Payload bits carried by each varint group
pub const VARINT_GROUP_BITS: u32 = 7;

/// Mask selecting the payload bits of a varint group
pub const VARINT_GROUP_MASK: u8 = 0x7F;

/// Continuation flag of a varint group (more groups follow)
pub const VARINT_CONTINUATION: u8 = 0x80;

/// Maximum encoded width of a 32-bit varint
pub const MAX_VARINT_BYTES: usize = 5;

/// Maximum encoded width of a 64-bit varint (varlong)
pub const MAX_VARLONG_BYTES: usize = 10;

/// Width of a UUID on the wire
pub const UUID_BYTES: usize = 16;

// ===== Codec Configuration Defaults =====

/// Default upper bound on a decoded collection count
///
/// Guards against a hostile count prefix forcing a huge allocation or loop.
pub const DEFAULT_MAX_COLLECTION_LEN: usize = 1 << 24;

/// Retain unknown tagged fields on decode and re-emit them on encode
pub const DEFAULT_PRESERVE_UNKNOWN_TAGS: bool = true;

/// Reject strings that are not valid UTF-8
pub const DEFAULT_VALIDATE_UTF8: bool = true;
