// Kafka wire protocol implementation module
//
// This module contains all Kafka-specific code:
// - Protocol constants (error codes, wire sentinels, config defaults)
// - Error type shared by every codec layer
// - The generic versioned-field codec (protocol)
// - Reference schema instances built on top of it (schemas)
//
// Architecture Overview:
// =====================
//
// A message type is a table, not code:
//
//   MessageSchema { root: RecordSpec, versions, flexible_from }
//        |
//        v
//   engine (per version: which fields exist, compact or plain, tagged or not)
//        |
//        v
//   primitives / strings / collections / tagged  <->  bytes::Buf / BufMut
//
// Calls are independent and share no state, so schemas and codecs may be used
// from any number of threads at once.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod schemas;

// Re-export commonly used types for convenience
pub use constants::*;
pub use error::{KafkaError, Result};
pub use protocol::{
    Codec, Decodable, Encodable, FieldKind, FieldSpec, MessageSchema, Record, RecordSpec, Value,
    VersionRange,
};
pub use schemas::{ApiVersion, ApiVersionsRequest, ApiVersionsResponse};
