//! Versioned, schema-driven codec for the Kafka wire protocol
//!
//! Message bodies are described as [`kafka::MessageSchema`] tables and
//! encoded or decoded by one generic engine for any supported version:
//!
//! ```rust
//! use bytes::BytesMut;
//! use kafka_wire::kafka::{ApiVersion, ApiVersionsResponse, Decodable, Encodable};
//!
//! let response = ApiVersionsResponse {
//!     api_keys: vec![ApiVersion { api_key: 18, min_version: 0, max_version: 3 }],
//!     ..Default::default()
//! };
//! let mut buf = BytesMut::new();
//! response.encode(&mut buf, 3).unwrap();
//!
//! let decoded = ApiVersionsResponse::decode(&mut buf.freeze(), 3).unwrap();
//! assert_eq!(decoded, response);
//! ```

// Module declarations
mod config; // Codec settings (serde-deserializable)
pub mod kafka; // Wire codec, schemas and errors

// Test utilities (only compiled in test builds)
#[cfg(test)]
pub mod testing;

pub use config::CodecConfig;
