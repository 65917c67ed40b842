// Test helpers and utilities for kafka-wire integration tests
//
// Shared by the other test files through `mod helpers;`. Provides tracing
// setup for debugging failing tests (RUST_LOG=kafka_wire=trace) and a few
// shorthand wrappers around the public codec API.

#![allow(dead_code)]

use bytes::{Bytes, BytesMut};
use kafka_wire::kafka::protocol::{
    FieldKind, FieldSpec, MessageSchema, Record, RecordSpec, Value, VersionRange,
};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber writing through the test harness
///
/// Safe to call from every test; only the first call installs it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Encode a record and freeze the output
pub fn encode(schema: &MessageSchema, record: &Record, version: i16) -> Bytes {
    let mut buf = BytesMut::new();
    schema
        .encode(record, &mut buf, version)
        .unwrap_or_else(|e| panic!("encode {} v{version} failed: {e}", schema.name()));
    buf.freeze()
}

/// Decode a complete message, asserting no trailing bytes remain
pub fn decode(schema: &MessageSchema, bytes: &[u8], version: i16) -> Record {
    let mut buf = Bytes::copy_from_slice(bytes);
    let record = schema
        .decode(&mut buf, version)
        .unwrap_or_else(|e| panic!("decode {} v{version} failed: {e}", schema.name()));
    assert!(buf.is_empty(), "{} trailing bytes", buf.len());
    record
}

/// A cut-down Metadata-like response: brokers with an optional rack, plus a
/// cluster id that turns nullable at v2 and a tagged controller epoch
///
/// Versions 0..=3, flexible from 3.
pub fn cluster_schema() -> MessageSchema {
    let broker = RecordSpec::new(
        "Broker",
        vec![
            FieldSpec::new("node_id", FieldKind::Int32),
            FieldSpec::new("host", FieldKind::String),
            FieldSpec::new("port", FieldKind::Int32),
            FieldSpec::new("rack", FieldKind::String)
                .versions(VersionRange::since(1))
                .nullable(VersionRange::since(1))
                .default_value(Option::<String>::None),
        ],
    )
    .unwrap();

    let root = RecordSpec::new(
        "Cluster",
        vec![
            FieldSpec::new("throttle_time_ms", FieldKind::Int32).versions(VersionRange::since(1)),
            FieldSpec::new("brokers", FieldKind::array_of(FieldKind::Struct(broker))),
            FieldSpec::new("cluster_id", FieldKind::String)
                .versions(VersionRange::since(2))
                .nullable(VersionRange::since(2))
                .default_value(Option::<String>::None),
            FieldSpec::new("controller_epoch", FieldKind::Int32)
                .versions(VersionRange::since(3))
                .tagged(0)
                .default_value(-1i32),
        ],
    )
    .unwrap();
    MessageSchema::new(root, VersionRange::new(0, 3), Some(3))
}

pub fn broker(node_id: i32, host: &str, port: i32, rack: Option<&str>) -> Value {
    Record::new()
        .with("node_id", node_id)
        .with("host", host)
        .with("port", port)
        .with("rack", Value::String(rack.map(str::to_string)))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_schema_builds() {
        let schema = cluster_schema();
        assert_eq!(schema.name(), "Cluster");
        assert!(!schema.is_flexible(2));
        assert!(schema.is_flexible(3));
    }

    #[test]
    fn test_encode_decode_helpers() {
        init_tracing();
        let schema = cluster_schema();
        let record = Record::new()
            .with("throttle_time_ms", 0i32)
            .with("brokers", vec![broker(1, "localhost", 9092, None)])
            .with("cluster_id", Value::String(None))
            .with("controller_epoch", -1i32);
        let bytes = encode(&schema, &record, 3);
        assert_eq!(decode(&schema, &bytes, 3), record);
    }
}
