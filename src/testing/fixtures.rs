//! Fixture schemas
//!
//! Each builder returns a schema tuned to one engine behaviour.

use crate::kafka::protocol::{FieldKind, FieldSpec, MessageSchema, RecordSpec, VersionRange};

/// `id` always present, `epoch` only from v2 (default -1)
pub fn gated_schema() -> MessageSchema {
    let root = RecordSpec::new(
        "Gated",
        vec![
            FieldSpec::new("id", FieldKind::Int32),
            FieldSpec::new("epoch", FieldKind::Int32)
                .versions(VersionRange::since(2))
                .default_value(-1i32),
        ],
    )
    .unwrap();
    MessageSchema::new(root, VersionRange::new(0, 4), None)
}

/// Flexible from v6, with one tagged field that exists from v7
pub fn flexible_threshold_schema() -> MessageSchema {
    let root = RecordSpec::new(
        "Threshold",
        vec![
            FieldSpec::new("name", FieldKind::String),
            FieldSpec::new("rack", FieldKind::String)
                .versions(VersionRange::since(7))
                .nullable(VersionRange::since(7))
                .tagged(0)
                .default_value(Option::<String>::None),
        ],
    )
    .unwrap();
    MessageSchema::new(root, VersionRange::new(0, 8), Some(6))
}

/// Known tags 0 (int64, default -1) and 2 (string) on a flexible message
pub fn tagged_schema() -> MessageSchema {
    let root = RecordSpec::new(
        "Tagged",
        vec![
            FieldSpec::new("id", FieldKind::Int16),
            FieldSpec::new("leader_epoch", FieldKind::Int64)
                .tagged(0)
                .default_value(-1i64),
            FieldSpec::new("note", FieldKind::String).tagged(2),
        ],
    )
    .unwrap();
    MessageSchema::new(root, VersionRange::new(0, 1), Some(0))
}

/// topics: [ { name, partitions: [int32], rack: nullable string } ]
///
/// Plain at v0, compact from v1.
pub fn nested_schema() -> MessageSchema {
    let topic = RecordSpec::new(
        "Topic",
        vec![
            FieldSpec::new("name", FieldKind::String),
            FieldSpec::new("partitions", FieldKind::array_of(FieldKind::Int32)),
            FieldSpec::new("rack", FieldKind::String).nullable(VersionRange::ALL),
        ],
    )
    .unwrap();
    let root = RecordSpec::new(
        "Nested",
        vec![FieldSpec::new(
            "topics",
            FieldKind::array_of(FieldKind::Struct(topic)),
        )],
    )
    .unwrap();
    MessageSchema::new(root, VersionRange::new(0, 1), Some(1))
}
