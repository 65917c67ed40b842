//! Declarative message schemas
//!
//! A message type is described as data: a [`MessageSchema`] holds the root
//! [`RecordSpec`], the supported version interval and the flexible threshold.
//! Each [`FieldSpec`] records when the field exists, whether it is tagged,
//! when it is nullable and what its absent value is. One generic engine reads
//! these tables instead of every message type carrying its own branch tree.
//!
//! ```rust
//! use kafka_wire::kafka::protocol::{FieldKind, FieldSpec, MessageSchema, RecordSpec, VersionRange};
//!
//! let root = RecordSpec::new(
//!     "HeartbeatRequest",
//!     vec![
//!         FieldSpec::new("group_id", FieldKind::String),
//!         FieldSpec::new("generation_id", FieldKind::Int32),
//!         FieldSpec::new("member_id", FieldKind::String),
//!         FieldSpec::new("group_instance_id", FieldKind::String)
//!             .versions(VersionRange::since(3))
//!             .nullable(VersionRange::since(3)),
//!     ],
//! )
//! .unwrap();
//! let schema = MessageSchema::new(root, VersionRange::new(0, 4), Some(4));
//! assert!(schema.is_flexible(4));
//! ```

use std::collections::HashSet;
use std::fmt;

use uuid::Uuid;

use super::super::error::{KafkaError, Result};
use super::value::{Record, Value};

/// Inclusive version interval, optionally unbounded above
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    pub min: i16,
    pub max: Option<i16>,
}

impl VersionRange {
    /// `min..=max`
    pub const fn new(min: i16, max: i16) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// `min` and every later version
    pub const fn since(min: i16) -> Self {
        Self { min, max: None }
    }

    /// Every version
    pub const ALL: VersionRange = VersionRange::since(0);

    pub fn contains(&self, version: i16) -> bool {
        version >= self.min && self.max.map_or(true, |max| version <= max)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}+", self.min),
        }
    }
}

/// Wire type of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint16,
    Uint32,
    Float64,
    Uuid,
    VarInt,
    VarLong,
    UnsignedVarInt,
    String,
    Bytes,
    Struct(RecordSpec),
    Array(Box<FieldKind>),
}

impl FieldKind {
    pub fn array_of(element: FieldKind) -> Self {
        FieldKind::Array(Box::new(element))
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int8 => "int8",
            FieldKind::Int16 => "int16",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::Uint16 => "uint16",
            FieldKind::Uint32 => "uint32",
            FieldKind::Float64 => "float64",
            FieldKind::Uuid => "uuid",
            FieldKind::VarInt => "varint",
            FieldKind::VarLong => "varlong",
            FieldKind::UnsignedVarInt => "uvarint",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Struct(_) => "struct",
            FieldKind::Array(_) => "array",
        }
    }

    /// Zero value of the kind: 0, false, nil UUID, empty string/bytes/array,
    /// or a struct of field defaults
    pub fn default_value(&self) -> Value {
        match self {
            FieldKind::Bool => Value::Bool(false),
            FieldKind::Int8 => Value::Int8(0),
            FieldKind::Int16 => Value::Int16(0),
            FieldKind::Int32 => Value::Int32(0),
            FieldKind::Int64 => Value::Int64(0),
            FieldKind::Uint16 => Value::Uint16(0),
            FieldKind::Uint32 => Value::Uint32(0),
            FieldKind::Float64 => Value::Float64(0.0),
            FieldKind::Uuid => Value::Uuid(Uuid::nil()),
            FieldKind::VarInt => Value::VarInt(0),
            FieldKind::VarLong => Value::VarLong(0),
            FieldKind::UnsignedVarInt => Value::UnsignedVarInt(0),
            FieldKind::String => Value::String(Some(String::new())),
            FieldKind::Bytes => Value::Bytes(Some(Default::default())),
            FieldKind::Struct(spec) => Value::Struct(Some(spec.default_record())),
            FieldKind::Array(_) => Value::Array(Some(Vec::new())),
        }
    }

    /// Whether `value` is a variant this kind can encode
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldKind::Bool, Value::Bool(_))
                | (FieldKind::Int8, Value::Int8(_))
                | (FieldKind::Int16, Value::Int16(_))
                | (FieldKind::Int32, Value::Int32(_))
                | (FieldKind::Int64, Value::Int64(_))
                | (FieldKind::Uint16, Value::Uint16(_))
                | (FieldKind::Uint32, Value::Uint32(_))
                | (FieldKind::Float64, Value::Float64(_))
                | (FieldKind::Uuid, Value::Uuid(_))
                | (FieldKind::VarInt, Value::VarInt(_))
                | (FieldKind::VarLong, Value::VarLong(_))
                | (FieldKind::UnsignedVarInt, Value::UnsignedVarInt(_))
                | (FieldKind::String, Value::String(_))
                | (FieldKind::Bytes, Value::Bytes(_))
                | (FieldKind::Struct(_), Value::Struct(_))
                | (FieldKind::Array(_), Value::Array(_))
        )
    }
}

/// One field of a record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    versions: VersionRange,
    nullable_versions: Option<VersionRange>,
    tag: Option<u32>,
    default: Value,
    omit_default: bool,
}

impl FieldSpec {
    /// A main-body field present in every version, non-nullable, with the
    /// kind's zero value as default
    pub fn new(name: &str, kind: FieldKind) -> Self {
        let default = kind.default_value();
        Self {
            name: name.to_string(),
            kind,
            versions: VersionRange::ALL,
            nullable_versions: None,
            tag: None,
            default,
            omit_default: true,
        }
    }

    pub fn versions(mut self, versions: VersionRange) -> Self {
        self.versions = versions;
        self
    }

    pub fn nullable(mut self, versions: VersionRange) -> Self {
        self.nullable_versions = Some(versions);
        self
    }

    /// Move the field into the tagged-fields epilogue under `tag`
    ///
    /// The field's `versions` range then gives the versions carrying the tag.
    pub fn tagged(mut self, tag: u32) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Absent value: returned when the field is gated out, and suppressed on
    /// encode when the field is tagged
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Write a tagged field even when it holds its default value
    pub fn keep_default(mut self) -> Self {
        self.omit_default = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn version_range(&self) -> VersionRange {
        self.versions
    }

    pub fn tag(&self) -> Option<u32> {
        self.tag
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    pub fn omits_default(&self) -> bool {
        self.omit_default
    }

    pub fn is_present(&self, version: i16) -> bool {
        self.versions.contains(version)
    }

    pub fn is_nullable(&self, version: i16) -> bool {
        self.nullable_versions
            .is_some_and(|versions| versions.contains(version))
    }
}

/// One struct level: an ordered, non-empty list of fields
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSpec {
    name: String,
    fields: Vec<FieldSpec>,
}

impl RecordSpec {
    /// Validates that the record is non-empty, that field names are unique
    /// and that tags are unique within this level, and that every default
    /// matches its field's kind
    pub fn new(name: &str, fields: Vec<FieldSpec>) -> Result<Self> {
        if fields.is_empty() {
            return Err(KafkaError::InvalidSchema(format!("{name} has no fields")));
        }

        let mut names = HashSet::new();
        let mut tags = HashSet::new();
        for field in &fields {
            if !names.insert(field.name.as_str()) {
                return Err(KafkaError::InvalidSchema(format!(
                    "{name} declares field {} twice",
                    field.name
                )));
            }
            if let Some(tag) = field.tag {
                if !tags.insert(tag) {
                    return Err(KafkaError::InvalidSchema(format!(
                        "{name} declares tag {tag} twice"
                    )));
                }
            }
            if !field.kind.accepts(&field.default) {
                return Err(KafkaError::InvalidSchema(format!(
                    "{name}.{} default is {}, expected {}",
                    field.name,
                    field.default.kind_name(),
                    field.kind.name()
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// The field carried under `tag` at this level, if any
    pub fn tagged_field(&self, tag: u32) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.tag == Some(tag))
    }

    /// A record holding every field's default, in declaration order
    pub fn default_record(&self) -> Record {
        let mut record = Record::with_capacity(self.fields.len());
        for field in &self.fields {
            record.push(&field.name, field.default.clone());
        }
        record
    }
}

/// Schema of one message type (one side of one API)
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSchema {
    root: RecordSpec,
    versions: VersionRange,
    flexible_from: Option<i16>,
}

impl MessageSchema {
    /// `flexible_from` is the first version using compact encodings and
    /// tagged-field epilogues; `None` if the message never becomes flexible
    pub fn new(root: RecordSpec, versions: VersionRange, flexible_from: Option<i16>) -> Self {
        Self {
            root,
            versions,
            flexible_from,
        }
    }

    pub fn name(&self) -> &str {
        self.root.name()
    }

    pub fn root(&self) -> &RecordSpec {
        &self.root
    }

    pub fn versions(&self) -> VersionRange {
        self.versions
    }

    pub fn flexible_from(&self) -> Option<i16> {
        self.flexible_from
    }

    pub fn is_flexible(&self, version: i16) -> bool {
        self.flexible_from.is_some_and(|threshold| version >= threshold)
    }

    pub fn check_version(&self, version: i16) -> Result<()> {
        if self.versions.contains(version) {
            return Ok(());
        }
        Err(KafkaError::UnsupportedVersion {
            message: self.name().to_string(),
            version,
            min: self.versions.min,
            max: self.versions.max.unwrap_or(i16::MAX),
        })
    }
}
