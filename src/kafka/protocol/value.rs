//! In-memory values the engine encodes from and decodes into
//!
//! A [`Record`] is one struct level: an ordered list of named [`Value`]s plus
//! whatever unknown tagged fields were retained when it was decoded. Decoded
//! records always carry every field of their schema, in declaration order,
//! with version-gated fields set to the schema default.

use std::collections::BTreeMap;

use bytes::Bytes;
use uuid::Uuid;

use super::super::error::{KafkaError, Result};

/// A single field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint16(u16),
    Uint32(u32),
    Float64(f64),
    Uuid(Uuid),
    VarInt(i32),
    VarLong(i64),
    UnsignedVarInt(u32),
    String(Option<String>),
    Bytes(Option<Bytes>),
    Array(Option<Vec<Value>>),
    Struct(Option<Record>),
}

impl Value {
    /// Wire type name, used in type-mismatch errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int8(_) => "int8",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Uint16(_) => "uint16",
            Value::Uint32(_) => "uint32",
            Value::Float64(_) => "float64",
            Value::Uuid(_) => "uuid",
            Value::VarInt(_) => "varint",
            Value::VarLong(_) => "varlong",
            Value::UnsignedVarInt(_) => "uvarint",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
        }
    }

    /// Whether this is the null form of a nullable value
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::String(None) | Value::Bytes(None) | Value::Array(None) | Value::Struct(None)
        )
    }

    /// Borrow the elements of a non-null array
    pub fn as_array(&self) -> Result<&[Value]> {
        match self {
            Value::Array(Some(items)) => Ok(items),
            Value::Array(None) => Err(KafkaError::NullValue),
            other => Err(KafkaError::TypeMismatch {
                expected: "array",
                found: other.kind_name(),
            }),
        }
    }

    /// Borrow a non-null struct
    pub fn as_record(&self) -> Result<&Record> {
        match self {
            Value::Struct(Some(record)) => Ok(record),
            Value::Struct(None) => Err(KafkaError::NullValue),
            other => Err(KafkaError::TypeMismatch {
                expected: "struct",
                found: other.kind_name(),
            }),
        }
    }
}

/// Generates `From<T> for Value` and `TryFrom<&Value> for T` for scalar types.
macro_rules! scalar_conversions {
    ($($variant:ident => $ty:ty, $name:literal;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl TryFrom<&Value> for $ty {
                type Error = KafkaError;

                fn try_from(value: &Value) -> Result<Self> {
                    match value {
                        Value::$variant(inner) => Ok(*inner),
                        other => Err(KafkaError::TypeMismatch {
                            expected: $name,
                            found: other.kind_name(),
                        }),
                    }
                }
            }
        )*
    };
}

// VarInt, VarLong and UnsignedVarInt share Rust types with Int32, Int64 and
// Uint32, so they are built explicitly rather than through From.
scalar_conversions! {
    Bool => bool, "bool";
    Int8 => i8, "int8";
    Int16 => i16, "int16";
    Int32 => i32, "int32";
    Int64 => i64, "int64";
    Uint16 => u16, "uint16";
    Uint32 => u32, "uint32";
    Float64 => f64, "float64";
    Uuid => Uuid, "uuid";
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Some(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Some(value))
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        Value::String(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Bytes(Some(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(Some(value))
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Struct(Some(value))
    }
}

impl TryFrom<&Value> for Option<String> {
    type Error = KafkaError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(inner) => Ok(inner.clone()),
            other => Err(KafkaError::TypeMismatch {
                expected: "string",
                found: other.kind_name(),
            }),
        }
    }
}

impl TryFrom<&Value> for String {
    type Error = KafkaError;

    fn try_from(value: &Value) -> Result<Self> {
        Option::<String>::try_from(value)?.ok_or(KafkaError::NullValue)
    }
}

impl TryFrom<&Value> for Option<Bytes> {
    type Error = KafkaError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Bytes(inner) => Ok(inner.clone()),
            other => Err(KafkaError::TypeMismatch {
                expected: "bytes",
                found: other.kind_name(),
            }),
        }
    }
}

/// One struct level of a message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
    /// Raw payloads of tagged fields this record's schema does not know
    pub unknown_tagged_fields: BTreeMap<u32, Bytes>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
            unknown_tagged_fields: BTreeMap::new(),
        }
    }

    /// Builder form of [`Record::set`]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, replacing an existing value in place or appending a new one
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Append without checking for an existing field of the same name
    pub(crate) fn push(&mut self, name: &str, value: Value) {
        self.fields.push((name.to_string(), value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Look up a field and convert it to a Rust type
    pub fn get_as<'a, T>(&'a self, name: &str) -> Result<T>
    where
        T: TryFrom<&'a Value, Error = KafkaError>,
    {
        let value = self
            .get(name)
            .ok_or_else(|| KafkaError::MissingField(name.to_string()))?;
        T::try_from(value).map_err(|e| e.in_field(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
