//! Kafka wire codec error types
//!
//! Every failure the codec produces is local and structural: the bytes (or the
//! value being encoded) do not fit the schema at the requested version. None of
//! them are retriable, and any of them aborts the whole top-level encode or
//! decode. Failures inside a record are wrapped in [`KafkaError::Field`] so the
//! caller sees the nesting path of the failing field, e.g.
//! `api_keys[2].max_version`.

use thiserror::Error;

use crate::kafka::constants::{
    ERROR_CORRUPT_MESSAGE, ERROR_INVALID_REQUEST, ERROR_UNKNOWN_SERVER_ERROR,
    ERROR_UNSUPPORTED_VERSION,
};

/// Errors that can occur while encoding or decoding Kafka messages
#[derive(Error, Debug)]
pub enum KafkaError {
    /// Requested version lies outside the message's supported interval
    #[error("Unsupported version {version} for {message} (supported: {min}..={max})")]
    UnsupportedVersion {
        message: String,
        version: i16,
        min: i16,
        max: i16,
    },

    /// Source exhausted before a fixed-width or length-delimited read completed
    #[error("Truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A length or count prefix is not acceptable for the field
    #[error("Invalid length {length}: {reason}")]
    InvalidLength { length: i64, reason: &'static str },

    /// A known tagged field's decoder did not consume exactly its declared length
    #[error("Tagged field {tag} declared {declared} bytes but its decoder consumed {consumed}")]
    SchemaMismatch {
        tag: u32,
        declared: usize,
        consumed: usize,
    },

    /// The same tag appeared twice in one tagged-fields epilogue
    #[error("Duplicate tagged field {0}")]
    DuplicateTag(u32),

    /// A varint kept its continuation bit set past the type's maximum width
    #[error("Varint exceeds {max_bytes} bytes")]
    VarintOverflow { max_bytes: usize },

    /// String payload is not valid UTF-8
    #[error("Invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A null value was supplied for a field that is not nullable at this version
    #[error("Null value for non-nullable field")]
    NullValue,

    /// The value's variant does not match the field kind declared by the schema
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A record handed to a typed conversion lacks a field
    #[error("Missing field: {0}")]
    MissingField(String),

    /// The sink has no room left for a write
    #[error("Buffer overflow: needed {needed} bytes, {remaining} remaining")]
    BufferOverflow { needed: usize, remaining: usize },

    /// Schema metadata is malformed (duplicate tags, empty record, ...)
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A failure inside a record, annotated with the failing field's path
    #[error("{path}: {source}")]
    Field {
        path: String,
        #[source]
        source: Box<KafkaError>,
    },
}

impl KafkaError {
    pub(crate) fn truncated(needed: usize, remaining: usize) -> Self {
        KafkaError::Truncated { needed, remaining }
    }

    /// Prefix the error's field path with `segment`
    ///
    /// Nested wrappers collapse into a single [`KafkaError::Field`] whose path
    /// reads outermost-first. Index segments (`[3]`) attach without a dot.
    pub fn in_field(self, segment: &str) -> Self {
        match self {
            KafkaError::Field { path, source } => {
                let path = if path.starts_with('[') {
                    format!("{segment}{path}")
                } else {
                    format!("{segment}.{path}")
                };
                KafkaError::Field { path, source }
            }
            other => KafkaError::Field {
                path: segment.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Annotate the error with the index of the failing collection element
    pub fn at_index(self, index: usize) -> Self {
        self.in_field(&format!("[{index}]"))
    }

    /// Nesting path of the failing field, if the failure happened inside a record
    pub fn path(&self) -> Option<&str> {
        match self {
            KafkaError::Field { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The underlying structural error, with any field-path wrapper removed
    pub fn root(&self) -> &KafkaError {
        match self {
            KafkaError::Field { source, .. } => source.root(),
            other => other,
        }
    }

    /// Convert this error to a Kafka protocol error code
    ///
    /// Lets a broker answer a malformed request with a meaningful code
    /// instead of a generic server error.
    pub fn to_kafka_error_code(&self) -> i16 {
        match self.root() {
            KafkaError::UnsupportedVersion { .. } => ERROR_UNSUPPORTED_VERSION,
            KafkaError::Truncated { .. }
            | KafkaError::InvalidLength { .. }
            | KafkaError::SchemaMismatch { .. }
            | KafkaError::DuplicateTag(_)
            | KafkaError::VarintOverflow { .. }
            | KafkaError::InvalidUtf8(_) => ERROR_CORRUPT_MESSAGE,
            KafkaError::NullValue
            | KafkaError::TypeMismatch { .. }
            | KafkaError::MissingField(_) => ERROR_INVALID_REQUEST,
            KafkaError::BufferOverflow { .. }
            | KafkaError::InvalidSchema(_)
            | KafkaError::InvalidConfig(_)
            | KafkaError::Field { .. } => ERROR_UNKNOWN_SERVER_ERROR,
        }
    }
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, KafkaError>;
