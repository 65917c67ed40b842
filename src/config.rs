// Configuration module for kafka-wire
//
// The codec itself is stateless; the few knobs it has travel in a CodecConfig
// value owned by each Codec. The struct deserializes with serde so a host
// application can embed it in its own config file (TOML, JSON, ...), with every
// missing key falling back to the defaults in kafka::constants.

use serde::Deserialize;

use crate::kafka::constants::{
    DEFAULT_MAX_COLLECTION_LEN, DEFAULT_PRESERVE_UNKNOWN_TAGS, DEFAULT_VALIDATE_UTF8,
};
use crate::kafka::error::{KafkaError, Result};

/// Configuration struct holding all codec settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Retain unknown tagged fields on decode and re-emit them on encode
    pub preserve_unknown_tags: bool,
    /// Upper bound on a decoded array count (must be at least 1)
    pub max_collection_len: usize,
    /// Reject non-UTF-8 strings; when false they are decoded lossily
    pub validate_utf8: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            preserve_unknown_tags: DEFAULT_PRESERVE_UNKNOWN_TAGS,
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
            validate_utf8: DEFAULT_VALIDATE_UTF8,
        }
    }
}

impl CodecConfig {
    pub fn with_preserve_unknown_tags(mut self, preserve: bool) -> Self {
        self.preserve_unknown_tags = preserve;
        self
    }

    pub fn with_max_collection_len(mut self, max: usize) -> Self {
        self.max_collection_len = max;
        self
    }

    pub fn with_validate_utf8(mut self, validate: bool) -> Self {
        self.validate_utf8 = validate;
        self
    }

    /// Reject settings the codec cannot operate with
    pub fn validate(&self) -> Result<()> {
        if self.max_collection_len == 0 {
            return Err(KafkaError::InvalidConfig(
                "max_collection_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
