// Reference schema instances
//
// ApiVersions (API key 18) request and response, versions 0..=3, flexible
// from v3. These are the messages every client sends first, so they double as
// the end-to-end exercise for the engine: plain and compact encodings, a
// version-gated field, an array of structs, and four tagged fields.
//
// The typed structs convert to and from Record and go through the same
// engine as any dynamic caller.

use std::collections::BTreeMap;

use bytes::{Buf, BufMut, Bytes};
use once_cell::sync::Lazy;

use super::constants::API_KEY_API_VERSIONS;
use super::error::{KafkaError, Result};
use super::protocol::{
    Decodable, Encodable, FieldKind, FieldSpec, MessageSchema, Record, RecordSpec, Value,
    VersionRange,
};

pub const API_VERSIONS_MIN_VERSION: i16 = 0;
pub const API_VERSIONS_MAX_VERSION: i16 = 3;
pub const API_VERSIONS_FLEXIBLE_FROM: i16 = 3;

const API_VERSIONS_RANGE: VersionRange =
    VersionRange::new(API_VERSIONS_MIN_VERSION, API_VERSIONS_MAX_VERSION);

/// ApiVersionsRequest: client software identification from v3
pub static API_VERSIONS_REQUEST: Lazy<MessageSchema> = Lazy::new(|| {
    let root = RecordSpec::new(
        "ApiVersionsRequest",
        vec![
            FieldSpec::new("client_software_name", FieldKind::String)
                .versions(VersionRange::since(3)),
            FieldSpec::new("client_software_version", FieldKind::String)
                .versions(VersionRange::since(3)),
        ],
    )
    .expect("ApiVersionsRequest schema is valid");
    MessageSchema::new(root, API_VERSIONS_RANGE, Some(API_VERSIONS_FLEXIBLE_FROM))
});

/// ApiVersionsResponse: supported API ranges plus feature tags from v3
pub static API_VERSIONS_RESPONSE: Lazy<MessageSchema> = Lazy::new(|| {
    let api_version = RecordSpec::new(
        "ApiVersion",
        vec![
            FieldSpec::new("api_key", FieldKind::Int16),
            FieldSpec::new("min_version", FieldKind::Int16),
            FieldSpec::new("max_version", FieldKind::Int16),
        ],
    )
    .expect("ApiVersion schema is valid");

    let supported_feature = RecordSpec::new(
        "SupportedFeatureKey",
        vec![
            FieldSpec::new("name", FieldKind::String),
            FieldSpec::new("min_version", FieldKind::Int16),
            FieldSpec::new("max_version", FieldKind::Int16),
        ],
    )
    .expect("SupportedFeatureKey schema is valid");

    let finalized_feature = RecordSpec::new(
        "FinalizedFeatureKey",
        vec![
            FieldSpec::new("name", FieldKind::String),
            FieldSpec::new("max_version_level", FieldKind::Int16),
            FieldSpec::new("min_version_level", FieldKind::Int16),
        ],
    )
    .expect("FinalizedFeatureKey schema is valid");

    let root = RecordSpec::new(
        "ApiVersionsResponse",
        vec![
            FieldSpec::new("error_code", FieldKind::Int16),
            FieldSpec::new("api_keys", FieldKind::array_of(FieldKind::Struct(api_version))),
            FieldSpec::new("throttle_time_ms", FieldKind::Int32).versions(VersionRange::since(1)),
            FieldSpec::new(
                "supported_features",
                FieldKind::array_of(FieldKind::Struct(supported_feature)),
            )
            .versions(VersionRange::since(3))
            .tagged(0),
            FieldSpec::new("finalized_features_epoch", FieldKind::Int64)
                .versions(VersionRange::since(3))
                .tagged(1)
                .default_value(-1i64),
            FieldSpec::new(
                "finalized_features",
                FieldKind::array_of(FieldKind::Struct(finalized_feature)),
            )
            .versions(VersionRange::since(3))
            .tagged(2),
            FieldSpec::new("zk_migration_ready", FieldKind::Bool)
                .versions(VersionRange::since(3))
                .tagged(3),
        ],
    )
    .expect("ApiVersionsResponse schema is valid");
    MessageSchema::new(root, API_VERSIONS_RANGE, Some(API_VERSIONS_FLEXIBLE_FROM))
});

// ===== Typed messages =====

/// ApiVersions request body (API key 18)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiVersionsRequest {
    pub client_software_name: String,
    pub client_software_version: String,
    pub unknown_tagged_fields: BTreeMap<u32, Bytes>,
}

/// One entry of the response's api_keys array
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApiVersion {
    pub api_key: i16,
    pub min_version: i16,
    pub max_version: i16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedFeatureKey {
    pub name: String,
    pub min_version: i16,
    pub max_version: i16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizedFeatureKey {
    pub name: String,
    pub max_version_level: i16,
    pub min_version_level: i16,
}

/// ApiVersions response body (API key 18)
#[derive(Debug, Clone, PartialEq)]
pub struct ApiVersionsResponse {
    pub error_code: i16,
    pub api_keys: Vec<ApiVersion>,
    pub throttle_time_ms: i32,
    pub supported_features: Vec<SupportedFeatureKey>,
    pub finalized_features_epoch: i64,
    pub finalized_features: Vec<FinalizedFeatureKey>,
    pub zk_migration_ready: bool,
    pub unknown_tagged_fields: BTreeMap<u32, Bytes>,
}

impl Default for ApiVersionsResponse {
    fn default() -> Self {
        Self {
            error_code: 0,
            api_keys: Vec::new(),
            throttle_time_ms: 0,
            supported_features: Vec::new(),
            finalized_features_epoch: -1,
            finalized_features: Vec::new(),
            zk_migration_ready: false,
            unknown_tagged_fields: BTreeMap::new(),
        }
    }
}

impl ApiVersionsResponse {
    /// The ApiVersions entry advertising this codec's own supported range
    pub fn self_entry() -> ApiVersion {
        ApiVersion {
            api_key: API_KEY_API_VERSIONS,
            min_version: API_VERSIONS_MIN_VERSION,
            max_version: API_VERSIONS_MAX_VERSION,
        }
    }
}

// ===== Record conversions =====

/// Convert every element of a struct array field
fn struct_array<T, F>(record: &Record, name: &str, convert: F) -> Result<Vec<T>>
where
    F: Fn(&Record) -> Result<T>,
{
    let items = record
        .get(name)
        .ok_or_else(|| KafkaError::MissingField(name.to_string()))?
        .as_array()
        .map_err(|e| e.in_field(name))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_record()
                .and_then(&convert)
                .map_err(|e| e.at_index(index).in_field(name))
        })
        .collect()
}

impl From<&ApiVersion> for Record {
    fn from(entry: &ApiVersion) -> Self {
        Record::new()
            .with("api_key", entry.api_key)
            .with("min_version", entry.min_version)
            .with("max_version", entry.max_version)
    }
}

impl TryFrom<&Record> for ApiVersion {
    type Error = KafkaError;

    fn try_from(record: &Record) -> Result<Self> {
        Ok(Self {
            api_key: record.get_as("api_key")?,
            min_version: record.get_as("min_version")?,
            max_version: record.get_as("max_version")?,
        })
    }
}

impl From<&SupportedFeatureKey> for Record {
    fn from(key: &SupportedFeatureKey) -> Self {
        Record::new()
            .with("name", key.name.as_str())
            .with("min_version", key.min_version)
            .with("max_version", key.max_version)
    }
}

impl TryFrom<&Record> for SupportedFeatureKey {
    type Error = KafkaError;

    fn try_from(record: &Record) -> Result<Self> {
        Ok(Self {
            name: record.get_as("name")?,
            min_version: record.get_as("min_version")?,
            max_version: record.get_as("max_version")?,
        })
    }
}

impl From<&FinalizedFeatureKey> for Record {
    fn from(key: &FinalizedFeatureKey) -> Self {
        Record::new()
            .with("name", key.name.as_str())
            .with("max_version_level", key.max_version_level)
            .with("min_version_level", key.min_version_level)
    }
}

impl TryFrom<&Record> for FinalizedFeatureKey {
    type Error = KafkaError;

    fn try_from(record: &Record) -> Result<Self> {
        Ok(Self {
            name: record.get_as("name")?,
            max_version_level: record.get_as("max_version_level")?,
            min_version_level: record.get_as("min_version_level")?,
        })
    }
}

fn records<'a, T>(items: &'a [T]) -> Vec<Value>
where
    Record: From<&'a T>,
{
    items.iter().map(|item| Value::from(Record::from(item))).collect()
}

impl From<&ApiVersionsRequest> for Record {
    fn from(request: &ApiVersionsRequest) -> Self {
        let mut record = Record::new()
            .with("client_software_name", request.client_software_name.as_str())
            .with("client_software_version", request.client_software_version.as_str());
        record.unknown_tagged_fields = request.unknown_tagged_fields.clone();
        record
    }
}

impl TryFrom<&Record> for ApiVersionsRequest {
    type Error = KafkaError;

    fn try_from(record: &Record) -> Result<Self> {
        Ok(Self {
            client_software_name: record.get_as("client_software_name")?,
            client_software_version: record.get_as("client_software_version")?,
            unknown_tagged_fields: record.unknown_tagged_fields.clone(),
        })
    }
}

impl From<&ApiVersionsResponse> for Record {
    fn from(response: &ApiVersionsResponse) -> Self {
        let mut record = Record::new()
            .with("error_code", response.error_code)
            .with("api_keys", records(&response.api_keys))
            .with("throttle_time_ms", response.throttle_time_ms)
            .with("supported_features", records(&response.supported_features))
            .with("finalized_features_epoch", response.finalized_features_epoch)
            .with("finalized_features", records(&response.finalized_features))
            .with("zk_migration_ready", response.zk_migration_ready);
        record.unknown_tagged_fields = response.unknown_tagged_fields.clone();
        record
    }
}

impl TryFrom<&Record> for ApiVersionsResponse {
    type Error = KafkaError;

    fn try_from(record: &Record) -> Result<Self> {
        Ok(Self {
            error_code: record.get_as("error_code")?,
            api_keys: struct_array(record, "api_keys", |r| ApiVersion::try_from(r))?,
            throttle_time_ms: record.get_as("throttle_time_ms")?,
            supported_features: struct_array(
                record,
                "supported_features",
                |r| SupportedFeatureKey::try_from(r),
            )?,
            finalized_features_epoch: record.get_as("finalized_features_epoch")?,
            finalized_features: struct_array(
                record,
                "finalized_features",
                |r| FinalizedFeatureKey::try_from(r),
            )?,
            zk_migration_ready: record.get_as("zk_migration_ready")?,
            unknown_tagged_fields: record.unknown_tagged_fields.clone(),
        })
    }
}

// ===== Wire entry points =====

impl Encodable for ApiVersionsRequest {
    fn encode<B: BufMut>(&self, buf: &mut B, version: i16) -> Result<()> {
        API_VERSIONS_REQUEST.encode(&Record::from(self), buf, version)
    }
}

impl Decodable for ApiVersionsRequest {
    fn decode<B: Buf>(buf: &mut B, version: i16) -> Result<Self> {
        let record = API_VERSIONS_REQUEST.decode(buf, version)?;
        Self::try_from(&record)
    }
}

impl Encodable for ApiVersionsResponse {
    fn encode<B: BufMut>(&self, buf: &mut B, version: i16) -> Result<()> {
        API_VERSIONS_RESPONSE.encode(&Record::from(self), buf, version)
    }
}

impl Decodable for ApiVersionsResponse {
    fn decode<B: Buf>(buf: &mut B, version: i16) -> Result<Self> {
        let record = API_VERSIONS_RESPONSE.decode(buf, version)?;
        Self::try_from(&record)
    }
}
