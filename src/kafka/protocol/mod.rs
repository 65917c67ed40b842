// Kafka wire codec
//
// This module handles the binary encoding shared by every Kafka request and
// response body. Message types are not hand-written here: each one is a
// MessageSchema (data), and a single engine walks the schema for the
// requested version.
//
// Module organization (leaves first):
// - primitives: fixed-width integers, bool, float64, uuid, varints
// - length: int16 / int32 / compact length prefixes and their null forms
// - strings: string and byte-array codecs
// - collections: array codec over an element closure
// - tagged: tagged-fields epilogue (count + tag/length/payload triples)
// - value: dynamic Value / Record model
// - schema: FieldSpec / RecordSpec / MessageSchema declarations
// - engine: version gating and recursion over a schema

pub mod collections;
pub mod engine;
pub mod length;
pub mod primitives;
pub mod schema;
pub mod strings;
pub mod tagged;
pub mod value;

// Re-export public types
pub use collections::{get_array, put_array, ArrayFormat};
pub use engine::{Codec, Decodable, Encodable};
pub use schema::{FieldKind, FieldSpec, MessageSchema, RecordSpec, VersionRange};
pub use tagged::TaggedField;
pub use value::{Record, Value};
