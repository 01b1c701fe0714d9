//! Key-value record codec.
//!
//! Records travel to and from the database as JSON objects. Encoding goes
//! through the stock Serde codec and must yield an object; decoding accepts
//! the object form back.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ModelError, ModelResult};

/// JSON object representation of a record.
pub type JsonMap = serde_json::Map<String, Value>;

/// A value object stored as a JSON object in the database.
pub trait Record: Serialize + DeserializeOwned {
    /// Encode into a key-value map.
    fn encode(&self) -> ModelResult<JsonMap> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(ModelError::serialization(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Decode from a key-value map.
    fn decode(map: JsonMap) -> ModelResult<Self> {
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Decode from an arbitrary JSON value, which must be an object.
    fn decode_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::Object(map) => Self::decode(map),
            other => Err(ModelError::serialization(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Short name of a JSON value's kind, for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
