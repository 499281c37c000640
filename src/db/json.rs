//! BSON to wire JSON
//!
//! Stored documents serialise `ObjectId` and `DateTime` as extended JSON
//! (`{"$oid": ...}`, `{"$date": ...}`). API clients expect plain strings:
//! hex ids and RFC 3339 timestamps.

use bson::Bson;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::types::Result;

/// Serialise a stored record into the JSON shape sent to clients
pub fn to_api_json<T: Serialize>(value: &T) -> Result<Value> {
    Ok(bson_to_json(bson::to_bson(value)?))
}

/// Convert a BSON value into plain JSON
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| Value::Number(dt.timestamp_millis().into())),
        Bson::Document(doc) => Value::Object(
            doc.into_iter()
                .map(|(k, v)| (k, bson_to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::String(s) => Value::String(s),
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(n) => Value::Number(n.into()),
        Bson::Int64(n) => Value::Number(n.into()),
        Bson::Double(n) => Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
        Bson::Null | Bson::Undefined => Value::Null,
        other => other.into_relaxed_extjson(),
    }
}
