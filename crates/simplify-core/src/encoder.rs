//! Value → JSON bytes.
//!
//! Encoding preserves the variant tag: `Int(1)` is written as `1`,
//! `Double(1.0)` as `1.0`, so the decoder reads back the same variant.
//! Non-finite doubles have no JSON form and fail to encode.

use serde::ser::{Error as _, Serialize, Serializer};

use crate::error::{Result, SimplifyError};
use crate::value::Value;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Double(d) if !d.is_finite() => Err(S::Error::custom(format!(
                "{d} is not a valid JSON number"
            ))),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Map(map) => serializer.collect_map(map),
        }
    }
}

/// Encode a value as compact JSON.
///
/// ```
/// use simplify_core::{encode, Value};
///
/// let v: Value = [("key", Value::from("sbpb_abc"))].into_iter().collect();
/// assert_eq!(encode(&v).unwrap(), br#"{"key":"sbpb_abc"}"#);
/// ```
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(SimplifyError::Serialization)
}

/// Encode a value as a compact JSON string.
pub fn encode_to_string(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(SimplifyError::Serialization)
}
