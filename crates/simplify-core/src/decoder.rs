//! JSON bytes → Value.
//!
//! Each JSON token is matched against the variants in a fixed order (map,
//! array, bool, int, double, string, null) and the first form that accepts it
//! wins. Every match is strict:
//!
//! - `true` is a `Bool`, never an `Int`
//! - `1` is an `Int`; `1.0` is a `Double`
//! - integers beyond `i64` fall through to `Double`
//! - `"1"` is a `String`, never a number
//!
//! # Key design decisions
//!
//! - **Path tracking**: decoding runs through a [`DeserializeSeed`] that pushes
//!   the current key or index before descending and pops it after a child
//!   succeeds. On failure nothing is popped, so the stack is left pointing at
//!   the offending node, which becomes the `path` of `InvalidData`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::error::{Result, SimplifyError};
use crate::path::{Path, PathSegment};
use crate::value::Value;

/// Decode a JSON document into a [`Value`].
///
/// # Errors
/// Returns [`SimplifyError::InvalidData`] carrying the path of the node that
/// could not be decoded.
///
/// ```
/// use simplify_core::{decode, Value};
///
/// let v = decode(br#"{"status":"good","count":1,"ratio":1.0}"#).unwrap();
/// assert_eq!(v["count"], Value::Int(1));
/// assert_eq!(v["ratio"], Value::Double(1.0));
/// ```
pub fn decode(bytes: &[u8]) -> Result<Value> {
    let path = RefCell::new(Path::root());
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let decoded = TrackedSeed { path: &path }
        .deserialize(&mut deserializer)
        .and_then(|value| deserializer.end().map(|()| value));
    decoded.map_err(|error| SimplifyError::InvalidData {
        path: path.into_inner(),
        message: error.to_string(),
    })
}

/// Decode a JSON string into a [`Value`].
pub fn decode_str(text: &str) -> Result<Value> {
    decode(text.as_bytes())
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let path = RefCell::new(Path::root());
        TrackedSeed { path: &path }.deserialize(deserializer)
    }
}

struct TrackedSeed<'p> {
    path: &'p RefCell<Path>,
}

impl<'de> DeserializeSeed<'de> for TrackedSeed<'_> {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Value, D::Error> {
        deserializer.deserialize_any(ValueVisitor { path: self.path })
    }
}

struct ValueVisitor<'p> {
    path: &'p RefCell<Path>,
}

impl ValueVisitor<'_> {
    fn descend(&self, segment: PathSegment) -> TrackedSeed<'_> {
        self.path.borrow_mut().push(segment);
        TrackedSeed { path: self.path }
    }

    fn ascend(&self) {
        self.path.borrow_mut().pop();
    }
}

impl<'de> Visitor<'de> for ValueVisitor<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map, array, bool, integer, double, string or null")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Value, A::Error> {
        let mut map = BTreeMap::new();
        while let Some(key) = access.next_key::<String>()? {
            let child = access.next_value_seed(self.descend(PathSegment::Key(key.clone())))?;
            self.ascend();
            map.insert(key, child);
        }
        Ok(Value::Map(map))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::new();
        loop {
            let next = access.next_element_seed(self.descend(PathSegment::Index(items.len())))?;
            self.ascend();
            match next {
                Some(child) => items.push(child),
                None => break,
            }
        }
        Ok(Value::Array(items))
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> std::result::Result<Value, E> {
        Ok(Value::Int(i))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> std::result::Result<Value, E> {
        Ok(i64::try_from(u).map_or(Value::Double(u as f64), Value::Int))
    }

    fn visit_f64<E: de::Error>(self, d: f64) -> std::result::Result<Value, E> {
        Ok(Value::Double(d))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> std::result::Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Value, D::Error> {
        TrackedSeed { path: self.path }.deserialize(deserializer)
    }
}
