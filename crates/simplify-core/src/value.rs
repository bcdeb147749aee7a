//! The `Value` tree, the payload currency of the SDK.
//!
//! Card data handed in by callers, the request payload, decoded responses and
//! 3-D Secure results are all `Value`s. The model is a plain recursive enum with
//! owned children: cloning a `Value` deep-copies it, and no two trees ever
//! share a node.
//!
//! # Key design decisions
//!
//! - **Reads never fail**: [`Value::get`] on a missing key, a non-map, a
//!   non-array or an out-of-bounds index returns a reference to [`DEFAULT`]
//!   (`Null`), so long paths can be walked without unwrapping at every step.
//! - **Writes create structure**: [`Value::set`] rewrites the receiver into a map
//!   or array as needed. Array writes are non-sparse: an out-of-bounds index
//!   appends, and writing `Null` at a valid index removes that element.
//! - **Maps are `BTreeMap`s**: equality ignores insertion order and encoding is
//!   deterministic.

use std::collections::{BTreeMap, HashMap};
use std::ops::Index;

use serde::Serialize;

/// The value returned whenever a lookup misses.
pub static DEFAULT: Value = Value::Null;

/// A recursive tagged value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// A new `Null` value.
    pub fn new() -> Self {
        Value::Null
    }

    /// Convert any serializable native value into a `Value`.
    ///
    /// Returns `None` for shapes the model cannot hold, such as maps with
    /// non-string keys. This never produces an error.
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use simplify_core::Value;
    ///
    /// let v = Value::from_serialize(&vec![1, 2, 3]).unwrap();
    /// assert_eq!(v, Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
    ///
    /// let mut bad = BTreeMap::new();
    /// bad.insert(vec![1u8], "key is not a string");
    /// assert!(Value::from_serialize(&bad).is_none());
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(native: &T) -> Option<Value> {
        serde_json::to_value(native).ok().map(Value::from)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// The string slice, without coercion.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Path access
    // ------------------------------------------------------------------------

    /// Look up a key (`&str`/`String`) or an index (`usize`).
    ///
    /// Never fails: any mismatch yields [`DEFAULT`].
    ///
    /// ```
    /// use simplify_core::Value;
    ///
    /// let mut v = Value::new();
    /// v.set("card", Value::new());
    /// assert!(v.get("card").get("number").get(3).is_null());
    /// ```
    pub fn get<S: Segment>(&self, segment: S) -> &Value {
        segment.lookup(self).unwrap_or(&DEFAULT)
    }

    /// Store `value` under a key or at an index, reshaping `self` if necessary.
    pub fn set<S: Segment>(&mut self, segment: S, value: impl Into<Value>) {
        segment.store(self, value.into());
    }

    pub(crate) fn set_key(&mut self, key: String, value: Value) {
        if !self.is_map() {
            *self = Value::Map(BTreeMap::new());
        }
        if let Value::Map(map) = self {
            map.insert(key, value);
        }
    }

    pub(crate) fn set_index(&mut self, index: usize, value: Value) {
        if !self.is_array() {
            *self = Value::Array(Vec::new());
        }
        let Value::Array(items) = self else {
            return;
        };
        if index < items.len() {
            if value.is_null() {
                items.remove(index);
            } else {
                items[index] = value;
            }
        } else {
            // Out of range never pads: the value goes to the end, Null included.
            items.push(value);
        }
    }

    // ------------------------------------------------------------------------
    // Coercions
    // ------------------------------------------------------------------------

    /// The value rendered as a string. Containers and `Null` yield `None`.
    pub fn string_value(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Double(d) => Some(format_double(*d)),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Map(_) => None,
        }
    }

    /// The value as an integer. Doubles convert only when exactly integral.
    pub fn int_value(&self) -> Option<i64> {
        match self {
            Value::String(s) => s.parse().ok(),
            Value::Int(i) => Some(*i),
            Value::Double(d) => exact_int(*d),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Null | Value::Array(_) | Value::Map(_) => None,
        }
    }

    pub fn double_value(&self) -> Option<f64> {
        match self {
            Value::String(s) => s.parse().ok(),
            Value::Int(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Null | Value::Array(_) | Value::Map(_) => None,
        }
    }

    /// The value as a boolean. Only `0`/`1` (and `0.0`/`1.0`) map to bools;
    /// strings must be exactly `"true"` or `"false"`.
    pub fn bool_value(&self) -> Option<bool> {
        match self {
            Value::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            Value::Double(d) if *d == 0.0 => Some(false),
            Value::Double(d) if *d == 1.0 => Some(true),
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Children unwrapped to native JSON values. `None` unless this is an array.
    ///
    /// `Null` children (and non-finite doubles) have no native form and are
    /// dropped.
    pub fn array_value(&self) -> Option<Vec<serde_json::Value>> {
        match self {
            Value::Array(items) => Some(items.iter().filter_map(Value::to_native).collect()),
            _ => None,
        }
    }

    /// Entries unwrapped to native JSON values. `None` unless this is a map.
    pub fn map_value(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        match self {
            Value::Map(map) => Some(
                map.iter()
                    .filter_map(|(k, v)| v.to_native().map(|n| (k.clone(), n)))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// The whole tree as a native JSON value; `None` for `Null`.
    pub fn to_native(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => None,
            Value::String(s) => Some(serde_json::Value::String(s.clone())),
            Value::Int(i) => Some(serde_json::Value::from(*i)),
            Value::Double(d) => serde_json::Number::from_f64(*d).map(serde_json::Value::Number),
            Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Value::Array(_) => self.array_value().map(serde_json::Value::Array),
            Value::Map(_) => self.map_value().map(serde_json::Value::Object),
        }
    }
}

/// `{:?}` keeps the fractional part (`1.0`, not `1`), matching what the API
/// sends for doubles.
fn format_double(d: f64) -> String {
    format!("{d:?}")
}

fn exact_int(d: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    if d.fract() == 0.0 && (-LIMIT..LIMIT).contains(&d) {
        Some(d as i64)
    } else {
        None
    }
}

// ============================================================================
// Segments
// ============================================================================

/// Something that can address a child of a [`Value`]: a map key or an array index.
pub trait Segment {
    #[doc(hidden)]
    fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value>;
    #[doc(hidden)]
    fn store(&self, value: &mut Value, new: Value);
}

impl Segment for usize {
    fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        value.as_array().and_then(|items| items.get(*self))
    }

    fn store(&self, value: &mut Value, new: Value) {
        value.set_index(*self, new);
    }
}

impl Segment for str {
    fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        value.as_map().and_then(|map| map.get(self))
    }

    fn store(&self, value: &mut Value, new: Value) {
        value.set_key(self.to_string(), new);
    }
}

impl Segment for String {
    fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        self.as_str().lookup(value)
    }

    fn store(&self, value: &mut Value, new: Value) {
        value.set_key(self.clone(), new);
    }
}

impl<T: Segment + ?Sized> Segment for &T {
    fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        (**self).lookup(value)
    }

    fn store(&self, value: &mut Value, new: Value) {
        (**self).store(value, new);
    }
}

impl<S: Segment> Index<S> for Value {
    type Output = Value;

    fn index(&self, segment: S) -> &Value {
        self.get(segment)
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<f32> for Value {
    fn from(d: f32) -> Self {
        Value::Double(f64::from(d))
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Value::Int(i64::from(i))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(map: HashMap<String, T>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Native JSON converts losslessly, except integers above `i64::MAX`, which
/// become doubles.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Double),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}
