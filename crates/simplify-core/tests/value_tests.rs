use std::collections::{BTreeMap, HashMap};

use simplify_core::{Value, DEFAULT};

/// Helper: `{"card": {"number": "...", "expMonth": "12"}, "tags": ["a", "b"]}`.
fn sample() -> Value {
    let mut v = Value::new();
    v.set("card", Value::new());
    let mut card = v["card"].clone();
    card.set("number", "5555555555554444");
    card.set("expMonth", "12");
    v.set("card", card);
    v.set("tags", vec!["a", "b"]);
    v
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn new_is_null() {
    assert_eq!(Value::new(), Value::Null);
    assert_eq!(Value::default(), Value::Null);
    assert_eq!(DEFAULT, Value::Null);
}

#[test]
fn from_scalars() {
    assert_eq!(Value::from("x"), Value::String("x".into()));
    assert_eq!(Value::from(String::from("x")), Value::String("x".into()));
    assert_eq!(Value::from(7_i32), Value::Int(7));
    assert_eq!(Value::from(7_u8), Value::Int(7));
    assert_eq!(Value::from(1.5_f64), Value::Double(1.5));
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some(3_i64)), Value::Int(3));
}

#[test]
fn from_collections() {
    let mut hash = HashMap::new();
    hash.insert("a".to_string(), 1_i64);
    let mut tree = BTreeMap::new();
    tree.insert("a".to_string(), 1_i64);
    assert_eq!(Value::from(hash), Value::from(tree));

    assert_eq!(
        Value::from(vec![1_i64, 2]),
        Value::Array(vec![Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn from_serialize_supported_shapes() {
    #[derive(serde::Serialize)]
    struct Amount {
        amount: i64,
        currency: &'static str,
    }

    let v = Value::from_serialize(&Amount {
        amount: 1500,
        currency: "AUD",
    })
    .unwrap();
    assert_eq!(v["amount"], Value::Int(1500));
    assert_eq!(v["currency"], Value::from("AUD"));
}

#[test]
fn from_serialize_unsupported_shape_is_none() {
    let mut bad = BTreeMap::new();
    bad.insert((1, 2), "tuple keys");
    assert!(Value::from_serialize(&bad).is_none());
}

#[test]
fn from_native_json() {
    let json = serde_json::json!({"a": [1, 2.5, "x", true, null]});
    let v = Value::from(json);
    assert_eq!(
        v["a"],
        Value::Array(vec![
            Value::Int(1),
            Value::Double(2.5),
            Value::from("x"),
            Value::Bool(true),
            Value::Null,
        ])
    );
}

#[test]
fn from_native_json_huge_integer_is_double() {
    let v = Value::from(serde_json::json!(u64::MAX));
    assert_eq!(v, Value::Double(u64::MAX as f64));
}

// ============================================================================
// Reads
// ============================================================================

#[test]
fn get_existing_key() {
    let v = sample();
    assert_eq!(v["card"]["number"], Value::from("5555555555554444"));
    assert_eq!(v["tags"][1], Value::from("b"));
}

#[test]
fn get_missing_key_is_null() {
    let v = sample();
    assert!(v["card"]["cvc"].is_null());
    assert!(v["nope"]["deeper"]["still"].is_null());
}

#[test]
fn get_key_on_non_map_is_null() {
    assert!(Value::from("text")["key"].is_null());
    assert!(Value::Int(1)["key"].is_null());
    assert!(sample()["tags"]["key"].is_null());
}

#[test]
fn get_index_on_non_array_is_null() {
    assert!(sample()[0].is_null());
    assert!(Value::from("abc")[0].is_null());
}

#[test]
fn get_index_out_of_bounds_is_null() {
    assert!(sample()["tags"][2].is_null());
    assert!(sample()["tags"][usize::MAX].is_null());
}

#[test]
fn miss_returns_the_shared_default() {
    let v = sample();
    assert!(std::ptr::eq(v.get("missing"), &DEFAULT));
}

// ============================================================================
// Writes
// ============================================================================

#[test]
fn set_then_get() {
    let mut v = Value::new();
    v.set("key", "value");
    assert_eq!(v["key"], Value::from("value"));
}

#[test]
fn set_key_on_scalar_rewrites_as_map() {
    let mut v = Value::Int(4);
    v.set("a", 1_i64);
    assert_eq!(v, [("a", 1_i64)].into_iter().collect::<Value>());
}

#[test]
fn set_key_keeps_existing_entries() {
    let mut v = sample();
    v.set("extra", true);
    assert_eq!(v["card"]["expMonth"], Value::from("12"));
    assert_eq!(v["extra"], Value::Bool(true));
}

#[test]
fn set_index_in_bounds_replaces() {
    let mut v = Value::from(vec!["a", "b", "c"]);
    v.set(1, "B");
    assert_eq!(v, Value::from(vec!["a", "B", "c"]));
}

#[test]
fn set_index_one_past_end_appends() {
    let mut v = Value::from(vec!["a"]);
    v.set(1, "b");
    assert_eq!(v, Value::from(vec!["a", "b"]));
}

#[test]
fn set_index_far_out_of_bounds_appends() {
    let mut v = Value::from(vec!["a"]);
    v.set(10, "b");
    assert_eq!(v, Value::from(vec!["a", "b"]));
    assert!(v[10].is_null());
}

#[test]
fn set_null_in_bounds_removes_and_compacts() {
    let mut v = Value::from(vec!["a", "b", "c"]);
    v.set(1, Value::Null);
    assert_eq!(v, Value::from(vec!["a", "c"]));
}

#[test]
fn set_null_out_of_bounds_appends_null() {
    let mut v = Value::from(vec!["a"]);
    v.set(5, Value::Null);
    assert_eq!(v, Value::Array(vec![Value::from("a"), Value::Null]));
    assert!(v[1].is_null());

    v.set(1, Value::Null);
    assert_eq!(v, Value::from(vec!["a"]));
}

#[test]
fn set_index_on_non_array_rewrites_as_array() {
    let mut v = Value::from("scalar");
    v.set(3, "x");
    assert_eq!(v, Value::from(vec!["x"]));
}

#[test]
fn clone_is_deep() {
    let original = sample();
    let mut copy = original.clone();
    let mut card = copy["card"].clone();
    card.set("number", "4111111111111111");
    copy.set("card", card);
    assert_eq!(original["card"]["number"], Value::from("5555555555554444"));
    assert_ne!(original, copy);
}

// ============================================================================
// Coercions
// ============================================================================

#[test]
fn int_as_bool() {
    assert_eq!(Value::Int(1).bool_value(), Some(true));
    assert_eq!(Value::Int(0).bool_value(), Some(false));
    assert_eq!(Value::Int(2).bool_value(), None);
    assert_eq!(Value::Int(-1).bool_value(), None);
}

#[test]
fn double_as_bool() {
    assert_eq!(Value::Double(1.0).bool_value(), Some(true));
    assert_eq!(Value::Double(0.0).bool_value(), Some(false));
    assert_eq!(Value::Double(0.5).bool_value(), None);
}

#[test]
fn string_as_bool() {
    assert_eq!(Value::from("true").bool_value(), Some(true));
    assert_eq!(Value::from("false").bool_value(), Some(false));
    assert_eq!(Value::from("yes").bool_value(), None);
}

#[test]
fn bool_as_other_scalars() {
    assert_eq!(Value::Bool(true).string_value().as_deref(), Some("true"));
    assert_eq!(Value::Bool(false).string_value().as_deref(), Some("false"));
    assert_eq!(Value::Bool(true).int_value(), Some(1));
    assert_eq!(Value::Bool(false).double_value(), Some(0.0));
}

#[test]
fn string_as_number_is_strict() {
    assert_eq!(Value::from("42").int_value(), Some(42));
    assert_eq!(Value::from("4.5").double_value(), Some(4.5));
    assert_eq!(Value::from("42abc").int_value(), None);
    assert_eq!(Value::from("").int_value(), None);
    assert_eq!(Value::from("4.5").int_value(), None);
}

#[test]
fn numbers_as_string() {
    assert_eq!(Value::Int(-12).string_value().as_deref(), Some("-12"));
    assert_eq!(Value::Double(2.5).string_value().as_deref(), Some("2.5"));
    assert_eq!(Value::Double(1.0).string_value().as_deref(), Some("1.0"));
}

#[test]
fn double_as_int_only_when_exact() {
    assert_eq!(Value::Double(3.0).int_value(), Some(3));
    assert_eq!(Value::Double(3.5).int_value(), None);
    assert_eq!(Value::Double(f64::NAN).int_value(), None);
    assert_eq!(Value::Double(1e300).int_value(), None);
}

#[test]
fn containers_have_no_scalar_coercions() {
    for v in [Value::from(vec![1_i64]), sample(), Value::Null] {
        assert_eq!(v.string_value(), None);
        assert_eq!(v.int_value(), None);
        assert_eq!(v.double_value(), None);
        assert_eq!(v.bool_value(), None);
    }
}

#[test]
fn array_value_unwraps_children() {
    let v = Value::Array(vec![
        Value::Int(1),
        Value::from("x"),
        Value::from(vec![true]),
        Value::Null,
    ]);
    assert_eq!(
        v.array_value().unwrap(),
        vec![
            serde_json::json!(1),
            serde_json::json!("x"),
            serde_json::json!([true]),
        ]
    );
    assert!(Value::Int(1).array_value().is_none());
}

#[test]
fn map_value_unwraps_recursively() {
    let native = sample().map_value().unwrap();
    assert_eq!(
        serde_json::Value::Object(native),
        serde_json::json!({
            "card": {"number": "5555555555554444", "expMonth": "12"},
            "tags": ["a", "b"],
        })
    );
    assert!(Value::from("x").map_value().is_none());
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn map_equality_ignores_insertion_order() {
    let mut a = Value::new();
    a.set("x", 1_i64);
    a.set("y", 2_i64);
    let mut b = Value::new();
    b.set("y", 2_i64);
    b.set("x", 1_i64);
    assert_eq!(a, b);
}

#[test]
fn equality_respects_variant() {
    assert_ne!(Value::Int(1), Value::Double(1.0));
    assert_ne!(Value::Int(1), Value::Bool(true));
    assert_ne!(Value::from("1"), Value::Int(1));
    assert_ne!(Value::Null, Value::from(""));
}
