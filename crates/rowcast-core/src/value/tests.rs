use crate::{
    traits::FieldValue,
    value::{OpaqueValue, Value},
};
use num_bigint::BigInt;
use rowcast_primitives::{ALL_SCALAR_KINDS, ScalarKind};
use rust_decimal::Decimal;
use time::macros::{date, datetime};
use ulid::Ulid;

// ---- helpers -----------------------------------------------------------

fn samples() -> Vec<Value> {
    vec![
        Value::Bool(true),
        Value::Char('x'),
        Value::Date(date!(2024 - 01 - 02)),
        Value::DateTime(datetime!(2024-01-02 03:04:05)),
        Value::Decimal(Decimal::new(12_345, 2)),
        Value::Float32(1.25),
        Value::Float64(2.5),
        Value::Int8(-8),
        Value::Int16(-16),
        Value::Int32(-32),
        Value::Int64(-64),
        Value::Int128(-128),
        Value::IntBig(BigInt::from(99)),
        Value::Text("text".to_string()),
        Value::Uint8(8),
        Value::Uint16(16),
        Value::Uint32(32),
        Value::Uint64(64),
        Value::Uint128(128),
        Value::Ulid(Ulid::nil()),
    ]
}

// ---- kinds -------------------------------------------------------------

#[test]
fn every_scalar_kind_has_a_value_variant() {
    let kinds: Vec<ScalarKind> = samples()
        .iter()
        .map(|value| value.scalar_kind().expect("sample should be a scalar"))
        .collect();

    assert_eq!(kinds, ALL_SCALAR_KINDS.to_vec());
}

#[test]
fn kind_label_names_the_rust_type() {
    for value in samples() {
        let kind = value.scalar_kind().expect("sample should be a scalar");
        assert_eq!(value.kind_label(), kind.type_name());
    }

    assert_eq!(Value::Null.kind_label(), "null");
    assert_eq!(Value::Opaque(OpaqueValue::new("Point", (1, 2))).kind_label(), "Point");
}

#[test]
fn null_and_opaque_carry_no_scalar_kind() {
    assert_eq!(Value::Null.scalar_kind(), None);
    assert!(Value::Null.is_null());
    assert_eq!(Value::Opaque(OpaqueValue::new("Point", 0u8)).scalar_kind(), None);
}

// ---- conversions -------------------------------------------------------

#[test]
fn from_impls_pick_the_matching_variant() {
    assert_eq!(Value::from(7i32), Value::Int32(7));
    assert_eq!(Value::from(7u64), Value::Uint64(7));
    assert_eq!(Value::from("abc"), Value::Text("abc".to_string()));
    assert_eq!(Value::from(None::<i32>), Value::Null);
    assert_eq!(Value::from(Some(true)), Value::Bool(true));
}

#[test]
fn field_values_round_trip_through_value() {
    assert_eq!(i32::from_value(42i32.to_value()), Ok(42));
    assert_eq!(String::from_value("x".to_string().to_value()), Ok("x".to_string()));
    assert_eq!(Option::<u8>::from_value(Value::Null), Ok(None));
    assert_eq!(Option::<u8>::from_value(Value::Uint8(3)), Ok(Some(3)));
    assert_eq!(Box::<i64>::from_value(Value::Int64(5)).map(|v| *v), Ok(5));
}

#[test]
fn field_values_hand_back_mismatched_values() {
    assert_eq!(i32::from_value(Value::Int64(1)), Err(Value::Int64(1)));
    assert_eq!(Option::<i32>::from_value(Value::Text("1".into())), Err(Value::Text("1".into())));
    assert_eq!(bool::from_value(Value::Null), Err(Value::Null));
}

#[test]
fn optional_kind_wraps_inner_kind() {
    let kind = Option::<i32>::kind();

    assert!(kind.is_optional());
    assert_eq!(kind.scalar(), Some(ScalarKind::Int32));
    assert_eq!(kind.to_string(), "Option<i32>");
}

// ---- opaque ------------------------------------------------------------

#[test]
fn opaque_equality_is_identity() {
    let a = OpaqueValue::new("Point", (1, 2));
    let b = OpaqueValue::new("Point", (1, 2));

    assert_eq!(a, a.clone());
    assert_ne!(a, b);
}

#[test]
fn opaque_downcasts_and_unwraps() {
    let value = OpaqueValue::new("Point", (1i32, 2i32));
    assert_eq!(value.downcast_ref::<(i32, i32)>(), Some(&(1, 2)));
    assert_eq!(value.downcast_ref::<String>(), None);

    let shared = value.clone();
    assert_eq!(value.into_inner::<(i32, i32)>().ok(), Some((1, 2)));

    let rejected = shared.into_inner::<String>().expect_err("wrong type");
    assert_eq!(rejected.type_name(), "Point");
}
