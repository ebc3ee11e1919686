use crate::{model::FieldKind, value::Value};
use rowcast_primitives::ScalarKind;

///
/// FieldValue
///
/// Conversion boundary between typed record members and erased `Value`s.
///
/// `from_value` hands the value back unchanged on a kind mismatch so the
/// caller can report what was actually produced.
///

pub trait FieldValue: Sized {
    fn kind() -> FieldKind;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! field_value_impls {
    ( $( ($scalar:ident, $ty:ty) ),* $(,)? ) => {
        $(
            impl FieldValue for $ty {
                fn kind() -> FieldKind {
                    FieldKind::Scalar(ScalarKind::$scalar)
                }

                #[allow(clippy::clone_on_copy)]
                fn to_value(&self) -> Value {
                    Value::$scalar(self.clone())
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$scalar(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

scalar_value_registry!(field_value_impls);

impl<T: FieldValue> FieldValue for Option<T> {
    fn kind() -> FieldKind {
        FieldKind::optional(T::kind())
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        if value.is_null() {
            return Ok(None);
        }

        T::from_value(value).map(Some)
    }
}

impl<T: FieldValue> FieldValue for Box<T> {
    fn kind() -> FieldKind {
        T::kind()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        T::from_value(value).map(Self::new)
    }
}
