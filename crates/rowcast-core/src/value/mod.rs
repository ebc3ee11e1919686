#[cfg(test)]
mod tests;

use num_bigint::BigInt;
use rowcast_primitives::ScalarKind;
use rust_decimal::Decimal;
use std::{any::Any, fmt, sync::Arc};
use time::{Date, PrimitiveDateTime};
use ulid::Ulid;

///
/// Scalar Value Registry
///
/// Single source of truth pairing each `ScalarKind` with its Rust type.
/// The `Value` variant always carries the scalar kind's name.
///

macro_rules! scalar_value_registry {
    ($macro:ident) => {
        $macro! {
            (Bool, bool),
            (Char, char),
            (Date, ::time::Date),
            (DateTime, ::time::PrimitiveDateTime),
            (Decimal, ::rust_decimal::Decimal),
            (Float32, f32),
            (Float64, f64),
            (Int8, i8),
            (Int16, i16),
            (Int32, i32),
            (Int64, i64),
            (Int128, i128),
            (IntBig, ::num_bigint::BigInt),
            (Text, String),
            (Uint8, u8),
            (Uint16, u16),
            (Uint32, u32),
            (Uint64, u64),
            (Uint128, u128),
            (Ulid, ::ulid::Ulid),
        }
    };
}

///
/// Value
///
/// Erased field value exchanged between converters and record plans.
///
/// Null    → no value (an empty optional, or a recognized null token).
/// Opaque  → a value of a caller-defined kind produced by a custom converter.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Char(char),
    Date(Date),
    DateTime(PrimitiveDateTime),
    Decimal(Decimal),
    Float32(f32),
    Float64(f64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Int128(i128),
    IntBig(BigInt),
    Null,
    Opaque(OpaqueValue),
    Text(String),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Uint128(u128),
    Ulid(Ulid),
}

macro_rules! value_from_impls {
    ( $( ($scalar:ident, $ty:ty) ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$scalar(value)
                }
            }
        )*
    };
}

scalar_value_registry!(value_from_impls);

impl Value {
    /// Scalar kind carried by this value, if it is a built-in scalar.
    #[must_use]
    pub const fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Bool(_) => Some(ScalarKind::Bool),
            Self::Char(_) => Some(ScalarKind::Char),
            Self::Date(_) => Some(ScalarKind::Date),
            Self::DateTime(_) => Some(ScalarKind::DateTime),
            Self::Decimal(_) => Some(ScalarKind::Decimal),
            Self::Float32(_) => Some(ScalarKind::Float32),
            Self::Float64(_) => Some(ScalarKind::Float64),
            Self::Int8(_) => Some(ScalarKind::Int8),
            Self::Int16(_) => Some(ScalarKind::Int16),
            Self::Int32(_) => Some(ScalarKind::Int32),
            Self::Int64(_) => Some(ScalarKind::Int64),
            Self::Int128(_) => Some(ScalarKind::Int128),
            Self::IntBig(_) => Some(ScalarKind::IntBig),
            Self::Text(_) => Some(ScalarKind::Text),
            Self::Uint8(_) => Some(ScalarKind::Uint8),
            Self::Uint16(_) => Some(ScalarKind::Uint16),
            Self::Uint32(_) => Some(ScalarKind::Uint32),
            Self::Uint64(_) => Some(ScalarKind::Uint64),
            Self::Uint128(_) => Some(ScalarKind::Uint128),
            Self::Ulid(_) => Some(ScalarKind::Ulid),
            Self::Null | Self::Opaque(_) => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short label naming what this value holds, for diagnostics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Opaque(opaque) => opaque.type_name(),
            _ => match self.scalar_kind() {
                Some(kind) => kind.type_name(),
                None => "unknown",
            },
        }
    }

    /// Borrow the text payload, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

///
/// OpaqueValue
///
/// Shared handle to a value of a caller-defined kind.
/// Equality is identity: two handles are equal only if they share storage.
///

#[derive(Clone)]
pub struct OpaqueValue {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl OpaqueValue {
    pub fn new<T>(type_name: &'static str, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            type_name,
            inner: Arc::new(value),
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Take the inner value out, cloning only when the handle is shared.
    pub fn into_inner<T>(self) -> Result<T, Self>
    where
        T: Any + Clone + Send + Sync,
    {
        let type_name = self.type_name;
        match self.inner.downcast::<T>() {
            Ok(inner) => Ok(Arc::try_unwrap(inner).unwrap_or_else(|shared| (*shared).clone())),
            Err(inner) => Err(Self { type_name, inner }),
        }
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpaqueValue").field(&self.type_name).finish()
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && Arc::ptr_eq(&self.inner, &other.inner)
    }
}
