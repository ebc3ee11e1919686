use crate::value::Value;
use rowcast_primitives::ScalarKind;
use std::fmt;

///
/// FieldKind
///
/// Declared kind of a mapped member, parameter or ad-hoc field.
/// Converters are resolved and cached per kind.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum FieldKind {
    /// Caller-defined kind; values travel as `Value::Opaque` with this name.
    Custom(&'static str),

    /// Optional wrapper; accepts `Value::Null` in addition to the inner kind.
    Optional(Box<Self>),

    Scalar(ScalarKind),
}

impl FieldKind {
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Scalar kind at the core of this kind, looking through optionals.
    #[must_use]
    pub fn scalar(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) => Some(*kind),
            Self::Optional(inner) => inner.scalar(),
            Self::Custom(_) => None,
        }
    }

    /// Return whether `value` is a legal value of this kind.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Scalar(kind) => value.scalar_kind() == Some(*kind),
            Self::Optional(inner) => value.is_null() || inner.accepts(value),
            Self::Custom(name) => {
                matches!(value, Value::Opaque(opaque) if opaque.type_name() == *name)
            }
        }
    }
}

impl From<ScalarKind> for FieldKind {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(name) => f.write_str(name),
            Self::Optional(inner) => write!(f, "Option<{inner}>"),
            Self::Scalar(kind) => f.write_str(kind.type_name()),
        }
    }
}
