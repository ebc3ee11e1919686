#[macro_use]
mod macros;

use std::fmt;

///
/// ScalarKind
///
/// Canonical scalar kind shared by values, bindings and converters.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ScalarKind {
    Bool,
    Char,
    Date,
    DateTime,
    Decimal,
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    IntBig,
    Text,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uint128,
    Ulid,
}

impl ScalarKind {
    /// Return the full metadata descriptor for one scalar kind.
    #[must_use]
    pub const fn metadata(self) -> ScalarMetadata {
        scalar_kind_registry!(metadata_from_registry, self)
    }

    /// Return the conversion family for this scalar kind.
    #[must_use]
    pub const fn family(self) -> ScalarFamily {
        self.metadata().family
    }

    /// Rust type name used in diagnostics.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        self.metadata().type_name
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

///
/// ScalarMetadata
///
/// Capability metadata shared across the conversion layers.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScalarMetadata {
    pub family: ScalarFamily,
    pub type_name: &'static str,
}

///
/// ScalarFamily
///
/// Coarse routing family used to pick a converter implementation.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScalarFamily {
    Bool,
    Decimal,
    Float,
    Identifier,
    Integer,
    Temporal,
    Text,
}

/// Ordered list of all scalar kinds in registry order.
pub const ALL_SCALAR_KINDS: [ScalarKind; 20] = scalar_kind_registry!(all_kinds_from_registry);
