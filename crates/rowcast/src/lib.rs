//! ## Crate layout
//! - `core`: values, converters, mapping descriptors, compiled plans and
//!   the `RecordContext` that owns their caches.
//! - `primitives`: the scalar kind registry shared by every layer.
//!
//! The `prelude` covers mapping a record type and reading or writing it
//! through a context.

pub use rowcast_core as core;
pub use rowcast_primitives as primitives;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use rowcast_core::{
    Configuration, ConversionError, ErrorClass, RecordContext, RowcastError,
    convert::{ConversionOptions, Culture, NumberStyles, TypeConverter},
};

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        config::Configuration,
        context::RecordContext,
        create::{DynamicRecord, Record, RecordType},
        error::RowcastError,
        model::{AutoMap, FieldKind, RecordMap},
        row::{ReaderRow, StringRow, WriterRow},
        traits::FieldValue as _,
        value::Value,
    };
    pub use crate::primitives::ScalarKind;
}
