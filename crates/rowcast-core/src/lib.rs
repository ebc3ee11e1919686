//! Core runtime for rowcast: field values, converters, mapping descriptors,
//! compiled record plans and the context that ties them together.
#![warn(unreachable_pub)]

#[macro_use]
pub mod value;

pub mod config;
pub mod context;
pub mod convert;
pub mod create;
pub mod error;
pub mod model;
pub mod row;
pub mod traits;

pub use config::Configuration;
pub use context::RecordContext;
pub use error::{ConversionError, ErrorClass, RowcastError};

///
/// Prelude
///
/// Types a caller needs to map a record and read it back.
/// Converters and registries stay behind their modules.
///

pub mod prelude {
    pub use crate::{
        config::Configuration,
        context::RecordContext,
        create::{DynamicRecord, Record, RecordType},
        model::{AutoMap, RecordMap},
        row::{ReaderRow, StringRow, WriterRow},
        traits::FieldValue,
        value::Value,
    };
}
