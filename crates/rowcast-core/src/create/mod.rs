mod compiler;
mod dynamic;
mod registry;
mod strategy;


pub use compiler::{BoundField, PlanCompiler, ReadPlan, WritePlan};
pub use dynamic::DynamicRecord;
pub use registry::CreatorRegistry;
pub use strategy::{CreationStrategy, DynamicStrategy, ObjectStrategy, PrimitiveStrategy};

use crate::{
    config::Configuration,
    convert::{ConversionOptions, ConversionOptionsCache, ConverterRegistry},
    error::RowcastError,
    model::{AutoMap, BindingData, FieldKind, RecordMapRegistry},
    row::ReaderRow,
    traits::FieldValue,
};
use derive_more::Display;
use std::{
    any::{Any, TypeId, type_name},
    fmt,
    sync::Arc,
};

///
/// RecordCreator
///
/// Materializes one record of type `T` from a row.
///

pub trait RecordCreator<T>: Send + Sync {
    fn create_record(&self, row: &dyn ReaderRow) -> Result<T, RowcastError>;
}

impl<T, F> RecordCreator<T> for F
where
    F: Fn(&dyn ReaderRow) -> Result<T, RowcastError> + Send + Sync,
{
    fn create_record(&self, row: &dyn ReaderRow) -> Result<T, RowcastError> {
        self(row)
    }
}

///
/// ErasedRecordCreator
///
/// Type-erased creator for callers that only hold a `RecordType`.
///

pub trait ErasedRecordCreator: Send + Sync {
    fn create_boxed(&self, row: &dyn ReaderRow) -> Result<Box<dyn Any>, RowcastError>;
}

struct Erased<T>(Arc<dyn RecordCreator<T>>);

impl<T: 'static> ErasedRecordCreator for Erased<T> {
    fn create_boxed(&self, row: &dyn ReaderRow) -> Result<Box<dyn Any>, RowcastError> {
        self.0
            .create_record(row)
            .map(|record| Box::new(record) as Box<dyn Any>)
    }
}

///
/// CompiledCreator
///
/// A typed creator and its erasure, built together and cached together.
///

#[derive(Clone)]
pub struct CompiledCreator {
    type_id: TypeId,
    type_name: &'static str,
    typed: Arc<dyn Any + Send + Sync>,
    erased: Arc<dyn ErasedRecordCreator>,
}

impl CompiledCreator {
    #[must_use]
    pub fn new<T: 'static>(creator: Arc<dyn RecordCreator<T>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            erased: Arc::new(Erased(creator.clone())),
            typed: Arc::new(creator),
        }
    }

    #[must_use]
    pub fn from_creator<T, C>(creator: C) -> Self
    where
        T: 'static,
        C: RecordCreator<T> + 'static,
    {
        Self::new::<T>(Arc::new(creator))
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn typed<T: 'static>(&self) -> Option<Arc<dyn RecordCreator<T>>> {
        self.typed
            .downcast_ref::<Arc<dyn RecordCreator<T>>>()
            .cloned()
    }

    #[must_use]
    pub fn erased(&self) -> Arc<dyn ErasedRecordCreator> {
        self.erased.clone()
    }
}

impl fmt::Debug for CompiledCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCreator")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

///
/// RecordShape
///
/// What a strategy looks at when deciding whether it can create a type.
///

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum RecordShape {
    /// Has a mapping descriptor.
    #[display("composite")]
    Composite,

    /// Name → text record without per-member conversion.
    #[display("dynamic")]
    Dynamic,

    /// Known only by identity; needs a registered creator or a user strategy.
    #[display("opaque")]
    Opaque,

    /// Single converted field.
    #[display("scalar {_0}")]
    Scalar(FieldKind),
}

pub(crate) type CompositeHook = fn(&mut CreatorEnv<'_>) -> Result<CompiledCreator, RowcastError>;
pub(crate) type ScalarHook = fn(BoundField) -> CompiledCreator;

#[derive(Clone, Copy)]
pub(crate) enum BuildHook {
    Composite(CompositeHook),
    Absent,
    Scalar(ScalarHook),
}

///
/// RecordType
///
/// Runtime description of a requested record type: identity, shape and
/// the monomorphized entry points the built-in strategies call.
///

#[derive(Clone)]
pub struct RecordType {
    type_id: TypeId,
    type_name: &'static str,
    shape: RecordShape,
    hook: BuildHook,
}

impl RecordType {
    #[must_use]
    pub fn of<T: Record>() -> Self {
        T::record_type()
    }

    /// A single converted value.
    #[must_use]
    pub fn scalar<T: FieldValue + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            shape: RecordShape::Scalar(T::kind()),
            hook: BuildHook::Scalar(strategy::compile_scalar::<T>),
        }
    }

    /// A record with a discoverable mapping descriptor.
    #[must_use]
    pub fn composite<T: AutoMap>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            shape: RecordShape::Composite,
            hook: BuildHook::Composite(strategy::compile_composite::<T>),
        }
    }

    /// A type no built-in strategy handles.
    #[must_use]
    pub fn opaque<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            shape: RecordShape::Opaque,
            hook: BuildHook::Absent,
        }
    }

    pub(crate) fn dynamic() -> Self {
        Self {
            type_id: TypeId::of::<DynamicRecord>(),
            type_name: type_name::<DynamicRecord>(),
            shape: RecordShape::Dynamic,
            hook: BuildHook::Absent,
        }
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub const fn shape(&self) -> &RecordShape {
        &self.shape
    }

    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub(crate) const fn hook(&self) -> BuildHook {
        self.hook
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("type_name", &self.type_name)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

///
/// Record
///
/// Types that can be requested from a `RecordContext`.
///

pub trait Record: Sized + 'static {
    fn record_type() -> RecordType;
}

macro_rules! scalar_record_impls {
    ( $( ($scalar:ident, $ty:ty) ),* $(,)? ) => {
        $(
            impl Record for $ty {
                fn record_type() -> RecordType {
                    RecordType::scalar::<Self>()
                }
            }
        )*
    };
}

scalar_value_registry!(scalar_record_impls);

impl<T: FieldValue + 'static> Record for Option<T> {
    fn record_type() -> RecordType {
        RecordType::scalar::<Self>()
    }
}

impl Record for DynamicRecord {
    fn record_type() -> RecordType {
        RecordType::dynamic()
    }
}

///
/// CreatorEnv
///
/// Borrowed view of a context's shared state, handed to strategies while
/// they compile.
///

pub struct CreatorEnv<'a> {
    pub config: &'a Configuration,
    pub converters: &'a mut ConverterRegistry,
    pub options: &'a ConversionOptionsCache,
    pub maps: &'a mut RecordMapRegistry,
}

impl CreatorEnv<'_> {
    /// Resolve the converter and merge options for one binding:
    /// configuration defaults, then per-kind options, then the binding's own.
    pub fn bind(&mut self, data: &BindingData) -> BoundField {
        let converter = data
            .converter
            .clone()
            .unwrap_or_else(|| self.converters.get_converter(&data.kind));
        let defaults = self.config.conversion_defaults();
        let options = ConversionOptions::merge(
            [Some(&defaults), self.options.get_options(&data.kind), Some(&data.options)]
                .into_iter()
                .flatten(),
        );

        let mut bound = data.clone();
        bound.options = options;
        bound.converter = Some(converter.clone());

        BoundField::new(bound, converter, self.config.ignore_missing_fields)
    }
}
