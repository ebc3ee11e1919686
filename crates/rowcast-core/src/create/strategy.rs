use crate::{
    create::{
        BoundField, BuildHook, CompiledCreator, CreatorEnv, PlanCompiler, RecordCreator,
        RecordShape, RecordType,
        dynamic::{DynamicCreator, DynamicRecord},
    },
    error::RowcastError,
    model::{AutoMap, BindingData, FieldLocator},
    row::ReaderRow,
    traits::FieldValue,
};
use std::marker::PhantomData;

///
/// CreationStrategy
///
/// One entry in the registry's priority stack. `can_create` must be a
/// real predicate: `create` is only called when it returned true.
///

pub trait CreationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_create(&self, record: &RecordType) -> bool;

    fn create(
        &self,
        record: &RecordType,
        env: &mut CreatorEnv<'_>,
    ) -> Result<CompiledCreator, RowcastError>;
}

///
/// PrimitiveStrategy
///
/// Scalar record types: one binding at index 0, no mapping descriptor.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct PrimitiveStrategy;

impl CreationStrategy for PrimitiveStrategy {
    fn name(&self) -> &'static str {
        "primitive"
    }

    fn can_create(&self, record: &RecordType) -> bool {
        matches!(
            (record.shape(), record.hook()),
            (RecordShape::Scalar(_), BuildHook::Scalar(_))
        )
    }

    fn create(
        &self,
        record: &RecordType,
        env: &mut CreatorEnv<'_>,
    ) -> Result<CompiledCreator, RowcastError> {
        let (RecordShape::Scalar(kind), BuildHook::Scalar(build)) = (record.shape(), record.hook())
        else {
            return Err(RowcastError::UnresolvedType {
                type_name: record.type_name(),
            });
        };

        let mut data = BindingData::new(record.type_name(), kind.clone());
        data.locator = FieldLocator::at(0);

        Ok(build(env.bind(&data)))
    }
}

pub(crate) fn compile_scalar<T: FieldValue + 'static>(field: BoundField) -> CompiledCreator {
    CompiledCreator::from_creator::<T, _>(PrimitiveCreator::<T> {
        field,
        _marker: PhantomData,
    })
}

struct PrimitiveCreator<T> {
    field: BoundField,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FieldValue> RecordCreator<T> for PrimitiveCreator<T> {
    fn create_record(&self, row: &dyn ReaderRow) -> Result<T, RowcastError> {
        let value = self.field.read(row)?;

        T::from_value(value).map_err(|found| RowcastError::ValueMismatch {
            member: self.field.name().to_string(),
            expected: T::kind(),
            found: found.kind_label(),
        })
    }
}

///
/// ObjectStrategy
///
/// Composite record types: fetch (or discover) the mapping descriptor and
/// compile a read plan from it.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectStrategy;

impl CreationStrategy for ObjectStrategy {
    fn name(&self) -> &'static str {
        "object"
    }

    fn can_create(&self, record: &RecordType) -> bool {
        matches!(
            (record.shape(), record.hook()),
            (RecordShape::Composite, BuildHook::Composite(_))
        )
    }

    fn create(
        &self,
        record: &RecordType,
        env: &mut CreatorEnv<'_>,
    ) -> Result<CompiledCreator, RowcastError> {
        match record.hook() {
            BuildHook::Composite(build) => build(env),
            _ => Err(RowcastError::UnresolvedType {
                type_name: record.type_name(),
            }),
        }
    }
}

pub(crate) fn compile_composite<T: AutoMap>(
    env: &mut CreatorEnv<'_>,
) -> Result<CompiledCreator, RowcastError> {
    let map = env.maps.get_or_discover::<T>();
    let plan = PlanCompiler::new(env).compile_reader(&map)?;

    Ok(CompiledCreator::from_creator::<T, _>(plan))
}

///
/// DynamicStrategy
///
/// `DynamicRecord`: header name → raw text, or `Field1..FieldN` without a
/// header.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DynamicStrategy;

impl CreationStrategy for DynamicStrategy {
    fn name(&self) -> &'static str {
        "dynamic"
    }

    fn can_create(&self, record: &RecordType) -> bool {
        matches!(record.shape(), RecordShape::Dynamic)
    }

    fn create(
        &self,
        _record: &RecordType,
        env: &mut CreatorEnv<'_>,
    ) -> Result<CompiledCreator, RowcastError> {
        Ok(CompiledCreator::from_creator::<DynamicRecord, _>(
            DynamicCreator::new(env.config.has_header_record),
        ))
    }
}
