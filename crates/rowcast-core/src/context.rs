use crate::{
    config::Configuration,
    convert::{ConversionOptionsCache, ConverterRegistry},
    create::{
        BoundField, CreatorEnv, CreatorRegistry, ErasedRecordCreator, PlanCompiler, Record,
        RecordCreator, RecordType, WritePlan,
    },
    error::RowcastError,
    model::{AutoMap, BindingData, FieldLocator, RecordMap, RecordMapRegistry},
    row::{ReaderRow, StringRow, WriterRow},
    traits::FieldValue,
    value::Value,
};
use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    sync::Arc,
};

///
/// RecordContext
///
/// Owns the configuration and every cache used to read and write records.
/// One context serves one reader or writer; caches fill lazily through
/// `&mut self`.
///

#[derive(Debug, Default)]
pub struct RecordContext {
    config: Configuration,
    converters: ConverterRegistry,
    options: ConversionOptionsCache,
    maps: RecordMapRegistry,
    creators: CreatorRegistry,
    writers: WriterCache,
}

#[derive(Default)]
struct WriterCache(HashMap<TypeId, Arc<dyn Any + Send + Sync>>);

impl std::fmt::Debug for WriterCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("WriterCache").field(&self.0.len()).finish()
    }
}

impl RecordContext {
    #[must_use]
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    ///
    /// STATE
    ///

    #[must_use]
    pub const fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub const fn converters_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.converters
    }

    pub const fn options_mut(&mut self) -> &mut ConversionOptionsCache {
        &mut self.options
    }

    #[must_use]
    pub const fn creators(&self) -> &CreatorRegistry {
        &self.creators
    }

    pub const fn creators_mut(&mut self) -> &mut CreatorRegistry {
        &mut self.creators
    }

    #[must_use]
    pub const fn record_maps(&self) -> &RecordMapRegistry {
        &self.maps
    }

    /// Register a mapping descriptor for `T`. Register before the first
    /// read or write of `T`; compiled plans are not rebuilt.
    pub fn register_record_map<T: 'static>(&mut self, map: RecordMap<T>) {
        self.maps.register(map);
    }

    pub fn register_creator<T, C>(&mut self, creator: C)
    where
        T: 'static,
        C: RecordCreator<T> + 'static,
    {
        self.creators.register_creator::<T, C>(creator);
    }

    fn split(&mut self) -> (&mut CreatorRegistry, CreatorEnv<'_>) {
        let Self {
            config,
            converters,
            options,
            maps,
            creators,
            ..
        } = self;

        (
            creators,
            CreatorEnv {
                config,
                converters,
                options,
                maps,
            },
        )
    }

    fn env(&mut self) -> CreatorEnv<'_> {
        self.split().1
    }

    ///
    /// READING
    ///

    #[must_use]
    pub fn can_create<T: Record>(&self) -> bool {
        self.creators.can_create(&T::record_type())
    }

    pub fn get_creator<T: Record>(&mut self) -> Result<Arc<dyn RecordCreator<T>>, RowcastError> {
        let (creators, mut env) = self.split();

        creators.get_creator::<T>(&mut env)
    }

    pub fn get_record<T: Record>(&mut self, row: &dyn ReaderRow) -> Result<T, RowcastError> {
        self.get_creator::<T>()?.create_record(row)
    }

    /// Read a record whose type is only known at runtime.
    pub fn get_record_erased(
        &mut self,
        row: &dyn ReaderRow,
        record: &RecordType,
    ) -> Result<Box<dyn Any>, RowcastError> {
        let creator: Arc<dyn ErasedRecordCreator> = {
            let (creators, mut env) = self.split();
            creators.get_erased_creator(record, &mut env)?
        };

        creator.create_boxed(row)
    }

    /// Read every row, stopping at the first failure.
    pub fn get_records<'r, T, R>(
        &mut self,
        rows: impl IntoIterator<Item = &'r R>,
    ) -> Result<Vec<T>, RowcastError>
    where
        T: Record,
        R: ReaderRow + 'r,
    {
        let creator = self.get_creator::<T>()?;

        rows.into_iter()
            .map(|row| creator.create_record(row))
            .collect()
    }

    ///
    /// AD-HOC FIELDS
    ///

    pub fn get_field<V: FieldValue>(
        &mut self,
        row: &dyn ReaderRow,
        index: usize,
    ) -> Result<V, RowcastError> {
        self.read_field(row, FieldLocator::at(index))
    }

    pub fn get_field_by_name<V: FieldValue>(
        &mut self,
        row: &dyn ReaderRow,
        name: &str,
    ) -> Result<V, RowcastError> {
        self.get_field_by_name_at(row, name, 0)
    }

    /// Read the `occurrence`-th field headed `name`.
    pub fn get_field_by_name_at<V: FieldValue>(
        &mut self,
        row: &dyn ReaderRow,
        name: &str,
        occurrence: usize,
    ) -> Result<V, RowcastError> {
        let mut locator = FieldLocator::named(name);
        locator.name_index = occurrence;

        self.read_field(row, locator)
    }

    pub fn convert_from_text<V: FieldValue>(&mut self, text: &str) -> Result<V, RowcastError> {
        self.read_field(&StringRow::new([text]), FieldLocator::at(0))
    }

    #[must_use]
    pub fn convert_to_text<V: FieldValue>(&mut self, value: &V) -> String {
        let field = self.bind_field::<V>(FieldLocator::default());

        field.converter().write(&value.to_value(), field.data())
    }

    fn read_field<V: FieldValue>(
        &mut self,
        row: &dyn ReaderRow,
        locator: FieldLocator,
    ) -> Result<V, RowcastError> {
        let field = self.bind_field::<V>(locator);

        from_field_value(&field, field.read(row)?)
    }

    fn bind_field<V: FieldValue>(&mut self, locator: FieldLocator) -> BoundField {
        let mut data = BindingData::new(type_name::<V>(), V::kind());
        data.locator = locator;

        self.env().bind(&data)
    }

    ///
    /// WRITING
    ///

    /// Fresh output row sized for the fast formatting path.
    #[must_use]
    pub fn writer_row(&self) -> WriterRow {
        WriterRow::with_capacity(self.config.format_buffer_capacity)
    }

    pub fn write_header<T: AutoMap>(&mut self, out: &mut WriterRow) -> Result<(), RowcastError> {
        self.write_plan::<T>()?.write_header(out);

        Ok(())
    }

    pub fn write_record<T: AutoMap>(
        &mut self,
        record: &T,
        out: &mut WriterRow,
    ) -> Result<(), RowcastError> {
        self.write_plan::<T>()?.write_record(record, out);

        Ok(())
    }

    pub fn write_field<V: FieldValue>(&mut self, value: &V, out: &mut WriterRow) {
        let field = self.bind_field::<V>(FieldLocator::default());

        field.write(&value.to_value(), out);
    }

    /// Compiled write plan for `T`, built once.
    pub fn write_plan<T: AutoMap>(&mut self) -> Result<Arc<WritePlan<T>>, RowcastError> {
        let key = TypeId::of::<T>();
        if let Some(plan) = self
            .writers
            .0
            .get(&key)
            .and_then(|plan| Arc::clone(plan).downcast::<WritePlan<T>>().ok())
        {
            return Ok(plan);
        }

        let plan = {
            let mut env = self.env();
            let map = env.maps.get_or_discover::<T>();
            Arc::new(PlanCompiler::new(&mut env).compile_writer(&map)?)
        };
        self.writers.0.insert(key, plan.clone());

        Ok(plan)
    }
}

fn from_field_value<V: FieldValue>(field: &BoundField, value: Value) -> Result<V, RowcastError> {
    V::from_value(value).map_err(|found| RowcastError::ValueMismatch {
        member: field.name().to_string(),
        expected: V::kind(),
        found: found.kind_label(),
    })
}
