use crate::{
    create::{
        CompiledCreator, CreationStrategy, CreatorEnv, DynamicStrategy, ErasedRecordCreator,
        ObjectStrategy, PrimitiveStrategy, Record, RecordCreator, RecordType,
    },
    error::RowcastError,
};
use std::{any::TypeId, collections::HashMap, fmt, sync::Arc};
use tracing::{debug, trace};

///
/// CreatorRegistry
///
/// Resolves record types to compiled creators.
///
/// Order: explicitly registered creator, then the first strategy whose
/// `can_create` accepts the type, then `UnresolvedType`. Compiled creators
/// are cached per type; a cache hit never recompiles.
///

pub struct CreatorRegistry {
    strategies: Vec<Box<dyn CreationStrategy>>,
    registered: HashMap<TypeId, CompiledCreator>,
    compiled: HashMap<TypeId, CompiledCreator>,
}

impl CreatorRegistry {
    /// Registry with the default stack: primitive, object, dynamic.
    #[must_use]
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(PrimitiveStrategy),
            Box::new(ObjectStrategy),
            Box::new(DynamicStrategy),
        ])
    }

    #[must_use]
    pub fn with_strategies(strategies: Vec<Box<dyn CreationStrategy>>) -> Self {
        Self {
            strategies,
            registered: HashMap::new(),
            compiled: HashMap::new(),
        }
    }

    /// Push a strategy onto the top of the stack, ahead of the defaults.
    pub fn push_strategy<S: CreationStrategy + 'static>(&mut self, strategy: S) {
        debug!(strategy = strategy.name(), "pushed creation strategy");
        self.strategies.insert(0, Box::new(strategy));
    }

    /// Strategy names in priority order.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Register a creator for `T`, overriding every strategy.
    pub fn register_creator<T, C>(&mut self, creator: C)
    where
        T: 'static,
        C: RecordCreator<T> + 'static,
    {
        let compiled = CompiledCreator::from_creator::<T, C>(creator);
        debug!(record = compiled.type_name(), "registered record creator");

        self.compiled.remove(&TypeId::of::<T>());
        self.registered.insert(TypeId::of::<T>(), compiled);
    }

    #[must_use]
    pub fn can_create(&self, record: &RecordType) -> bool {
        self.registered.contains_key(&record.type_id()) || self.resolve_strategy(record).is_some()
    }

    /// First strategy in the stack that accepts `record`.
    #[must_use]
    pub fn resolve_strategy(&self, record: &RecordType) -> Option<&dyn CreationStrategy> {
        self.strategies
            .iter()
            .find(|strategy| strategy.can_create(record))
            .map(Box::as_ref)
    }

    pub fn get_creator<T: Record>(
        &mut self,
        env: &mut CreatorEnv<'_>,
    ) -> Result<Arc<dyn RecordCreator<T>>, RowcastError> {
        let record = T::record_type();

        self.get_compiled(&record, env)?
            .typed::<T>()
            .ok_or(RowcastError::UnresolvedType {
                type_name: record.type_name(),
            })
    }

    pub fn get_erased_creator(
        &mut self,
        record: &RecordType,
        env: &mut CreatorEnv<'_>,
    ) -> Result<Arc<dyn ErasedRecordCreator>, RowcastError> {
        self.get_compiled(record, env).map(|compiled| compiled.erased())
    }

    #[must_use]
    pub fn is_compiled(&self, record: &RecordType) -> bool {
        self.compiled.contains_key(&record.type_id())
    }

    fn get_compiled(
        &mut self,
        record: &RecordType,
        env: &mut CreatorEnv<'_>,
    ) -> Result<CompiledCreator, RowcastError> {
        let key = record.type_id();

        if let Some(compiled) = self.registered.get(&key) {
            return Ok(compiled.clone());
        }
        if let Some(compiled) = self.compiled.get(&key) {
            trace!(record = record.type_name(), "creator cache hit");
            return Ok(compiled.clone());
        }

        let strategy = self
            .resolve_strategy(record)
            .ok_or(RowcastError::UnresolvedType {
                type_name: record.type_name(),
            })?;
        let strategy_name = strategy.name();
        let compiled = strategy.create(record, env)?;

        if compiled.type_id() != key {
            return Err(RowcastError::CreatorMismatch {
                strategy: strategy_name,
                type_name: record.type_name(),
            });
        }

        debug!(
            record = record.type_name(),
            strategy = strategy_name,
            shape = %record.shape(),
            "compiled record creator"
        );
        self.compiled.insert(key, compiled.clone());

        Ok(compiled)
    }
}

impl Default for CreatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CreatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatorRegistry")
            .field("strategies", &self.strategy_names())
            .field("registered", &self.registered.len())
            .field("compiled", &self.compiled.len())
            .finish()
    }
}
