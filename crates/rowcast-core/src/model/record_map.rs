use crate::{
    error::RowcastError,
    model::{BindingData, FieldKind, FieldLocator},
    traits::FieldValue,
    value::Value,
};
use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};
use tracing::debug;

pub(crate) type Setter<T> = Arc<dyn Fn(&mut T, Value) -> Result<(), Value> + Send + Sync>;
pub(crate) type Getter<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;
pub(crate) type Constructor<T> =
    Arc<dyn for<'a> Fn(&mut Arguments<'a>) -> Result<T, RowcastError> + Send + Sync>;
pub(crate) type Factory<T> = Arc<dyn Fn() -> T + Send + Sync>;

///
/// MemberBinding
///
/// Binding for one assignable member. A member without a setter is only
/// written; one without a getter is only read.
///

pub struct MemberBinding<T> {
    pub data: BindingData,
    setter: Option<Setter<T>>,
    getter: Option<Getter<T>>,
}

impl<T> MemberBinding<T> {
    pub(crate) const fn setter(&self) -> Option<&Setter<T>> {
        self.setter.as_ref()
    }

    pub(crate) const fn getter(&self) -> Option<&Getter<T>> {
        self.getter.as_ref()
    }

    #[must_use]
    pub const fn is_readable(&self) -> bool {
        self.setter.is_some()
    }

    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.getter.is_some()
    }
}

impl<T> fmt::Debug for MemberBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberBinding")
            .field("data", &self.data)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}

///
/// ParameterBinding
///

#[derive(Clone, Debug)]
pub struct ParameterBinding {
    pub data: BindingData,
}

///
/// RecordMap
///
/// Mapping descriptor for one record type: ordered parameter bindings plus
/// a constructor, or ordered member bindings plus a factory. Any parameter
/// binding selects constructor creation.
///
/// Bindings get sequential indices as they are added; header names
/// default to the binding name.
///

pub struct RecordMap<T> {
    type_name: &'static str,
    parameters: Vec<ParameterBinding>,
    members: Vec<MemberBinding<T>>,
    constructor: Option<Constructor<T>>,
    factory: Option<Factory<T>>,
}

impl<T: 'static> RecordMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            type_name: type_name::<T>(),
            parameters: Vec::new(),
            members: Vec::new(),
            constructor: None,
            factory: None,
        }
    }

    ///
    /// BUILDING
    ///

    /// Map a member that is both read into and written from.
    pub fn member<V, G, S>(&mut self, name: &str, get: G, set: S) -> &mut BindingData
    where
        V: FieldValue + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let getter: Getter<T> = Arc::new(move |record: &T| get(record).to_value());
        let setter: Setter<T> = Arc::new(move |record: &mut T, value: Value| {
            set(record, V::from_value(value)?);
            Ok(())
        });

        self.push_member(name, V::kind(), Some(setter), Some(getter))
    }

    /// Map a member that is only written, such as a computed column.
    pub fn read_only_member<V, G>(&mut self, name: &str, get: G) -> &mut BindingData
    where
        V: FieldValue + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        let getter: Getter<T> = Arc::new(move |record: &T| get(record).to_value());

        self.push_member(name, V::kind(), None, Some(getter))
    }

    /// Map a constructor parameter. Parameters are passed to the
    /// constructor in the order they are added.
    pub fn parameter<V: FieldValue>(&mut self, name: &str) -> &mut BindingData {
        let position = self.parameters.len();
        self.parameters.push(ParameterBinding {
            data: Self::binding(name, V::kind(), position),
        });

        &mut self.parameters[position].data
    }

    pub fn constructor<F>(&mut self, construct: F) -> &mut Self
    where
        F: Fn(&mut Arguments<'_>) -> Result<T, RowcastError> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(construct));
        self
    }

    pub fn factory<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    pub fn default_factory(&mut self) -> &mut Self
    where
        T: Default,
    {
        self.factory(T::default)
    }

    fn push_member(
        &mut self,
        name: &str,
        kind: FieldKind,
        setter: Option<Setter<T>>,
        getter: Option<Getter<T>>,
    ) -> &mut BindingData {
        let position = self.members.len();
        self.members.push(MemberBinding {
            data: Self::binding(name, kind, position),
            setter,
            getter,
        });

        &mut self.members[position].data
    }

    fn binding(name: &str, kind: FieldKind, position: usize) -> BindingData {
        let mut data = BindingData::new(name, kind);
        data.locator = FieldLocator {
            index: Some(position),
            names: vec![name.to_string()],
            name_index: 0,
        };

        data
    }

    ///
    /// ACCESS
    ///

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn parameters(&self) -> &[ParameterBinding] {
        &self.parameters
    }

    #[must_use]
    pub fn members(&self) -> &[MemberBinding<T>] {
        &self.members
    }

    /// Reconfigure a member or parameter of an already built map.
    pub fn binding_mut(&mut self, name: &str) -> Option<&mut BindingData> {
        self.parameters
            .iter_mut()
            .map(|p| &mut p.data)
            .chain(self.members.iter_mut().map(|m| &mut m.data))
            .find(|data| data.name == name)
    }

    pub(crate) const fn constructor_fn(&self) -> Option<&Constructor<T>> {
        self.constructor.as_ref()
    }

    pub(crate) const fn factory_fn(&self) -> Option<&Factory<T>> {
        self.factory.as_ref()
    }
}

impl<T: 'static> Default for RecordMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RecordMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordMap")
            .field("type_name", &self.type_name)
            .field("parameters", &self.parameters)
            .field("members", &self.members)
            .field("constructor", &self.constructor.is_some())
            .field("factory", &self.factory.is_some())
            .finish()
    }
}

///
/// Arguments
///
/// Cursor over converted parameter values, handed to a constructor.
///

pub struct Arguments<'a> {
    type_name: &'static str,
    expected: usize,
    values: std::vec::IntoIter<(&'a str, Value)>,
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(type_name: &'static str, values: Vec<(&'a str, Value)>) -> Self {
        Self {
            type_name,
            expected: values.len(),
            values: values.into_iter(),
        }
    }

    /// Take the next argument as `V`.
    pub fn take<V: FieldValue>(&mut self) -> Result<V, RowcastError> {
        let (name, value) = self.next_argument()?;

        V::from_value(value).map_err(|found| RowcastError::ValueMismatch {
            member: name.to_string(),
            expected: V::kind(),
            found: found.kind_label(),
        })
    }

    /// Take the next argument without typing it.
    pub fn take_value(&mut self) -> Result<Value, RowcastError> {
        self.next_argument().map(|(_, value)| value)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Fail unless every argument was consumed.
    pub(crate) fn finish(&self) -> Result<(), RowcastError> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(self.arity_error())
        }
    }

    fn next_argument(&mut self) -> Result<(&'a str, Value), RowcastError> {
        self.values.next().ok_or_else(|| self.arity_error())
    }

    const fn arity_error(&self) -> RowcastError {
        RowcastError::ConstructorArity {
            type_name: self.type_name,
            parameters: self.expected,
        }
    }
}

///
/// AutoMap
///
/// Record types describe their own mapping. Typically implemented by a
/// derive; the registry calls it at most once per type.
///

pub trait AutoMap: Sized + 'static {
    fn record_map() -> RecordMap<Self>;
}

///
/// RecordMapRegistry
///
/// Mapping descriptors cached per record type.
///

#[derive(Default)]
pub struct RecordMapRegistry {
    maps: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl RecordMapRegistry {
    /// Create an empty record map registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `map` for `T`, replacing any cached or discovered map.
    pub fn register<T: 'static>(&mut self, map: RecordMap<T>) {
        debug!(record = map.type_name(), "registered record map");
        self.maps.insert(TypeId::of::<T>(), Arc::new(map));
    }

    #[must_use]
    pub fn get<T: 'static>(&self) -> Option<Arc<RecordMap<T>>> {
        self.maps
            .get(&TypeId::of::<T>())
            .and_then(|map| Arc::clone(map).downcast::<RecordMap<T>>().ok())
    }

    /// Return the cached map for `T`, discovering it on first request.
    pub fn get_or_discover<T: AutoMap>(&mut self) -> Arc<RecordMap<T>> {
        if let Some(map) = self.get::<T>() {
            return map;
        }

        let map = Arc::new(T::record_map());
        debug!(
            record = map.type_name(),
            parameters = map.parameters().len(),
            members = map.members().len(),
            "discovered record map"
        );
        self.maps.insert(TypeId::of::<T>(), map.clone());

        map
    }

    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.maps.contains_key(&TypeId::of::<T>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

impl fmt::Debug for RecordMapRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordMapRegistry")
            .field("maps", &self.maps.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowcast_primitives::ScalarKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    static DISCOVERIES: AtomicUsize = AtomicUsize::new(0);

    impl AutoMap for Point {
        fn record_map() -> RecordMap<Self> {
            DISCOVERIES.fetch_add(1, Ordering::SeqCst);

            let mut map = RecordMap::new();
            map.member("x", |p: &Self| p.x, |p, v| p.x = v);
            map.member("y", |p: &Self| p.y, |p, v| p.y = v);
            map.default_factory();
            map
        }
    }

    #[test]
    fn members_get_sequential_indices_and_names() {
        let map = Point::record_map();

        let locators: Vec<_> = map.members().iter().map(|m| m.data.locator.clone()).collect();
        assert_eq!(locators[0].index, Some(0));
        assert_eq!(locators[1].index, Some(1));
        assert_eq!(locators[1].names, vec!["y".to_string()]);
        assert_eq!(map.members()[0].data.kind, FieldKind::Scalar(ScalarKind::Int32));
        assert!(map.parameters().is_empty());
    }

    #[test]
    fn setters_reject_values_of_the_wrong_kind() {
        let map = Point::record_map();
        let setter = map.members()[0].setter().expect("x has a setter");
        let mut point = Point::default();

        assert_eq!(setter(&mut point, Value::Int32(4)), Ok(()));
        assert_eq!(point.x, 4);
        assert_eq!(setter(&mut point, Value::from("4")), Err(Value::from("4")));
    }

    #[test]
    fn discovery_runs_once_per_type() {
        let mut registry = RecordMapRegistry::new();
        let before = DISCOVERIES.load(Ordering::SeqCst);

        let first = registry.get_or_discover::<Point>();
        let second = registry.get_or_discover::<Point>();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(DISCOVERIES.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn registered_maps_win_over_discovery() {
        let mut registry = RecordMapRegistry::new();
        let mut map = RecordMap::<Point>::new();
        map.member("x", |p: &Point| p.x, |p, v| p.x = v).name("X");
        map.default_factory();
        registry.register(map);

        let found = registry.get_or_discover::<Point>();
        assert_eq!(found.members().len(), 1);
        assert_eq!(found.members()[0].data.header_name(), "X");
    }

    #[test]
    fn arguments_check_arity_and_kind() {
        let mut args = Arguments::new(
            "Pair",
            vec![("a", Value::Int32(1)), ("b", Value::from("x"))],
        );

        assert_eq!(args.take::<i32>().ok(), Some(1));
        assert!(matches!(
            args.take::<i32>(),
            Err(RowcastError::ValueMismatch { found: "String", .. })
        ));
        assert!(matches!(
            args.take_value(),
            Err(RowcastError::ConstructorArity { parameters: 2, .. })
        ));
    }

    #[test]
    fn binding_mut_reaches_parameters_and_members() {
        let mut map = RecordMap::<Point>::new();
        map.parameter::<i32>("x");
        map.member("y", |p: &Point| p.y, |p, v| p.y = v);

        map.binding_mut("x").expect("parameter x").default_value(0);
        map.binding_mut("y").expect("member y").ignore();

        assert_eq!(map.parameters()[0].data.default, Some(Value::Int32(0)));
        assert!(map.members()[0].data.ignored);
        assert!(map.binding_mut("z").is_none());
    }
}
