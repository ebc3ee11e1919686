use crate::{
    convert::{
        BigIntegerConverter, BooleanConverter, CharConverter, ConverterHandle, DateConverter,
        DateTimeConverter, DecimalConverter, DefaultConverter, FloatConverter, IntegerConverter,
        NullableConverter, StringConverter, TypeConverter, UlidConverter,
    },
    model::FieldKind,
};
use rowcast_primitives::{ScalarFamily, ScalarKind};
use std::collections::HashMap;
use tracing::debug;

///
/// ConverterRegistry
///
/// Lazily built converter cache keyed by field kind.
/// A cached converter is never replaced.
///

#[derive(Debug, Default)]
pub struct ConverterRegistry {
    converters: HashMap<FieldKind, ConverterHandle>,
}

impl ConverterRegistry {
    /// Create an empty converter registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the converter for `kind`, building and caching it on first use.
    ///
    /// Optional kinds get a nullable wrapper around the inner kind's
    /// converter; custom kinds with nothing registered get the default
    /// converter, which fails at conversion time.
    pub fn get_converter(&mut self, kind: &FieldKind) -> ConverterHandle {
        if let Some(handle) = self.converters.get(kind) {
            return handle.clone();
        }

        let handle = match kind {
            FieldKind::Scalar(scalar) => builtin_converter(*scalar),
            FieldKind::Optional(inner) => {
                let inner = self.get_converter(inner);
                ConverterHandle::from_converter(NullableConverter::new(inner))
            }
            FieldKind::Custom(_) => ConverterHandle::from_converter(DefaultConverter),
        };

        debug!(
            %kind,
            converter = handle.name(),
            span_parse = handle.capabilities().span_parse,
            span_format = handle.capabilities().span_format,
            "built converter"
        );
        self.converters.insert(kind.clone(), handle.clone());

        handle
    }

    /// Register a converter for `kind`. Returns false if one is already cached.
    pub fn add_converter<C>(&mut self, kind: FieldKind, converter: C) -> bool
    where
        C: TypeConverter + 'static,
    {
        if self.converters.contains_key(&kind) {
            return false;
        }

        self.converters
            .insert(kind, ConverterHandle::from_converter(converter));

        true
    }

    #[must_use]
    pub fn contains(&self, kind: &FieldKind) -> bool {
        self.converters.contains_key(kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

/// Built-in converter for a scalar, routed by family first.
fn builtin_converter(kind: ScalarKind) -> ConverterHandle {
    match kind.family() {
        ScalarFamily::Bool => ConverterHandle::from_converter(BooleanConverter),
        ScalarFamily::Decimal => ConverterHandle::from_converter(DecimalConverter),
        ScalarFamily::Float => float_converter(kind),
        ScalarFamily::Identifier => ConverterHandle::from_converter(UlidConverter),
        ScalarFamily::Integer => integer_converter(kind),
        ScalarFamily::Temporal if kind == ScalarKind::Date => {
            ConverterHandle::from_converter(DateConverter)
        }
        ScalarFamily::Temporal => ConverterHandle::from_converter(DateTimeConverter),
        ScalarFamily::Text if kind == ScalarKind::Char => {
            ConverterHandle::from_converter(CharConverter)
        }
        ScalarFamily::Text => ConverterHandle::from_converter(StringConverter),
    }
}

fn float_converter(kind: ScalarKind) -> ConverterHandle {
    match kind {
        ScalarKind::Float32 => ConverterHandle::from_converter(FloatConverter::<f32>::new()),
        _ => ConverterHandle::from_converter(FloatConverter::<f64>::new()),
    }
}

fn integer_converter(kind: ScalarKind) -> ConverterHandle {
    match kind {
        ScalarKind::Int8 => ConverterHandle::from_converter(IntegerConverter::<i8>::new()),
        ScalarKind::Int16 => ConverterHandle::from_converter(IntegerConverter::<i16>::new()),
        ScalarKind::Int32 => ConverterHandle::from_converter(IntegerConverter::<i32>::new()),
        ScalarKind::Int64 => ConverterHandle::from_converter(IntegerConverter::<i64>::new()),
        ScalarKind::Int128 => ConverterHandle::from_converter(IntegerConverter::<i128>::new()),
        ScalarKind::Uint8 => ConverterHandle::from_converter(IntegerConverter::<u8>::new()),
        ScalarKind::Uint16 => ConverterHandle::from_converter(IntegerConverter::<u16>::new()),
        ScalarKind::Uint32 => ConverterHandle::from_converter(IntegerConverter::<u32>::new()),
        ScalarKind::Uint64 => ConverterHandle::from_converter(IntegerConverter::<u64>::new()),
        ScalarKind::Uint128 => ConverterHandle::from_converter(IntegerConverter::<u128>::new()),
        _ => ConverterHandle::from_converter(BigIntegerConverter),
    }
}
