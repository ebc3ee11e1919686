mod big_integer;
mod boolean;
mod default;
mod format;
mod identifier;
mod nullable;
mod number;
mod options;
mod registry;
mod temporal;
mod text;

#[cfg(test)]
mod tests;

pub use big_integer::BigIntegerConverter;
pub use boolean::BooleanConverter;
pub use default::{DefaultConverter, conversion_failure};
pub use identifier::UlidConverter;
pub use nullable::NullableConverter;
pub use number::{DecimalConverter, FloatConverter, IntegerConverter};
pub use options::{ConversionOptions, ConversionOptionsCache, Culture, NumberStyles};
pub use registry::ConverterRegistry;
pub use temporal::{DateConverter, DateTimeConverter};
pub use text::{CharConverter, StringConverter};

use crate::{
    error::{ConversionError, InsufficientCapacity},
    model::BindingData,
    value::Value,
};
use std::{fmt, sync::Arc};

///
/// ConverterCapabilities
///
/// Fast-path support declared by a converter, read once when its handle
/// is built and cached alongside it.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConverterCapabilities {
    pub span_parse: bool,
    pub span_format: bool,
}

impl ConverterCapabilities {
    pub const NONE: Self = Self {
        span_parse: false,
        span_format: false,
    };

    pub const SPAN: Self = Self {
        span_parse: true,
        span_format: true,
    };
}

///
/// TypeConverter
///
/// Bidirectional text ↔ value transform for one field kind.
///
/// The allocating path (`convert_from_string` / `convert_to_string`) is
/// required. The fast path (`convert_from_span` / `try_format`) defaults to
/// delegating to it; converters that override it advertise so through
/// `capabilities`.
///

pub trait TypeConverter: Send + Sync {
    /// Name reported in conversion errors and logs.
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> ConverterCapabilities {
        ConverterCapabilities::NONE
    }

    /// Convert owned field text; `None` means the field was absent.
    fn convert_from_string(
        &self,
        text: Option<&str>,
        data: &BindingData,
    ) -> Result<Value, ConversionError>;

    fn convert_to_string(&self, value: &Value, data: &BindingData) -> String {
        format::to_text(value, &data.options)
    }

    /// Convert borrowed field text without an intermediate allocation.
    fn convert_from_span(&self, text: &str, data: &BindingData) -> Result<Value, ConversionError> {
        self.convert_from_string(Some(text), data)
    }

    /// Format into caller-owned capacity, returning the byte count written.
    fn try_format(
        &self,
        value: &Value,
        destination: &mut [u8],
        data: &BindingData,
    ) -> Result<usize, InsufficientCapacity> {
        format::copy_into(&self.convert_to_string(value, data), destination)
    }
}

///
/// ConverterHandle
///
/// Shared converter plus its cached capabilities.
///

#[derive(Clone)]
pub struct ConverterHandle {
    converter: Arc<dyn TypeConverter>,
    capabilities: ConverterCapabilities,
}

impl ConverterHandle {
    #[must_use]
    pub fn new(converter: Arc<dyn TypeConverter>) -> Self {
        let capabilities = converter.capabilities();

        Self {
            converter,
            capabilities,
        }
    }

    #[must_use]
    pub fn from_converter<C: TypeConverter + 'static>(converter: C) -> Self {
        Self::new(Arc::new(converter))
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.converter.name()
    }

    #[must_use]
    pub const fn capabilities(&self) -> ConverterCapabilities {
        self.capabilities
    }

    #[must_use]
    pub fn converter(&self) -> &dyn TypeConverter {
        self.converter.as_ref()
    }

    /// Parse text, taking the fast path when the converter supports it.
    pub fn read(&self, text: Option<&str>, data: &BindingData) -> Result<Value, ConversionError> {
        match text {
            Some(text) if self.capabilities.span_parse => {
                self.converter.convert_from_span(text, data)
            }
            _ => self.converter.convert_from_string(text, data),
        }
    }

    #[must_use]
    pub fn write(&self, value: &Value, data: &BindingData) -> String {
        self.converter.convert_to_string(value, data)
    }

    /// Fast-path format; converters without one report zero capacity so the
    /// caller falls back to `write`.
    pub fn write_into(
        &self,
        value: &Value,
        destination: &mut [u8],
        data: &BindingData,
    ) -> Result<usize, InsufficientCapacity> {
        if !self.capabilities.span_format {
            return Err(InsufficientCapacity { capacity: 0 });
        }

        self.converter.try_format(value, destination, data)
    }
}

impl fmt::Debug for ConverterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterHandle")
            .field("name", &self.name())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
