use crate::{
    convert::{ConverterCapabilities, TypeConverter, conversion_failure, format},
    error::{ConversionError, InsufficientCapacity},
    model::BindingData,
    value::Value,
};
use ulid::Ulid;

///
/// UlidConverter
///
/// Canonical 26-character Crockford base32.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct UlidConverter;

impl UlidConverter {
    fn parse(self, text: &str, data: &BindingData) -> Result<Value, ConversionError> {
        match Ulid::from_string(text.trim()) {
            Ok(value) => Ok(Value::Ulid(value)),
            Err(_) => conversion_failure(self.name(), Some(text), data),
        }
    }
}

impl TypeConverter for UlidConverter {
    fn name(&self) -> &'static str {
        "UlidConverter"
    }

    fn capabilities(&self) -> ConverterCapabilities {
        ConverterCapabilities::SPAN
    }

    fn convert_from_string(
        &self,
        text: Option<&str>,
        data: &BindingData,
    ) -> Result<Value, ConversionError> {
        match text {
            Some(text) => self.parse(text, data),
            None => conversion_failure(self.name(), None, data),
        }
    }

    fn convert_from_span(&self, text: &str, data: &BindingData) -> Result<Value, ConversionError> {
        self.parse(text, data)
    }

    fn try_format(
        &self,
        value: &Value,
        destination: &mut [u8],
        data: &BindingData,
    ) -> Result<usize, InsufficientCapacity> {
        format::format_into(destination, value, &data.options)
    }
}
