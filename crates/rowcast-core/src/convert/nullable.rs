use crate::{
    convert::{ConverterCapabilities, ConverterHandle, TypeConverter, format},
    error::{ConversionError, InsufficientCapacity},
    model::BindingData,
    value::Value,
};

///
/// NullableConverter
///
/// Wraps the converter of an optional kind's inner kind.
/// Empty text and exact null-token matches read as `Value::Null` without
/// reaching the inner converter.
///

#[derive(Clone, Debug)]
pub struct NullableConverter {
    inner: ConverterHandle,
}

impl NullableConverter {
    #[must_use]
    pub const fn new(inner: ConverterHandle) -> Self {
        Self { inner }
    }

    #[must_use]
    pub const fn inner(&self) -> &ConverterHandle {
        &self.inner
    }

    fn is_null(text: &str, data: &BindingData) -> bool {
        text.is_empty() || data.options.is_null_token(text)
    }
}

impl TypeConverter for NullableConverter {
    fn name(&self) -> &'static str {
        "NullableConverter"
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
            None => Ok(Value::Null),
            Some(text) if Self::is_null(text, data) => Ok(Value::Null),
            Some(text) => self.inner.read(Some(text), data),
        }
    }

    fn convert_from_span(&self, text: &str, data: &BindingData) -> Result<Value, ConversionError> {
        if Self::is_null(text, data) {
            return Ok(Value::Null);
        }

        self.inner.read(Some(text), data)
    }

    fn convert_to_string(&self, value: &Value, data: &BindingData) -> String {
        match value {
            Value::Null => data.options.first_null_value().unwrap_or_default().to_string(),
            _ => self.inner.write(value, data),
        }
    }

    fn try_format(
        &self,
        value: &Value,
        destination: &mut [u8],
        data: &BindingData,
    ) -> Result<usize, InsufficientCapacity> {
        match value {
            Value::Null => format::copy_into(
                data.options.first_null_value().unwrap_or_default(),
                destination,
            ),
            _ if self.inner.capabilities().span_format => {
                self.inner.write_into(value, destination, data)
            }
            _ => format::copy_into(&self.inner.write(value, data), destination),
        }
    }
}
