use crate::{
    convert::{ConverterCapabilities, TypeConverter, format},
    error::{ConversionError, InsufficientCapacity},
    model::BindingData,
    value::Value,
};
use tracing::debug;

///
/// DefaultConverter
///
/// Fallback for kinds with no registered converter. Every parse goes
/// through the shared failure path; formatting is natural.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultConverter;

impl TypeConverter for DefaultConverter {
    fn name(&self) -> &'static str {
        "DefaultConverter"
    }

    fn capabilities(&self) -> ConverterCapabilities {
        ConverterCapabilities {
            span_parse: false,
            span_format: true,
        }
    }

    fn convert_from_string(
        &self,
        text: Option<&str>,
        data: &BindingData,
    ) -> Result<Value, ConversionError> {
        conversion_failure(self.name(), text, data)
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

/// Shared failure path: the binding default when one is set and fits the
/// declared kind, otherwise a `ConversionError` (redacted if configured).
pub fn conversion_failure(
    converter: &'static str,
    text: Option<&str>,
    data: &BindingData,
) -> Result<Value, ConversionError> {
    if let Some(default) = data.default.as_ref().filter(|d| data.kind.accepts(d)) {
        debug!(
            member = %data.name,
            kind = %data.kind,
            converter,
            "conversion failed; substituting configured default"
        );
        return Ok(default.clone());
    }

    Err(ConversionError::new(converter, text.unwrap_or_default(), data))
}
