use crate::{
    convert::{ConverterCapabilities, TypeConverter, conversion_failure, format},
    error::{ConversionError, InsufficientCapacity},
    model::BindingData,
    value::Value,
};

///
/// StringConverter
///
/// Identity conversion. Absent text reads as an empty string.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct StringConverter;

impl TypeConverter for StringConverter {
    fn name(&self) -> &'static str {
        "StringConverter"
    }

    fn capabilities(&self) -> ConverterCapabilities {
        ConverterCapabilities::SPAN
    }

    fn convert_from_string(
        &self,
        text: Option<&str>,
        _data: &BindingData,
    ) -> Result<Value, ConversionError> {
        Ok(Value::Text(text.unwrap_or_default().to_string()))
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

///
/// CharConverter
///
/// Single character; longer text is trimmed before the length check.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CharConverter;

pub(crate) fn parse_char(text: &str) -> Option<char> {
    let single = |s: &str| {
        let mut chars = s.chars();
        let ch = chars.next()?;
        chars.next().is_none().then_some(ch)
    };

    single(text).or_else(|| single(text.trim()))
}

impl CharConverter {
    fn parse(self, text: &str, data: &BindingData) -> Result<Value, ConversionError> {
        match parse_char(text) {
            Some(ch) => Ok(Value::Char(ch)),
            None => conversion_failure(self.name(), Some(text), data),
        }
    }
}

impl TypeConverter for CharConverter {
    fn name(&self) -> &'static str {
        "CharConverter"
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
