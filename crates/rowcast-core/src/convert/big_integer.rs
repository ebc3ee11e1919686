use crate::{
    convert::{
        ConverterCapabilities, TypeConverter, conversion_failure, format,
        number::{NumberText, integral_part, normalize},
        options::{Culture, NumberStyles},
    },
    error::{ConversionError, InsufficientCapacity},
    model::BindingData,
    value::Value,
};
use num_bigint::BigInt;
use std::str::FromStr;

///
/// BigIntegerConverter
///
/// Arbitrary-precision integers. Styles default to `INTEGER`. Hex text is
/// a signed magnitude (`-FF`), matching what the `X` format writes.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct BigIntegerConverter;

pub(crate) fn parse_big_integer(
    text: &str,
    styles: NumberStyles,
    culture: &Culture,
) -> Option<BigInt> {
    if styles.contains(NumberStyles::ALLOW_HEX_SPECIFIER) {
        let trimmed = if styles.contains(NumberStyles::ALLOW_LEADING_WHITE) {
            text.trim_start()
        } else {
            text
        };
        if let Some(magnitude) = trimmed.strip_prefix('-') {
            return match normalize(magnitude, styles, culture)? {
                NumberText::Hex(digits) => BigInt::parse_bytes(digits.as_bytes(), 16).map(|v| -v),
                NumberText::Decimal(_) => None,
            };
        }
    }

    match normalize(text, styles, culture)? {
        NumberText::Hex(digits) => BigInt::parse_bytes(digits.as_bytes(), 16),
        NumberText::Decimal(text) => BigInt::from_str(integral_part(&text)?).ok(),
    }
}

impl BigIntegerConverter {
    fn parse(self, text: &str, data: &BindingData) -> Result<Value, ConversionError> {
        let styles = data.options.number_styles_or(NumberStyles::INTEGER);

        match parse_big_integer(text, styles, data.options.culture()) {
            Some(value) => Ok(Value::IntBig(value)),
            None => conversion_failure(self.name(), Some(text), data),
        }
    }
}

impl TypeConverter for BigIntegerConverter {
    fn name(&self) -> &'static str {
        "BigIntegerConverter"
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
