use crate::{
    convert::{
        ConverterCapabilities, TypeConverter, conversion_failure,
        format::{self, DATE_FORMAT, DATE_TIME_FORMAT},
    },
    error::{ConversionError, InsufficientCapacity},
    model::BindingData,
    value::Value,
};
use time::{
    Date, PrimitiveDateTime,
    format_description::{self, BorrowedFormatItem},
};

/// Try each configured format description in order, or the ISO default
/// when none is configured. Unparseable descriptions are skipped.
fn parse_with<T>(
    text: &str,
    formats: &[String],
    default: &[BorrowedFormatItem<'_>],
    parse: impl Fn(&str, &[BorrowedFormatItem<'_>]) -> Result<T, time::error::Parse>,
) -> Option<T> {
    let text = text.trim();
    if formats.is_empty() {
        return parse(text, default).ok();
    }

    formats.iter().find_map(|format| {
        let items = format_description::parse(format).ok()?;
        parse(text, &items).ok()
    })
}

pub(crate) fn parse_date(text: &str, formats: &[String]) -> Option<Date> {
    parse_with(text, formats, DATE_FORMAT, |text, items| Date::parse(text, items))
}

pub(crate) fn parse_date_time(text: &str, formats: &[String]) -> Option<PrimitiveDateTime> {
    parse_with(text, formats, DATE_TIME_FORMAT, |text, items| {
        PrimitiveDateTime::parse(text, items)
    })
}

///
/// DateConverter
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DateConverter;

impl DateConverter {
    fn parse(self, text: &str, data: &BindingData) -> Result<Value, ConversionError> {
        match parse_date(text, &data.options.formats) {
            Some(value) => Ok(Value::Date(value)),
            None => conversion_failure(self.name(), Some(text), data),
        }
    }
}

impl TypeConverter for DateConverter {
    fn name(&self) -> &'static str {
        "DateConverter"
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

///
/// DateTimeConverter
///
/// Local date-time without offset; the default layout is ISO 8601 with an
/// optional fractional second.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DateTimeConverter;

impl DateTimeConverter {
    fn parse(self, text: &str, data: &BindingData) -> Result<Value, ConversionError> {
        match parse_date_time(text, &data.options.formats) {
            Some(value) => Ok(Value::DateTime(value)),
            None => conversion_failure(self.name(), Some(text), data),
        }
    }
}

impl TypeConverter for DateTimeConverter {
    fn name(&self) -> &'static str {
        "DateTimeConverter"
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

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn iso_defaults() {
        assert_eq!(parse_date(" 2024-02-29 ", &[]), Some(date!(2024 - 02 - 29)));
        assert_eq!(
            parse_date_time("2024-02-29T13:45:00", &[]),
            Some(datetime!(2024-02-29 13:45:00))
        );
        assert_eq!(
            parse_date_time("2024-02-29T13:45:00.25", &[]),
            Some(datetime!(2024-02-29 13:45:00.25))
        );
        assert_eq!(parse_date("2023-02-29", &[]), None);
    }

    #[test]
    fn formats_are_tried_in_order() {
        let formats = vec![
            "[bogus".to_string(),
            "[day]/[month]/[year]".to_string(),
            "[year].[month].[day]".to_string(),
        ];

        assert_eq!(parse_date("05/03/2024", &formats), Some(date!(2024 - 03 - 05)));
        assert_eq!(parse_date("2024.03.05", &formats), Some(date!(2024 - 03 - 05)));
        assert_eq!(
            parse_date("2024-03-05", &formats),
            None,
            "configured formats replace the default"
        );
    }
}
