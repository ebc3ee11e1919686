use crate::{
    convert::{ConverterCapabilities, TypeConverter, conversion_failure, format},
    error::{ConversionError, InsufficientCapacity},
    model::BindingData,
    value::Value,
};

///
/// BooleanConverter
///
/// Configured true/false tokens are tried first (case-insensitive), then
/// `true`/`false`, then `1`/`0`.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct BooleanConverter;

pub(crate) fn parse_bool(
    text: &str,
    true_values: &[String],
    false_values: &[String],
) -> Option<bool> {
    let trimmed = text.trim();
    let matches_any = |tokens: &[String]| tokens.iter().any(|t| t.eq_ignore_ascii_case(trimmed));

    if matches_any(true_values) {
        return Some(true);
    }
    if matches_any(false_values) {
        return Some(false);
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Some(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Some(false);
    }

    match trimmed.parse::<i16>() {
        Ok(1) => Some(true),
        Ok(0) => Some(false),
        _ => None,
    }
}

impl BooleanConverter {
    fn parse(self, text: &str, data: &BindingData) -> Result<Value, ConversionError> {
        match parse_bool(text, &data.options.true_values, &data.options.false_values) {
            Some(value) => Ok(Value::Bool(value)),
            None => conversion_failure(self.name(), Some(text), data),
        }
    }
}

impl TypeConverter for BooleanConverter {
    fn name(&self) -> &'static str {
        "BooleanConverter"
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

    #[test]
    fn accepts_words_and_digits() {
        assert_eq!(parse_bool(" TRUE ", &[], &[]), Some(true));
        assert_eq!(parse_bool("false", &[], &[]), Some(false));
        assert_eq!(parse_bool("1", &[], &[]), Some(true));
        assert_eq!(parse_bool("0", &[], &[]), Some(false));
        assert_eq!(parse_bool("2", &[], &[]), None);
        assert_eq!(parse_bool("yes", &[], &[]), None);
    }

    #[test]
    fn configured_tokens_win() {
        let yes = vec!["yes".to_string()];
        let no = vec!["no".to_string()];

        assert_eq!(parse_bool("Yes", &yes, &no), Some(true));
        assert_eq!(parse_bool("NO", &yes, &no), Some(false));
        assert_eq!(parse_bool("true", &yes, &no), Some(true));
    }
}
