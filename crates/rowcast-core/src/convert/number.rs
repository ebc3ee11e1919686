use crate::{
    convert::{
        ConverterCapabilities, TypeConverter, conversion_failure, format,
        options::{Culture, NumberStyles},
    },
    error::{ConversionError, InsufficientCapacity},
    model::BindingData,
    value::Value,
};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use std::{borrow::Cow, marker::PhantomData, str::FromStr};

///
/// NumberText
///
/// Numeric text reduced to what `FromStr` / `from_str_radix` accept.
///

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum NumberText<'a> {
    Decimal(Cow<'a, str>),
    Hex(&'a str),
}

/// Reduce culture-specific numeric text to invariant form under `styles`.
/// Borrows when no rewriting is needed.
pub(crate) fn normalize<'a>(
    text: &'a str,
    styles: NumberStyles,
    culture: &Culture,
) -> Option<NumberText<'a>> {
    let mut s = text;
    if styles.contains(NumberStyles::ALLOW_LEADING_WHITE) {
        s = s.trim_start();
    }
    if styles.contains(NumberStyles::ALLOW_TRAILING_WHITE) {
        s = s.trim_end();
    }
    if s.is_empty() {
        return None;
    }

    if styles.contains(NumberStyles::ALLOW_HEX_SPECIFIER) {
        return s
            .bytes()
            .all(|b| b.is_ascii_hexdigit())
            .then_some(NumberText::Hex(s));
    }

    let signed_start = s;
    let mut negative = false;
    let mut signed = false;

    if styles.contains(NumberStyles::ALLOW_PARENTHESES)
        && s.len() >= 2
        && s.starts_with('(')
        && s.ends_with(')')
    {
        s = &s[1..s.len() - 1];
        negative = true;
        signed = true;
    }
    if !signed && styles.contains(NumberStyles::ALLOW_LEADING_SIGN) {
        if let Some(rest) = s.strip_prefix('-') {
            s = rest;
            negative = true;
            signed = true;
        } else if let Some(rest) = s.strip_prefix('+') {
            s = rest;
            signed = true;
        }
    }
    let leading = signed;
    if !signed && styles.contains(NumberStyles::ALLOW_TRAILING_SIGN) {
        if let Some(rest) = s.strip_suffix('-') {
            s = rest;
            negative = true;
        } else if let Some(rest) = s.strip_suffix('+') {
            s = rest;
        }
    }

    if s.is_empty() {
        return None;
    }

    // common case: bare digits, possibly behind a leading sign
    if s.bytes().all(|b| b.is_ascii_digit()) {
        let borrowed = match (negative, leading) {
            (false, _) => Some(s),
            (true, true) if signed_start.starts_with('-') => Some(signed_start),
            _ => None,
        };
        return Some(NumberText::Decimal(match borrowed {
            Some(text) => Cow::Borrowed(text),
            None => Cow::Owned(format!("-{s}")),
        }));
    }

    rewrite(s, negative, styles, culture).map(|text| NumberText::Decimal(Cow::Owned(text)))
}

fn rewrite(body: &str, negative: bool, styles: NumberStyles, culture: &Culture) -> Option<String> {
    let mut out = String::with_capacity(body.len() + 1);
    if negative {
        out.push('-');
    }

    let mut seen_digit = false;
    let mut seen_point = false;
    let mut seen_exponent = false;
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch.is_ascii_digit() {
            out.push(ch);
            seen_digit = true;
        } else if !seen_point
            && !seen_exponent
            && ch == culture.decimal_separator
            && styles.contains(NumberStyles::ALLOW_DECIMAL_POINT)
        {
            out.push('.');
            seen_point = true;
        } else if !seen_point
            && !seen_exponent
            && seen_digit
            && ch == culture.group_separator
            && styles.contains(NumberStyles::ALLOW_THOUSANDS)
        {
            // group separators carry no value
        } else if !seen_exponent
            && seen_digit
            && matches!(ch, 'e' | 'E')
            && styles.contains(NumberStyles::ALLOW_EXPONENT)
        {
            out.push('e');
            seen_exponent = true;
            if let Some(&sign) = chars.peek().filter(|c| matches!(c, '+' | '-')) {
                out.push(sign);
                chars.next();
            }
            if !chars.peek().is_some_and(char::is_ascii_digit) {
                return None;
            }
        } else {
            return None;
        }
    }

    seen_digit.then_some(out)
}

/// Integral part of normalized text, accepting an all-zero fraction.
pub(crate) fn integral_part(text: &str) -> Option<&str> {
    if text.contains('e') {
        return None;
    }

    match text.split_once('.') {
        Some((whole, fraction)) if fraction.bytes().all(|b| b == b'0') => Some(whole),
        Some(_) => None,
        None => Some(text),
    }
}

///
/// Integral
///
/// Fixed-width integer parsed by `IntegerConverter`.
///

pub trait Integral: Copy + FromStr + Into<Value> + Send + Sync + 'static {
    const CONVERTER_NAME: &'static str;

    fn from_hex(digits: &str) -> Option<Self>;
}

macro_rules! integral_impls {
    ( $( $ty:ty => $unsigned:ty ),* $(,)? ) => {
        $(
            impl Integral for $ty {
                const CONVERTER_NAME: &'static str =
                    concat!("IntegerConverter<", stringify!($ty), ">");

                #[allow(clippy::cast_possible_wrap, clippy::unnecessary_cast)]
                fn from_hex(digits: &str) -> Option<Self> {
                    <$unsigned>::from_str_radix(digits, 16).ok().map(|v| v as $ty)
                }
            }
        )*
    };
}

integral_impls! {
    i8 => u8,
    i16 => u16,
    i32 => u32,
    i64 => u64,
    i128 => u128,
    u8 => u8,
    u16 => u16,
    u32 => u32,
    u64 => u64,
    u128 => u128,
}

pub(crate) fn parse_integer<T: Integral>(
    text: &str,
    styles: NumberStyles,
    culture: &Culture,
) -> Option<T> {
    match normalize(text, styles, culture)? {
        NumberText::Hex(digits) => T::from_hex(digits),
        NumberText::Decimal(text) => integral_part(&text)?.parse().ok(),
    }
}

///
/// IntegerConverter
///

pub struct IntegerConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> IntegerConverter<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for IntegerConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Integral> IntegerConverter<T> {
    fn parse(&self, text: &str, data: &BindingData) -> Result<Value, ConversionError> {
        let styles = data.options.number_styles_or(NumberStyles::INTEGER);

        match parse_integer::<T>(text, styles, data.options.culture()) {
            Some(value) => Ok(value.into()),
            None => conversion_failure(self.name(), Some(text), data),
        }
    }
}

impl<T: Integral> TypeConverter for IntegerConverter<T> {
    fn name(&self) -> &'static str {
        T::CONVERTER_NAME
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
/// Floating
///

pub trait Floating: Copy + FromStr + Into<Value> + Send + Sync + 'static {
    const CONVERTER_NAME: &'static str;
}

impl Floating for f32 {
    const CONVERTER_NAME: &'static str = "FloatConverter<f32>";
}

impl Floating for f64 {
    const CONVERTER_NAME: &'static str = "FloatConverter<f64>";
}

/// `inf`, `-infinity`, `NaN` and friends, which std parses directly.
fn is_special_float(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);

    ["inf", "infinity", "nan"]
        .iter()
        .any(|token| unsigned.eq_ignore_ascii_case(token))
}

pub(crate) fn parse_float<T: Floating>(
    text: &str,
    styles: NumberStyles,
    culture: &Culture,
) -> Option<T> {
    let trimmed = text.trim();
    if is_special_float(trimmed) {
        return trimmed.parse().ok();
    }

    match normalize(text, styles, culture)? {
        NumberText::Decimal(text) => text.parse().ok(),
        NumberText::Hex(_) => None,
    }
}

///
/// FloatConverter
///

pub struct FloatConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> FloatConverter<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for FloatConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Floating> FloatConverter<T> {
    fn parse(&self, text: &str, data: &BindingData) -> Result<Value, ConversionError> {
        let styles = data
            .options
            .number_styles_or(NumberStyles::FLOAT | NumberStyles::ALLOW_THOUSANDS);

        match parse_float::<T>(text, styles, data.options.culture()) {
            Some(value) => Ok(value.into()),
            None => conversion_failure(self.name(), Some(text), data),
        }
    }
}

impl<T: Floating> TypeConverter for FloatConverter<T> {
    fn name(&self) -> &'static str {
        T::CONVERTER_NAME
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
/// DecimalConverter
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DecimalConverter;

pub(crate) fn parse_decimal(
    text: &str,
    styles: NumberStyles,
    culture: &Culture,
) -> Option<Decimal> {
    match normalize(text, styles, culture)? {
        NumberText::Decimal(text) if text.contains('e') => Decimal::from_scientific(&text).ok(),
        NumberText::Decimal(text) => Decimal::from_str(&text).ok(),
        NumberText::Hex(digits) => u128::from_str_radix(digits, 16)
            .ok()
            .and_then(Decimal::from_u128),
    }
}

impl DecimalConverter {
    fn parse(self, text: &str, data: &BindingData) -> Result<Value, ConversionError> {
        let styles = data.options.number_styles_or(NumberStyles::NUMBER);

        match parse_decimal(text, styles, data.options.culture()) {
            Some(value) => Ok(Value::Decimal(value)),
            None => conversion_failure(self.name(), Some(text), data),
        }
    }
}

impl TypeConverter for DecimalConverter {
    fn name(&self) -> &'static str {
        "DecimalConverter"
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

    fn invariant() -> Culture {
        Culture::INVARIANT
    }

    #[test]
    fn plain_digits_borrow() {
        let text = normalize(" -42 ", NumberStyles::INTEGER, &invariant());

        assert_eq!(text, Some(NumberText::Decimal(Cow::Borrowed("-42"))));
        assert!(matches!(
            normalize("+7", NumberStyles::INTEGER, &invariant()),
            Some(NumberText::Decimal(Cow::Borrowed("7")))
        ));
    }

    #[test]
    fn whitespace_needs_permission() {
        assert_eq!(normalize(" 1", NumberStyles::empty(), &invariant()), None);
        assert_eq!(normalize("-1", NumberStyles::ALLOW_LEADING_WHITE, &invariant()), None);
    }

    #[test]
    fn parentheses_and_trailing_sign_negate() {
        assert_eq!(parse_integer::<i32>("(15)", NumberStyles::ANY, &invariant()), Some(-15));
        assert_eq!(parse_integer::<i32>("15-", NumberStyles::NUMBER, &invariant()), Some(-15));
        assert_eq!(parse_integer::<i32>("(15)", NumberStyles::INTEGER, &invariant()), None);
    }

    #[test]
    fn thousands_and_culture_separators() {
        let de = Culture::DE_DE;

        assert_eq!(
            parse_integer::<i64>("1,234,567", NumberStyles::NUMBER, &invariant()),
            Some(1_234_567)
        );
        assert_eq!(parse_integer::<i64>("1,234", NumberStyles::INTEGER, &invariant()), None);
        assert_eq!(parse_float::<f64>("1.234,5", NumberStyles::NUMBER, &de), Some(1234.5));
        assert_eq!(
            parse_decimal("-0,25", NumberStyles::NUMBER, &de).map(|d| d.to_string()),
            Some("-0.25".to_string())
        );
    }

    #[test]
    fn integers_accept_zero_fractions_only() {
        assert_eq!(parse_integer::<u8>("12.00", NumberStyles::NUMBER, &invariant()), Some(12));
        assert_eq!(parse_integer::<u8>("12.5", NumberStyles::NUMBER, &invariant()), None);
    }

    #[test]
    fn hex_wraps_into_signed_range() {
        assert_eq!(parse_integer::<i8>("FF", NumberStyles::HEX_NUMBER, &invariant()), Some(-1));
        assert_eq!(parse_integer::<u16>("00ff", NumberStyles::HEX_NUMBER, &invariant()), Some(255));
        assert_eq!(parse_integer::<u16>("0xff", NumberStyles::HEX_NUMBER, &invariant()), None);
    }

    #[test]
    fn exponent_requires_digits() {
        assert_eq!(parse_float::<f64>("1.5e3", NumberStyles::FLOAT, &invariant()), Some(1500.0));
        assert_eq!(parse_float::<f64>("1.5e", NumberStyles::FLOAT, &invariant()), None);
        assert_eq!(parse_float::<f64>("1.5e3", NumberStyles::NUMBER, &invariant()), None);
        assert_eq!(
            parse_decimal("2.5E-2", NumberStyles::ANY, &invariant()).map(|d| d.to_string()),
            Some("0.025".to_string())
        );
    }

    #[test]
    fn special_floats_parse() {
        assert_eq!(
            parse_float::<f64>("-inf", NumberStyles::FLOAT, &invariant()),
            Some(f64::NEG_INFINITY)
        );
        assert!(
            parse_float::<f32>("NaN", NumberStyles::FLOAT, &invariant()).is_some_and(f32::is_nan)
        );
    }

    #[test]
    fn overflow_is_rejected() {
        assert_eq!(parse_integer::<u8>("256", NumberStyles::INTEGER, &invariant()), None);
        assert_eq!(parse_integer::<i8>("-129", NumberStyles::INTEGER, &invariant()), None);
    }
}
