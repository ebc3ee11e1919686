use crate::model::FieldKind;
use bitflags::bitflags;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::HashMap};

static INVARIANT_CULTURE: Culture = Culture::INVARIANT;

///
/// Culture
///
/// Separators used when parsing and formatting numbers.
/// The negative sign is always `-`.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[display("{name}")]
pub struct Culture {
    pub name: Cow<'static, str>,
    pub decimal_separator: char,
    pub group_separator: char,
}

impl Culture {
    pub const INVARIANT: Self = Self::from_static("invariant", '.', ',');
    pub const EN_US: Self = Self::from_static("en-US", '.', ',');
    pub const DE_DE: Self = Self::from_static("de-DE", ',', '.');
    pub const FR_FR: Self = Self::from_static("fr-FR", ',', '\u{202f}');

    #[must_use]
    pub const fn from_static(
        name: &'static str,
        decimal_separator: char,
        group_separator: char,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            decimal_separator,
            group_separator,
        }
    }

    #[must_use]
    pub fn new(name: impl Into<String>, decimal_separator: char, group_separator: char) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            decimal_separator,
            group_separator,
        }
    }
}

impl Default for Culture {
    fn default() -> Self {
        Self::INVARIANT
    }
}

bitflags! {
    ///
    /// NumberStyles
    ///
    /// Permitted syntax when parsing numeric text.
    ///

    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
    pub struct NumberStyles: u16 {
        const ALLOW_LEADING_WHITE = 1;
        const ALLOW_TRAILING_WHITE = 1 << 1;
        const ALLOW_LEADING_SIGN = 1 << 2;
        const ALLOW_TRAILING_SIGN = 1 << 3;
        const ALLOW_PARENTHESES = 1 << 4;
        const ALLOW_DECIMAL_POINT = 1 << 5;
        const ALLOW_THOUSANDS = 1 << 6;
        const ALLOW_EXPONENT = 1 << 7;
        const ALLOW_HEX_SPECIFIER = 1 << 8;

        const INTEGER = Self::ALLOW_LEADING_WHITE.bits()
            | Self::ALLOW_TRAILING_WHITE.bits()
            | Self::ALLOW_LEADING_SIGN.bits();
        const NUMBER = Self::INTEGER.bits()
            | Self::ALLOW_TRAILING_SIGN.bits()
            | Self::ALLOW_DECIMAL_POINT.bits()
            | Self::ALLOW_THOUSANDS.bits();
        const FLOAT = Self::INTEGER.bits()
            | Self::ALLOW_DECIMAL_POINT.bits()
            | Self::ALLOW_EXPONENT.bits();
        const HEX_NUMBER = Self::ALLOW_LEADING_WHITE.bits()
            | Self::ALLOW_TRAILING_WHITE.bits()
            | Self::ALLOW_HEX_SPECIFIER.bits();
        const ANY = Self::NUMBER.bits()
            | Self::ALLOW_PARENTHESES.bits()
            | Self::ALLOW_EXPONENT.bits();
    }
}

///
/// ConversionOptions
///
/// Per-binding conversion settings. Unset fields fall through to the
/// next layer when options are merged.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub culture: Option<Culture>,
    pub number_styles: Option<NumberStyles>,
    pub formats: Vec<String>,
    pub null_values: Vec<String>,
    pub true_values: Vec<String>,
    pub false_values: Vec<String>,
    pub redact_raw_data: Option<bool>,
}

impl ConversionOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge layers in order; a later `Some` or non-empty list wins.
    #[must_use]
    pub fn merge<'a>(layers: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut merged = Self::default();

        for layer in layers {
            if layer.culture.is_some() {
                merged.culture.clone_from(&layer.culture);
            }
            if layer.number_styles.is_some() {
                merged.number_styles = layer.number_styles;
            }
            if layer.redact_raw_data.is_some() {
                merged.redact_raw_data = layer.redact_raw_data;
            }
            replace_if_set(&mut merged.formats, &layer.formats);
            replace_if_set(&mut merged.null_values, &layer.null_values);
            replace_if_set(&mut merged.true_values, &layer.true_values);
            replace_if_set(&mut merged.false_values, &layer.false_values);
        }

        merged
    }

    ///
    /// BUILDERS
    ///

    #[must_use]
    pub fn with_culture(mut self, culture: Culture) -> Self {
        self.culture = Some(culture);
        self
    }

    #[must_use]
    pub const fn with_number_styles(mut self, styles: NumberStyles) -> Self {
        self.number_styles = Some(styles);
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.formats.push(format.into());
        self
    }

    #[must_use]
    pub fn with_null_value(mut self, token: impl Into<String>) -> Self {
        self.null_values.push(token.into());
        self
    }

    #[must_use]
    pub fn with_bool_values<T, F>(mut self, true_values: T, false_values: F) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        self.true_values = true_values.into_iter().map(Into::into).collect();
        self.false_values = false_values.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_redaction(mut self, redact: bool) -> Self {
        self.redact_raw_data = Some(redact);
        self
    }

    ///
    /// ACCESSORS
    ///

    /// Culture in effect, falling back to the invariant culture.
    #[must_use]
    pub fn culture(&self) -> &Culture {
        self.culture.as_ref().unwrap_or(&INVARIANT_CULTURE)
    }

    #[must_use]
    pub fn number_styles_or(&self, fallback: NumberStyles) -> NumberStyles {
        self.number_styles.unwrap_or(fallback)
    }

    #[must_use]
    pub fn first_format(&self) -> Option<&str> {
        self.formats.first().map(String::as_str)
    }

    #[must_use]
    pub fn first_null_value(&self) -> Option<&str> {
        self.null_values.first().map(String::as_str)
    }

    /// Exact, case-sensitive match against the configured null tokens.
    #[must_use]
    pub fn is_null_token(&self, text: &str) -> bool {
        self.null_values.iter().any(|token| token == text)
    }

    #[must_use]
    pub fn redacts_raw_data(&self) -> bool {
        self.redact_raw_data.unwrap_or(false)
    }
}

fn replace_if_set(target: &mut Vec<String>, layer: &[String]) {
    if !layer.is_empty() {
        target.clear();
        target.extend_from_slice(layer);
    }
}

///
/// ConversionOptionsCache
///
/// Per-kind option defaults layered beneath each binding's own options.
///

#[derive(Clone, Debug, Default)]
pub struct ConversionOptionsCache {
    options: HashMap<FieldKind, ConversionOptions>,
}

impl ConversionOptionsCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get_options(&self, kind: &FieldKind) -> Option<&ConversionOptions> {
        self.options.get(kind)
    }

    pub fn add_options(&mut self, kind: FieldKind, options: ConversionOptions) {
        self.options.insert(kind, options);
    }

    pub fn remove_options(&mut self, kind: &FieldKind) -> Option<ConversionOptions> {
        self.options.remove(kind)
    }

    pub fn clear(&mut self) {
        self.options.clear();
    }
}
