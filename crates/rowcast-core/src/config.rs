use crate::convert::{ConversionOptions, Culture};
use serde::{Deserialize, Serialize};

///
/// Configuration
///
/// Reader/writer-wide settings shared by every compiled plan.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Configuration {
    pub culture: Culture,
    pub has_header_record: bool,

    /// When false, conversion errors carry a placeholder instead of the field text.
    pub exception_messages_contain_raw_data: bool,

    /// Missing fields read as the binding default (or the converter's view of
    /// absent text) instead of failing.
    pub ignore_missing_fields: bool,

    /// Scratch capacity for the fast formatting path, in bytes.
    pub format_buffer_capacity: usize,
}

impl Configuration {
    /// Lowest options layer applied to every binding.
    #[must_use]
    pub fn conversion_defaults(&self) -> ConversionOptions {
        ConversionOptions {
            culture: Some(self.culture.clone()),
            redact_raw_data: Some(!self.exception_messages_contain_raw_data),
            ..ConversionOptions::default()
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            culture: Culture::INVARIANT,
            has_header_record: true,
            exception_messages_contain_raw_data: true,
            ignore_missing_fields: false,
            format_buffer_capacity: 128,
        }
    }
}
