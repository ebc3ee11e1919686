use crate::{
    convert::{ConversionOptions, ConverterHandle, Culture, NumberStyles},
    model::FieldKind,
    row::ReaderRow,
    value::Value,
};

///
/// FieldLocator
///
/// Where a binding's field sits in a row: by header name (with an
/// occurrence index for duplicate headers) when the row has a header,
/// otherwise by position.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldLocator {
    pub index: Option<usize>,
    pub names: Vec<String>,
    pub name_index: usize,
}

impl FieldLocator {
    #[must_use]
    pub const fn at(index: usize) -> Self {
        Self {
            index: Some(index),
            names: Vec::new(),
            name_index: 0,
        }
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            index: None,
            names: vec![name.into()],
            name_index: 0,
        }
    }

    /// Resolve against a row. With a header and at least one name, only the
    /// names are consulted; the first name present wins.
    #[must_use]
    pub fn resolve(&self, row: &dyn ReaderRow) -> Option<usize> {
        if !self.names.is_empty() && row.header_record().is_some() {
            return self
                .names
                .iter()
                .find_map(|name| row.field_index(name, self.name_index));
        }

        self.index
    }

    /// Human-readable description for missing-field errors.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.names.as_slice(), self.index) {
            ([], Some(index)) => format!("at index {index}"),
            ([], None) => "with no locator".to_string(),
            (names, _) if self.name_index > 0 => {
                format!("'{}' (occurrence {})", names.join("' or '"), self.name_index)
            }
            (names, _) => format!("'{}'", names.join("' or '")),
        }
    }
}

///
/// BindingData
///
/// One field ↔ one target slot: where to find the field, what kind it
/// converts to, and how.
///
/// `default` doubles as the "default is set" flag.
///

#[derive(Clone, Debug)]
pub struct BindingData {
    pub name: String,
    pub kind: FieldKind,
    pub locator: FieldLocator,
    pub converter: Option<ConverterHandle>,
    pub options: ConversionOptions,
    pub default: Option<Value>,

    /// Written and read in place of the field.
    pub constant: Option<Value>,

    /// A missing field reads as the default instead of failing.
    pub optional: bool,

    /// Skipped by both read and write plans.
    pub ignored: bool,
}

impl BindingData {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            locator: FieldLocator::default(),
            converter: None,
            options: ConversionOptions::default(),
            default: None,
            constant: None,
            optional: false,
            ignored: false,
        }
    }

    #[must_use]
    pub const fn is_default_set(&self) -> bool {
        self.default.is_some()
    }

    /// Header name used when writing.
    #[must_use]
    pub fn header_name(&self) -> &str {
        self.locator.names.first().map_or(self.name.as_str(), String::as_str)
    }

    ///
    /// CONFIGURATION
    ///

    pub const fn index(&mut self, index: usize) -> &mut Self {
        self.locator.index = Some(index);
        self
    }

    /// Replace the header names with a single name.
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.locator.names = vec![name.into()];
        self
    }

    /// Add a header name tried after the existing ones.
    pub fn alternate_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.locator.names.push(name.into());
        self
    }

    pub const fn name_index(&mut self, occurrence: usize) -> &mut Self {
        self.locator.name_index = occurrence;
        self
    }

    pub fn default_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default = Some(value.into());
        self
    }

    pub fn constant(&mut self, value: impl Into<Value>) -> &mut Self {
        self.constant = Some(value.into());
        self
    }

    pub const fn allow_missing(&mut self) -> &mut Self {
        self.optional = true;
        self
    }

    pub const fn ignore(&mut self) -> &mut Self {
        self.ignored = true;
        self
    }

    pub fn converter(&mut self, converter: ConverterHandle) -> &mut Self {
        self.converter = Some(converter);
        self
    }

    pub fn options(&mut self, options: ConversionOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn culture(&mut self, culture: Culture) -> &mut Self {
        self.options.culture = Some(culture);
        self
    }

    pub const fn number_styles(&mut self, styles: NumberStyles) -> &mut Self {
        self.options.number_styles = Some(styles);
        self
    }

    pub fn format(&mut self, format: impl Into<String>) -> &mut Self {
        self.options.formats.push(format.into());
        self
    }

    pub fn null_value(&mut self, token: impl Into<String>) -> &mut Self {
        self.options.null_values.push(token.into());
        self
    }
}
