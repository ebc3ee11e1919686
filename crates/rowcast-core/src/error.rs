use crate::model::{BindingData, FieldKind};
use std::fmt;
use thiserror::Error as ThisError;

/// Placeholder substituted for raw field text when redaction is enabled.
pub const REDACTED_TEXT: &str = "Hidden because exception_messages_contain_raw_data is false.";

///
/// RowcastError
///
/// Failure surfaced by record creation, plan compilation and ad-hoc field access.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum RowcastError {
    #[error("constructor for '{type_name}' does not consume exactly {parameters} mapped parameters")]
    ConstructorArity {
        type_name: &'static str,
        parameters: usize,
    },

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("strategy '{strategy}' produced a creator for a different type than '{type_name}'")]
    CreatorMismatch {
        strategy: &'static str,
        type_name: &'static str,
    },

    #[error("no constructor or factory is mapped for type '{type_name}'")]
    MissingConstructor { type_name: &'static str },

    #[error("field {field} mapped to member '{member}' was not found")]
    MissingField {
        member: String,
        field: String,
        row: Option<u64>,
    },

    #[error("no members are mapped for type '{type_name}'")]
    NoMappableMembers { type_name: &'static str },

    #[error("no creation strategy can create type '{type_name}'")]
    UnresolvedType { type_name: &'static str },

    #[error("member '{member}' expects {expected} but the converter produced {found}")]
    ValueMismatch {
        member: String,
        expected: FieldKind,
        found: &'static str,
    },
}

impl RowcastError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Conversion(_) => ErrorClass::Conversion,
            Self::ConstructorArity { .. }
            | Self::MissingConstructor { .. }
            | Self::NoMappableMembers { .. } => ErrorClass::Configuration,
            Self::CreatorMismatch { .. } | Self::ValueMismatch { .. } => {
                ErrorClass::InvariantViolation
            }
            Self::MissingField { .. } => ErrorClass::MissingData,
            Self::UnresolvedType { .. } => ErrorClass::Unsupported,
        }
    }

    /// Borrow the conversion failure, if that is what this is.
    #[must_use]
    pub const fn as_conversion(&self) -> Option<&ConversionError> {
        match self {
            Self::Conversion(err) => Some(err),
            _ => None,
        }
    }
}

///
/// ErrorClass
///
/// Coarse classification used by callers deciding whether to skip a row
/// or abort the read.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum ErrorClass {
    Configuration,
    Conversion,
    InvariantViolation,
    MissingData,
    Unsupported,
}

impl ErrorClass {
    /// Row-local failures; the next row may still succeed.
    #[must_use]
    pub const fn is_row_local(self) -> bool {
        matches!(self, Self::Conversion | Self::MissingData)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration",
            Self::Conversion => "conversion",
            Self::InvariantViolation => "invariant_violation",
            Self::MissingData => "missing_data",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ConversionError
///
/// Raised when a converter cannot turn field text into the declared kind
/// and no usable default is configured.
///
/// `text` already holds the redaction placeholder when raw data must not
/// leak into diagnostics.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConversionError {
    pub text: String,
    pub member: String,
    pub kind: FieldKind,
    pub converter: &'static str,
    pub field_index: Option<usize>,
    pub row: Option<u64>,
}

impl ConversionError {
    /// Build the failure for `text`, honouring the binding's redaction setting.
    #[must_use]
    pub fn new(converter: &'static str, text: &str, data: &BindingData) -> Self {
        let text = if data.options.redacts_raw_data() {
            REDACTED_TEXT.to_string()
        } else {
            text.to_string()
        };

        Self {
            text,
            member: data.name.clone(),
            kind: data.kind.clone(),
            converter,
            field_index: None,
            row: None,
        }
    }

    /// Attach the row position the failing text was read from.
    #[must_use]
    pub fn at(mut self, field_index: usize, row: Option<u64>) -> Self {
        self.field_index = Some(field_index);
        self.row = row;
        self
    }

    /// Attach only the row number, for fields absent from the row.
    #[must_use]
    pub fn at_row(mut self, row: Option<u64>) -> Self {
        self.row = row;
        self
    }

    #[must_use]
    pub fn is_redacted(&self) -> bool {
        self.text == REDACTED_TEXT
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The conversion cannot be performed.")?;
        writeln!(f, "    Text: '{}'", self.text)?;
        writeln!(f, "    MemberName: {}", self.member)?;
        writeln!(f, "    MemberType: {}", self.kind)?;
        write!(f, "    TypeConverter: '{}'", self.converter)?;

        if let Some(index) = self.field_index {
            write!(f, "\n    Field: {index}")?;
        }
        if let Some(row) = self.row {
            write!(f, "\n    Row: {row}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ConversionError {}

///
/// InsufficientCapacity
///
/// The fast formatting path ran out of destination space.
/// Callers retry through the allocating path.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
#[error("destination buffer of {capacity} bytes is too small for the formatted value")]
pub struct InsufficientCapacity {
    pub capacity: usize,
}
