use crate::{convert::ConverterHandle, model::BindingData, value::Value};
use std::sync::Arc;
use tracing::trace;

///
/// ReaderRow
///
/// Field access supplied by the tokenizer side. `field` borrows for the
/// fast path; `get_field` allocates.
///

pub trait ReaderRow {
    fn column_count(&self) -> usize;

    fn header_record(&self) -> Option<&[String]>;

    fn field(&self, index: usize) -> Option<&str>;

    fn get_field(&self, index: usize) -> Option<String> {
        self.field(index).map(str::to_string)
    }

    /// Index of the `occurrence`-th header equal to `name`.
    fn field_index(&self, name: &str, occurrence: usize) -> Option<usize> {
        self.header_record()?
            .iter()
            .enumerate()
            .filter(|(_, header)| header.as_str() == name)
            .nth(occurrence)
            .map(|(index, _)| index)
    }

    /// One-based row number, when the source tracks it.
    fn row_number(&self) -> Option<u64> {
        None
    }
}

///
/// StringRow
///
/// In-memory row over owned fields. The header is shared between rows.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StringRow {
    header: Option<Arc<[String]>>,
    fields: Vec<String>,
    row_number: Option<u64>,
}

impl StringRow {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: None,
            fields: fields.into_iter().map(Into::into).collect(),
            row_number: None,
        }
    }

    #[must_use]
    pub fn with_header<I, S>(self, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_shared_header(header.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn with_shared_header(mut self, header: Arc<[String]>) -> Self {
        self.header = Some(header);
        self
    }

    #[must_use]
    pub fn at_row(mut self, row_number: u64) -> Self {
        self.row_number = Some(row_number);
        self
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl ReaderRow for StringRow {
    fn column_count(&self) -> usize {
        self.fields.len()
    }

    fn header_record(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    fn row_number(&self) -> Option<u64> {
        self.row_number
    }
}

///
/// WriterRow
///
/// Output fields accumulated in one buffer, plus the scratch space used by
/// the fast formatting path.
///

#[derive(Clone, Debug, Default)]
pub struct WriterRow {
    buffer: String,
    ends: Vec<usize>,
    scratch: Vec<u8>,
}

impl WriterRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(format_buffer_capacity: usize) -> Self {
        Self {
            buffer: String::new(),
            ends: Vec::new(),
            scratch: vec![0; format_buffer_capacity],
        }
    }

    pub fn push_field(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.ends.push(self.buffer.len());
    }

    /// Format `value` through `converter`, preferring the fast path.
    /// Returns whether the fast path produced the field.
    /// A reported length beyond the scratch buffer or text that is not UTF-8
    /// falls back to `write`.
    pub fn push_value(
        &mut self,
        converter: &ConverterHandle,
        value: &Value,
        data: &BindingData,
    ) -> bool {
        if converter.capabilities().span_format {
            match converter.write_into(value, &mut self.scratch, data) {
                Ok(written) => {
                    let text = self
                        .scratch
                        .get(..written)
                        .and_then(|bytes| std::str::from_utf8(bytes).ok());
                    if let Some(text) = text {
                        self.buffer.push_str(text);
                        self.ends.push(self.buffer.len());
                        return true;
                    }
                    trace!(member = %data.name, written, "fast format result rejected");
                }
                Err(err) => {
                    trace!(member = %data.name, capacity = err.capacity, "fast format overflowed");
                }
            }
        }

        let text = converter.write(value, data);
        self.push_field(&text);

        false
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        let end = *self.ends.get(index)?;
        let start = match index {
            0 => 0,
            _ => self.ends[index - 1],
        };

        self.buffer.get(start..end)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        (0..self.len()).filter_map(|index| self.get(index))
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }

    /// Clear the fields, keeping allocations for the next row.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.ends.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        convert::{ConverterCapabilities, TypeConverter},
        error::{ConversionError, InsufficientCapacity},
        model::FieldKind,
    };
    use rowcast_primitives::ScalarKind;

    // ---- helpers -----------------------------------------------------------

    /// Claims to have written more bytes than it was given.
    struct Overclaiming;

    impl TypeConverter for Overclaiming {
        fn name(&self) -> &'static str {
            "Overclaiming"
        }

        fn capabilities(&self) -> ConverterCapabilities {
            ConverterCapabilities::SPAN
        }

        fn convert_from_string(
            &self,
            _text: Option<&str>,
            _data: &BindingData,
        ) -> Result<Value, ConversionError> {
            Ok(Value::Int32(0))
        }

        fn convert_to_string(&self, _value: &Value, _data: &BindingData) -> String {
            "slow".to_string()
        }

        fn try_format(
            &self,
            _value: &Value,
            destination: &mut [u8],
            _data: &BindingData,
        ) -> Result<usize, InsufficientCapacity> {
            Ok(destination.len() + 8)
        }
    }

    // ---- tests -------------------------------------------------------------

    #[test]
    fn duplicate_headers_resolve_by_occurrence() {
        let row = StringRow::new(["1", "2", "3"]).with_header(["a", "b", "a"]);

        assert_eq!(row.field_index("a", 0), Some(0));
        assert_eq!(row.field_index("a", 1), Some(2));
        assert_eq!(row.field_index("c", 0), None);
    }

    #[test]
    fn headerless_rows_have_no_named_fields() {
        let row = StringRow::new(["1"]).at_row(4);

        assert_eq!(row.field_index("a", 0), None);
        assert_eq!(row.row_number(), Some(4));
        assert_eq!(row.get_field(0), Some("1".to_string()));
        assert_eq!(row.field(1), None);
    }

    #[test]
    fn writer_row_keeps_field_boundaries() {
        let mut row = WriterRow::new();
        row.push_field("a");
        row.push_field("");
        row.push_field("ccc");

        assert_eq!(row.len(), 3);
        assert_eq!(row.to_vec(), vec!["a", "", "ccc"]);

        row.clear();
        assert!(row.is_empty());
        assert_eq!(row.get(0), None);
    }

    #[test]
    fn overstated_fast_format_length_falls_back_to_write() {
        let converter = ConverterHandle::from_converter(Overclaiming);
        let data = BindingData::new("Amount", FieldKind::Scalar(ScalarKind::Int32));
        let mut row = WriterRow::with_capacity(4);

        assert!(!row.push_value(&converter, &Value::Int32(7), &data));
        assert_eq!(row.to_vec(), vec!["slow"]);
    }
}
