use crate::{create::RecordCreator, error::RowcastError, row::ReaderRow};
use derive_more::Deref;
use indexmap::IndexMap;

///
/// DynamicRecord
///
/// Untyped record: field name → raw text, in column order.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct DynamicRecord(IndexMap<String, String>);

impl DynamicRecord {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn into_inner(self) -> IndexMap<String, String> {
        self.0
    }
}

impl FromIterator<(String, String)> for DynamicRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// DynamicCreator
///
/// Keys come from the header when one is in use (the first of duplicate
/// headers wins), otherwise `Field1..FieldN`.
///

pub(crate) struct DynamicCreator {
    use_header: bool,
}

impl DynamicCreator {
    pub(crate) const fn new(use_header: bool) -> Self {
        Self { use_header }
    }
}

impl RecordCreator<DynamicRecord> for DynamicCreator {
    fn create_record(&self, row: &dyn ReaderRow) -> Result<DynamicRecord, RowcastError> {
        let mut fields = IndexMap::with_capacity(row.column_count());
        let text = |index: usize| row.field(index).unwrap_or_default().to_string();

        match row.header_record().filter(|_| self.use_header) {
            Some(header) => {
                for (index, name) in header.iter().enumerate().take(row.column_count()) {
                    fields.entry(name.clone()).or_insert_with(|| text(index));
                }
            }
            None => {
                for index in 0..row.column_count() {
                    fields.insert(format!("Field{}", index + 1), text(index));
                }
            }
        }

        Ok(DynamicRecord(fields))
    }
}
