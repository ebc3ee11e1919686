use crate::{
    convert::ConverterHandle,
    create::{CreatorEnv, RecordCreator},
    error::RowcastError,
    model::{Arguments, BindingData, Constructor, Factory, Getter, RecordMap, Setter},
    row::{ReaderRow, WriterRow},
    value::Value,
};
use std::fmt;
use tracing::debug;

///
/// BoundField
///
/// A binding with its converter resolved and options merged, ready to be
/// read from rows.
///

#[derive(Clone, Debug)]
pub struct BoundField {
    data: BindingData,
    converter: ConverterHandle,
    missing_allowed: bool,
}

impl BoundField {
    pub(crate) fn new(data: BindingData, converter: ConverterHandle, ignore_missing: bool) -> Self {
        let missing_allowed = data.optional || ignore_missing;

        Self {
            data,
            converter,
            missing_allowed,
        }
    }

    #[must_use]
    pub const fn data(&self) -> &BindingData {
        &self.data
    }

    #[must_use]
    pub const fn converter(&self) -> &ConverterHandle {
        &self.converter
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Read this binding's value from `row`.
    ///
    /// A constant wins outright. A missing field yields the default (or the
    /// converter's reading of absent text) when missing fields are allowed.
    /// Empty text yields the default when one is set and fits the kind;
    /// a default of another kind leaves the text to the converter.
    pub fn read(&self, row: &dyn ReaderRow) -> Result<Value, RowcastError> {
        let data = &self.data;
        if let Some(constant) = &data.constant {
            return Ok(constant.clone());
        }

        let Some(index) = data
            .locator
            .resolve(row)
            .filter(|index| *index < row.column_count())
        else {
            return self.read_missing(row);
        };

        let converted = if self.converter.capabilities().span_parse {
            let text = row.field(index);
            if let Some(default) = self.default_for(text) {
                return Ok(default);
            }
            self.converter.read(text, data)
        } else {
            let text = row.get_field(index);
            if let Some(default) = self.default_for(text.as_deref()) {
                return Ok(default);
            }
            self.converter.read(text.as_deref(), data)
        };

        converted.map_err(|err| err.at(index, row.row_number()).into())
    }

    fn read_missing(&self, row: &dyn ReaderRow) -> Result<Value, RowcastError> {
        if !self.missing_allowed {
            return Err(RowcastError::MissingField {
                member: self.data.name.clone(),
                field: self.data.locator.describe(),
                row: row.row_number(),
            });
        }

        match self.usable_default() {
            Some(default) => Ok(default),
            None => self
                .converter
                .read(None, &self.data)
                .map_err(|err| err.at_row(row.row_number()).into()),
        }
    }

    fn default_for(&self, text: Option<&str>) -> Option<Value> {
        if text.is_none_or(str::is_empty) {
            self.usable_default()
        } else {
            None
        }
    }

    /// The configured default, if it is a legal value of the binding's kind.
    fn usable_default(&self) -> Option<Value> {
        self.data
            .default
            .as_ref()
            .filter(|default| self.data.kind.accepts(default))
            .cloned()
    }

    /// Append `value` to `out` as text.
    pub fn write(&self, value: &Value, out: &mut WriterRow) {
        out.push_value(&self.converter, value, &self.data);
    }
}

///
/// ReadPlan
///
/// Compiled row → `T` plan: a precomputed binding list interpreted per row.
///

pub struct ReadPlan<T> {
    type_name: &'static str,
    body: ReadBody<T>,
}

enum ReadBody<T> {
    Constructor {
        arguments: Vec<BoundField>,
        construct: Constructor<T>,
    },
    Members {
        assignments: Vec<Assignment<T>>,
        factory: Factory<T>,
    },
}

struct Assignment<T> {
    field: BoundField,
    setter: Setter<T>,
}

impl<T> ReadPlan<T> {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub const fn uses_constructor(&self) -> bool {
        matches!(self.body, ReadBody::Constructor { .. })
    }

    /// Bound fields in evaluation order.
    pub fn fields(&self) -> impl Iterator<Item = &BoundField> {
        let (arguments, assignments) = match &self.body {
            ReadBody::Constructor { arguments, .. } => (arguments.as_slice(), &[][..]),
            ReadBody::Members { assignments, .. } => (&[][..], assignments.as_slice()),
        };

        arguments
            .iter()
            .chain(assignments.iter().map(|assignment| &assignment.field))
    }
}

impl<T> RecordCreator<T> for ReadPlan<T> {
    fn create_record(&self, row: &dyn ReaderRow) -> Result<T, RowcastError> {
        match &self.body {
            ReadBody::Constructor {
                arguments,
                construct,
            } => {
                let values = arguments
                    .iter()
                    .map(|field| Ok((field.name(), field.read(row)?)))
                    .collect::<Result<Vec<_>, RowcastError>>()?;
                let mut args = Arguments::new(self.type_name, values);
                let record = construct(&mut args)?;
                args.finish()?;

                Ok(record)
            }
            ReadBody::Members {
                assignments,
                factory,
            } => {
                let mut record = factory();
                for assignment in assignments {
                    let value = assignment.field.read(row)?;
                    (assignment.setter)(&mut record, value).map_err(|found| {
                        RowcastError::ValueMismatch {
                            member: assignment.field.name().to_string(),
                            expected: assignment.field.data().kind.clone(),
                            found: found.kind_label(),
                        }
                    })?;
                }

                Ok(record)
            }
        }
    }
}

impl<T> fmt::Debug for ReadPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadPlan")
            .field("type_name", &self.type_name)
            .field("constructor", &self.uses_constructor())
            .field("fields", &self.fields().map(BoundField::name).collect::<Vec<_>>())
            .finish()
    }
}

///
/// WritePlan
///
/// Compiled `&T` → text plan over the member getters, in member order.
///

pub struct WritePlan<T> {
    type_name: &'static str,
    header: Vec<String>,
    fields: Vec<(BoundField, Getter<T>)>,
}

impl<T> WritePlan<T> {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn write_header(&self, out: &mut WriterRow) {
        for name in &self.header {
            out.push_field(name);
        }
    }

    pub fn write_record(&self, record: &T, out: &mut WriterRow) {
        for (field, get) in &self.fields {
            match &field.data().constant {
                Some(constant) => field.write(constant, out),
                None => field.write(&get(record), out),
            }
        }
    }
}

impl<T> fmt::Debug for WritePlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WritePlan")
            .field("type_name", &self.type_name)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

///
/// PlanCompiler
///
/// Turns a mapping descriptor into read and write plans, resolving every
/// converter and option set once.
///

pub struct PlanCompiler<'e, 'a> {
    env: &'e mut CreatorEnv<'a>,
}

impl<'e, 'a> PlanCompiler<'e, 'a> {
    pub const fn new(env: &'e mut CreatorEnv<'a>) -> Self {
        Self { env }
    }

    /// Any parameter binding selects constructor creation, even when
    /// members are also mapped.
    pub fn compile_reader<T: 'static>(
        &mut self,
        map: &RecordMap<T>,
    ) -> Result<ReadPlan<T>, RowcastError> {
        let type_name = map.type_name();

        if !map.parameters().is_empty() {
            let construct = map
                .constructor_fn()
                .cloned()
                .ok_or(RowcastError::MissingConstructor { type_name })?;
            let arguments: Vec<_> = map
                .parameters()
                .iter()
                .map(|parameter| self.env.bind(&parameter.data))
                .collect();

            debug!(record = type_name, parameters = arguments.len(), "compiled constructor plan");

            return Ok(ReadPlan {
                type_name,
                body: ReadBody::Constructor {
                    arguments,
                    construct,
                },
            });
        }

        let assignments: Vec<_> = map
            .members()
            .iter()
            .filter(|member| !member.data.ignored)
            .filter_map(|member| {
                member.setter().map(|setter| Assignment {
                    field: self.env.bind(&member.data),
                    setter: setter.clone(),
                })
            })
            .collect();

        if assignments.is_empty() {
            return Err(RowcastError::NoMappableMembers { type_name });
        }

        let factory = map
            .factory_fn()
            .cloned()
            .ok_or(RowcastError::MissingConstructor { type_name })?;

        debug!(record = type_name, members = assignments.len(), "compiled member plan");

        Ok(ReadPlan {
            type_name,
            body: ReadBody::Members {
                assignments,
                factory,
            },
        })
    }

    /// Parameter bindings play no part in writing.
    pub fn compile_writer<T: 'static>(
        &mut self,
        map: &RecordMap<T>,
    ) -> Result<WritePlan<T>, RowcastError> {
        let type_name = map.type_name();

        let fields: Vec<_> = map
            .members()
            .iter()
            .filter(|member| !member.data.ignored)
            .filter_map(|member| {
                member
                    .getter()
                    .map(|getter| (self.env.bind(&member.data), getter.clone()))
            })
            .collect();

        if fields.is_empty() {
            return Err(RowcastError::NoMappableMembers { type_name });
        }

        let header = fields
            .iter()
            .map(|(field, _)| field.data().header_name().to_string())
            .collect();

        debug!(record = type_name, fields = fields.len(), "compiled write plan");

        Ok(WritePlan {
            type_name,
            header,
            fields,
        })
    }
}
