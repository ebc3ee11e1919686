mod binding;
mod kind;
mod record_map;

pub use binding::{BindingData, FieldLocator};
pub use kind::FieldKind;
pub use record_map::{
    Arguments, AutoMap, MemberBinding, ParameterBinding, RecordMap, RecordMapRegistry,
};

pub(crate) use record_map::{Constructor, Factory, Getter, Setter};
