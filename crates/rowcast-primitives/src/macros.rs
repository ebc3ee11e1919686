#[macro_export]
macro_rules! scalar_kind_registry_entries {
    ($macro:ident $(, @args $($args:tt)+ )?) => {
        $macro! {
            $(
                @args $($args)+;
            )?
            @entries
            (Bool, Bool, type_name = "bool"),
            (Char, Text, type_name = "char"),
            (Date, Temporal, type_name = "Date"),
            (DateTime, Temporal, type_name = "PrimitiveDateTime"),
            (Decimal, Decimal, type_name = "Decimal"),
            (Float32, Float, type_name = "f32"),
            (Float64, Float, type_name = "f64"),
            (Int8, Integer, type_name = "i8"),
            (Int16, Integer, type_name = "i16"),
            (Int32, Integer, type_name = "i32"),
            (Int64, Integer, type_name = "i64"),
            (Int128, Integer, type_name = "i128"),
            (IntBig, Integer, type_name = "BigInt"),
            (Text, Text, type_name = "String"),
            (Uint8, Integer, type_name = "u8"),
            (Uint16, Integer, type_name = "u16"),
            (Uint32, Integer, type_name = "u32"),
            (Uint64, Integer, type_name = "u64"),
            (Uint128, Integer, type_name = "u128"),
            (Ulid, Identifier, type_name = "Ulid"),
        }
    };
}

#[macro_export]
macro_rules! scalar_kind_registry {
    ($macro:ident) => {
        $crate::scalar_kind_registry_entries!($macro)
    };
    ($macro:ident, $($args:tt)+) => {
        $crate::scalar_kind_registry_entries!($macro, @args $($args)+)
    };
}

macro_rules! metadata_from_registry {
    (
        @args $kind:expr;
        @entries $( ($scalar:ident, $family:ident, type_name = $type_name:expr) ),* $(,)?
    ) => {
        match $kind {
            $(
                $crate::ScalarKind::$scalar => $crate::ScalarMetadata {
                    family: $crate::ScalarFamily::$family,
                    type_name: $type_name,
                },
            )*
        }
    };
}

macro_rules! all_kinds_from_registry {
    (
        @entries $( ($scalar:ident, $family:ident, type_name = $type_name:expr) ),* $(,)?
    ) => {
        [ $( $crate::ScalarKind::$scalar ),* ]
    };
}
