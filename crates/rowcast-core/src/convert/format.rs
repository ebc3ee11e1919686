use crate::{
    convert::options::{ConversionOptions, Culture},
    error::InsufficientCapacity,
    value::Value,
};
use std::{
    fmt::{self, Write as _},
    io,
};
use time::{
    Date, PrimitiveDateTime,
    format_description::{self, BorrowedFormatItem},
    macros::format_description,
};

pub(crate) const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
pub(crate) const DATE_TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
);

///
/// NumberFormat
///
/// Parsed numeric format string.
///
/// G     → natural representation
/// D[n]  → integer, zero-padded to n digits
/// X[n]  → hexadecimal (x for lowercase), zero-padded to n digits
/// F[n]  → fixed point with n decimals (default 2)
/// N[n]  → fixed point with group separators (default 2)
/// E[n]  → scientific, floats only (default 6)
///
/// Anything else formats naturally.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum NumberFormat {
    Exponent(usize),
    Fixed(usize),
    General,
    Grouped(usize),
    Hex { upper: bool, width: usize },
    Padded(usize),
}

impl NumberFormat {
    pub(crate) fn parse(format: Option<&str>) -> Self {
        let Some(pattern) = format.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::General;
        };

        let mut chars = pattern.chars();
        let Some(head) = chars.next() else {
            return Self::General;
        };
        let rest = chars.as_str();
        let precision = if rest.is_empty() {
            None
        } else {
            match rest.parse::<usize>() {
                Ok(n) => Some(n),
                Err(_) => return Self::General,
            }
        };

        match head {
            'D' | 'd' => Self::Padded(precision.unwrap_or(0)),
            'X' => Self::Hex {
                upper: true,
                width: precision.unwrap_or(0),
            },
            'x' => Self::Hex {
                upper: false,
                width: precision.unwrap_or(0),
            },
            'F' | 'f' => Self::Fixed(precision.unwrap_or(2)),
            'N' | 'n' => Self::Grouped(precision.unwrap_or(2)),
            'E' | 'e' => Self::Exponent(precision.unwrap_or(6)),
            _ => Self::General,
        }
    }
}

///
/// WRITING
///

/// Format `value` into a fresh string.
pub(crate) fn to_text(value: &Value, options: &ConversionOptions) -> String {
    let mut out = String::new();
    // writing into a String cannot fail; a formatting error leaves what was written
    let _ = write_value(&mut out, value, options);
    out
}

/// Format `value` into `destination`, returning the byte count written.
pub(crate) fn format_into(
    destination: &mut [u8],
    value: &Value,
    options: &ConversionOptions,
) -> Result<usize, InsufficientCapacity> {
    let capacity = destination.len();
    let mut writer = SliceWriter::new(destination);

    write_value(&mut writer, value, options)
        .map(|()| writer.len)
        .map_err(|_| InsufficientCapacity { capacity })
}

/// Copy already formatted text into `destination`.
pub(crate) fn copy_into(text: &str, destination: &mut [u8]) -> Result<usize, InsufficientCapacity> {
    let capacity = destination.len();
    let Some(slot) = destination.get_mut(..text.len()) else {
        return Err(InsufficientCapacity { capacity });
    };
    slot.copy_from_slice(text.as_bytes());

    Ok(text.len())
}

/// Single formatting routine behind both the allocating and the fast path.
pub(crate) fn write_value(
    out: &mut dyn fmt::Write,
    value: &Value,
    options: &ConversionOptions,
) -> fmt::Result {
    let format = NumberFormat::parse(options.first_format());
    let culture = options.culture();

    match value {
        Value::Null => out.write_str(options.first_null_value().unwrap_or_default()),
        Value::Bool(v) => write_bool(out, *v, options),
        Value::Char(v) => out.write_char(*v),
        Value::Text(v) => out.write_str(v),
        Value::Ulid(v) => write!(out, "{v}"),
        Value::Opaque(v) => out.write_str(v.type_name()),
        Value::Date(v) => write_date(out, *v, options.first_format()),
        Value::DateTime(v) => write_date_time(out, *v, options.first_format()),
        Value::Decimal(v) => write_fractional(out, v, format, culture, false),
        Value::Float32(v) => write_fractional(out, v, format, culture, v.is_finite()),
        Value::Float64(v) => write_fractional(out, v, format, culture, v.is_finite()),
        Value::Int8(v) => write_integer(out, v, *v < 0, format, culture),
        Value::Int16(v) => write_integer(out, v, *v < 0, format, culture),
        Value::Int32(v) => write_integer(out, v, *v < 0, format, culture),
        Value::Int64(v) => write_integer(out, v, *v < 0, format, culture),
        Value::Int128(v) => write_integer(out, v, *v < 0, format, culture),
        Value::IntBig(v) => {
            write_integer(out, v, v.sign() == num_bigint::Sign::Minus, format, culture)
        }
        Value::Uint8(v) => write_integer(out, v, false, format, culture),
        Value::Uint16(v) => write_integer(out, v, false, format, culture),
        Value::Uint32(v) => write_integer(out, v, false, format, culture),
        Value::Uint64(v) => write_integer(out, v, false, format, culture),
        Value::Uint128(v) => write_integer(out, v, false, format, culture),
    }
}

fn write_bool(out: &mut dyn fmt::Write, value: bool, options: &ConversionOptions) -> fmt::Result {
    let tokens = if value {
        &options.true_values
    } else {
        &options.false_values
    };

    match tokens.first() {
        Some(token) => out.write_str(token),
        None => out.write_str(if value { "true" } else { "false" }),
    }
}

fn write_integer<T>(
    out: &mut dyn fmt::Write,
    value: &T,
    negative: bool,
    format: NumberFormat,
    culture: &Culture,
) -> fmt::Result
where
    T: fmt::Display + fmt::UpperHex + fmt::LowerHex,
{
    match format {
        NumberFormat::Padded(width) => {
            write!(out, "{value:0width$}", width = width + usize::from(negative))
        }
        NumberFormat::Hex { upper: true, width } => write!(out, "{value:0width$X}"),
        NumberFormat::Hex { upper: false, width } => write!(out, "{value:0width$x}"),
        NumberFormat::Fixed(decimals) => {
            write!(out, "{value}")?;
            write_zero_fraction(out, decimals, culture)
        }
        NumberFormat::Grouped(decimals) => {
            let digits = count_integer_digits(|w| write!(w, "{value}"));
            write!(CultureWriter::grouped(out, culture, digits), "{value}")?;
            write_zero_fraction(out, decimals, culture)
        }
        NumberFormat::Exponent(_) | NumberFormat::General => write!(out, "{value}"),
    }
}

fn write_zero_fraction(
    out: &mut dyn fmt::Write,
    decimals: usize,
    culture: &Culture,
) -> fmt::Result {
    if decimals == 0 {
        return Ok(());
    }
    out.write_char(culture.decimal_separator)?;
    for _ in 0..decimals {
        out.write_char('0')?;
    }

    Ok(())
}

/// Shared by floats and decimals. `scientific` gates the E format, which
/// decimals and non-finite floats render naturally.
fn write_fractional<T>(
    out: &mut dyn fmt::Write,
    value: &T,
    format: NumberFormat,
    culture: &Culture,
    scientific: bool,
) -> fmt::Result
where
    T: fmt::Display + FormatExp,
{
    match format {
        NumberFormat::Fixed(decimals) => {
            write!(CultureWriter::plain(out, culture), "{value:.decimals$}")
        }
        NumberFormat::Grouped(decimals) => {
            let digits = count_integer_digits(|w| write!(w, "{value:.decimals$}"));
            write!(CultureWriter::grouped(out, culture, digits), "{value:.decimals$}")
        }
        NumberFormat::Exponent(decimals) if scientific => {
            value.write_exp(&mut CultureWriter::plain(out, culture), decimals)
        }
        _ => write!(CultureWriter::plain(out, culture), "{value}"),
    }
}

///
/// FormatExp
///
/// Scientific notation, implemented only where std provides it.
///

pub(crate) trait FormatExp {
    fn write_exp(&self, out: &mut dyn fmt::Write, decimals: usize) -> fmt::Result;
}

impl FormatExp for f32 {
    fn write_exp(&self, out: &mut dyn fmt::Write, decimals: usize) -> fmt::Result {
        write!(out, "{self:.decimals$E}")
    }
}

impl FormatExp for f64 {
    fn write_exp(&self, out: &mut dyn fmt::Write, decimals: usize) -> fmt::Result {
        write!(out, "{self:.decimals$E}")
    }
}

impl FormatExp for rust_decimal::Decimal {
    fn write_exp(&self, out: &mut dyn fmt::Write, _decimals: usize) -> fmt::Result {
        write!(out, "{self}")
    }
}

///
/// TEMPORAL
///

fn write_date(out: &mut dyn fmt::Write, value: Date, format: Option<&str>) -> fmt::Result {
    let mut sink = FmtSink(out);
    let written = match format.and_then(|f| format_description::parse(f).ok()) {
        Some(items) => value.format_into(&mut sink, items.as_slice()),
        None => value.format_into(&mut sink, DATE_FORMAT),
    };

    written.map(drop).map_err(|_| fmt::Error)
}

fn write_date_time(
    out: &mut dyn fmt::Write,
    value: PrimitiveDateTime,
    format: Option<&str>,
) -> fmt::Result {
    let mut sink = FmtSink(out);
    let written = match format.and_then(|f| format_description::parse(f).ok()) {
        Some(items) => value.format_into(&mut sink, items.as_slice()),
        None => value.format_into(&mut sink, DATE_TIME_FORMAT),
    };

    written.map(drop).map_err(|_| fmt::Error)
}

///
/// SliceWriter
///
/// `fmt::Write` over a caller-owned byte slice. Overflow is a `fmt::Error`.
///

pub(crate) struct SliceWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SliceWriter<'a> {
    pub(crate) const fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }
}

impl fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        let slot = self.buf.get_mut(self.len..end).ok_or(fmt::Error)?;
        slot.copy_from_slice(s.as_bytes());
        self.len = end;

        Ok(())
    }
}

///
/// CultureWriter
///
/// Rewrites std's invariant number text: `.` becomes the culture's decimal
/// separator and, when grouping, integer digits get group separators.
///

struct CultureWriter<'a> {
    out: &'a mut dyn fmt::Write,
    decimal_separator: char,
    group_separator: Option<char>,
    remaining_digits: usize,
    in_fraction: bool,
}

impl<'a> CultureWriter<'a> {
    fn plain(out: &'a mut dyn fmt::Write, culture: &Culture) -> Self {
        Self {
            out,
            decimal_separator: culture.decimal_separator,
            group_separator: None,
            remaining_digits: 0,
            in_fraction: false,
        }
    }

    fn grouped(out: &'a mut dyn fmt::Write, culture: &Culture, integer_digits: usize) -> Self {
        Self {
            group_separator: Some(culture.group_separator),
            remaining_digits: integer_digits,
            ..Self::plain(out, culture)
        }
    }
}

impl fmt::Write for CultureWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.group_separator.is_none() && self.decimal_separator == '.' {
            return self.out.write_str(s);
        }

        for ch in s.chars() {
            match ch {
                '.' if !self.in_fraction => {
                    self.in_fraction = true;
                    self.out.write_char(self.decimal_separator)?;
                }
                'e' | 'E' => {
                    self.in_fraction = true;
                    self.out.write_char(ch)?;
                }
                '0'..='9' if !self.in_fraction => {
                    self.out.write_char(ch)?;
                    if let Some(separator) = self.group_separator {
                        self.remaining_digits = self.remaining_digits.saturating_sub(1);
                        if self.remaining_digits > 0 && self.remaining_digits % 3 == 0 {
                            self.out.write_char(separator)?;
                        }
                    }
                }
                _ => self.out.write_char(ch)?,
            }
        }

        Ok(())
    }
}

/// Count integer-part digits of what `render` writes, without allocating.
fn count_integer_digits(render: impl FnOnce(&mut DigitCounter) -> fmt::Result) -> usize {
    let mut counter = DigitCounter::default();
    let _ = render(&mut counter);
    counter.digits
}

#[derive(Default)]
struct DigitCounter {
    digits: usize,
    done: bool,
}

impl fmt::Write for DigitCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.done {
                break;
            }
            match ch {
                '0'..='9' => self.digits += 1,
                '.' | 'e' | 'E' => self.done = true,
                _ => {}
            }
        }

        Ok(())
    }
}

///
/// FmtSink
///
/// Adapts `fmt::Write` to the `io::Write` that `time` formats into.
///

struct FmtSink<'a>(&'a mut dyn fmt::Write);

impl io::Write for FmtSink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = std::str::from_utf8(buf).map_err(io::Error::other)?;
        self.0
            .write_str(text)
            .map_err(|_| io::Error::from(io::ErrorKind::WriteZero))?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
