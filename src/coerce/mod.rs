//! Cell value coercion.
//!
//! A cell arrives as raw text plus the kind of encoding the workbook used
//! for it; the column it sits in declares what the output must look like.
//! [`CoercionEngine::coerce`] maps every `(CellKind, ColumnType)` pair through
//! a rule table, so each combination is a separate function that can be
//! tested on its own.
//!
//! | kind \ expected      | decimal          | datetime              | boolean         | string          |
//! |----------------------|------------------|-----------------------|-----------------|-----------------|
//! | number               | fixed-point      | instant if date style | 0 → `FALSE`     | fixed-point     |
//! | shared/inline string | parse, fixed     | ISO local date        | `T`/`1`/`Y` rule| verbatim        |
//! | boolean              | `1`/`0`          | unsupported           | `TRUE`/`FALSE`  | `TRUE`/`FALSE`  |
//! | error                | `**ERR**`        | `**ERR**`             | `**ERR**`       | `**ERR**`       |
//! | formula              | formula text     | formula text          | formula text    | formula text    |

pub mod date;
pub mod number;

use std::fmt;

use chrono_tz::Tz;

use crate::column::ColumnType;
use crate::error::{ConvertError, Result};
use crate::format::NumberFormatMeta;
use crate::lookup::SharedStringLookup;

pub use date::DateSystem;

/// Output for cells stored as errors, whatever the column type.
pub const ERROR_MARKER: &str = "**ERR**";

/// How a cell's raw value is encoded in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellKind {
    /// Number (no `t` attribute, or `t="n"`)
    #[default]
    Number,
    /// Boolean (`t="b"`)
    Boolean,
    /// Error code (`t="e"`)
    Error,
    /// Formula source text
    Formula,
    /// Inline text (`t="inlineStr"` or `t="str"`)
    InlineString,
    /// Index into the shared strings table (`t="s"`)
    SstString,
}

impl CellKind {
    /// Kind named by a cell's `t` attribute.
    pub fn from_type_attr(attr: Option<&str>) -> Self {
        match attr {
            Some("b") => CellKind::Boolean,
            Some("e") => CellKind::Error,
            Some("inlineStr") | Some("str") => CellKind::InlineString,
            Some("s") => CellKind::SstString,
            _ => CellKind::Number,
        }
    }

    /// Lower-case name used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Number => "number",
            CellKind::Boolean => "boolean",
            CellKind::Error => "error",
            CellKind::Formula => "formula",
            CellKind::InlineString => "inline string",
            CellKind::SstString => "shared string",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw value of one cell as it reached the end of its value element.
#[derive(Debug, Clone, Copy)]
pub struct RawCell<'a> {
    /// Value text (a shared string index for `SstString`)
    pub text: &'a str,
    /// Number format of the cell's style, for `Number` cells
    pub format: Option<&'a NumberFormatMeta>,
}

impl<'a> RawCell<'a> {
    /// Create a raw cell value without format metadata.
    pub fn new(text: &'a str) -> Self {
        Self { text, format: None }
    }

    /// Attach the number format resolved from the cell's style.
    pub fn with_format(mut self, format: Option<&'a NumberFormatMeta>) -> Self {
        self.format = format;
        self
    }
}

type Rule = fn(&CoercionEngine<'_>, &RawCell<'_>) -> Result<String>;

/// Rules indexed by `[CellKind as usize][ColumnType as usize]`.
///
/// Column order: decimal, datetime, boolean, string.
const RULES: [[Rule; 4]; 6] = [
    // Number
    [number_as_decimal, number_as_datetime, number_as_boolean, number_as_decimal],
    // Boolean
    [boolean_as_digit, boolean_as_datetime, boolean_as_word, boolean_as_word],
    // Error
    [error_marker, error_marker, error_marker, error_marker],
    // Formula
    [formula_text, formula_text, formula_text, formula_text],
    // InlineString
    [text_as_decimal, text_as_datetime, text_as_boolean, text_verbatim],
    // SstString
    [
        shared_as_decimal,
        shared_as_datetime,
        shared_as_boolean,
        shared_verbatim,
    ],
];

/// Pure mapping from a raw cell to its output text.
///
/// Holds only read-only context: the shared strings table, the reference
/// zone for dates and the workbook's date system.
#[derive(Clone, Copy)]
pub struct CoercionEngine<'a> {
    shared_strings: &'a dyn SharedStringLookup,
    time_zone: Tz,
    date_system: DateSystem,
}

impl<'a> CoercionEngine<'a> {
    /// Create an engine for one workbook.
    pub fn new(shared_strings: &'a dyn SharedStringLookup, time_zone: Tz) -> Self {
        Self {
            shared_strings,
            time_zone,
            date_system: DateSystem::default(),
        }
    }

    /// Use the given date system for serial dates.
    pub fn with_date_system(mut self, date_system: DateSystem) -> Self {
        self.date_system = date_system;
        self
    }

    /// Coerce a raw cell of the given kind to the expected column type.
    #[inline]
    pub fn coerce(&self, kind: CellKind, cell: &RawCell<'_>, expected: ColumnType) -> Result<String> {
        RULES[kind as usize][expected as usize](self, cell)
    }

    fn resolve_shared<'s>(&'s self, cell: &RawCell<'_>) -> Result<&'s str> {
        let index: u32 = atoi_simd::parse::<u32, false, false>(cell.text.trim().as_bytes())
            .map_err(|_| ConvertError::NumericParse(cell.text.to_string()))?;
        let index = index as usize;
        self.shared_strings
            .get(index)
            .ok_or(ConvertError::MissingSharedString(index))
    }
}

/// First-character truth rule: `T`, `1` or `Y` in any case is true.
#[inline]
fn truthy(text: &str) -> bool {
    matches!(text.chars().next(), Some('T' | 't' | '1' | 'Y' | 'y'))
}

#[inline]
fn bool_word(value: bool) -> String {
    String::from(if value { "TRUE" } else { "FALSE" })
}

fn number_as_decimal(_: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    number::parse_number(cell.text).map(number::render_fixed)
}

fn number_as_datetime(engine: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    let value = number::parse_number(cell.text)?;
    if cell.format.is_some_and(NumberFormatMeta::is_date_time) {
        let instant = date::serial_to_instant(value, engine.date_system, engine.time_zone)?;
        Ok(date::format_instant(&instant))
    } else {
        Ok(number::render_fixed(value))
    }
}

fn number_as_boolean(_: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    number::parse_number(cell.text).map(|value| bool_word(value != 0.0))
}

fn boolean_as_digit(_: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    Ok(if truthy(cell.text) { "1" } else { "0" }.to_string())
}

fn boolean_as_word(_: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    Ok(bool_word(truthy(cell.text)))
}

fn boolean_as_datetime(_: &CoercionEngine<'_>, _: &RawCell<'_>) -> Result<String> {
    Err(ConvertError::UnsupportedCoercion {
        kind: CellKind::Boolean,
        expected: ColumnType::DateTime,
    })
}

fn error_marker(_: &CoercionEngine<'_>, _: &RawCell<'_>) -> Result<String> {
    Ok(ERROR_MARKER.to_string())
}

fn formula_text(_: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    Ok(cell.text.to_string())
}

fn text_as_decimal(_: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    number::parse_number(cell.text).map(number::render_fixed)
}

fn text_as_datetime(engine: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    date::parse_local_date(cell.text, engine.time_zone).map(|instant| date::format_instant(&instant))
}

fn text_as_boolean(_: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    Ok(bool_word(truthy(cell.text)))
}

fn text_verbatim(_: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    Ok(cell.text.to_string())
}

fn shared_as_decimal(engine: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    text_as_decimal(engine, &RawCell::new(engine.resolve_shared(cell)?))
}

fn shared_as_datetime(engine: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    text_as_datetime(engine, &RawCell::new(engine.resolve_shared(cell)?))
}

fn shared_as_boolean(engine: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    text_as_boolean(engine, &RawCell::new(engine.resolve_shared(cell)?))
}

fn shared_verbatim(engine: &CoercionEngine<'_>, cell: &RawCell<'_>) -> Result<String> {
    text_verbatim(engine, &RawCell::new(engine.resolve_shared(cell)?))
}
