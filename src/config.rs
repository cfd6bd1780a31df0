//! Configuration types for sheet conversion.
//!
//! This module defines the options that control how cells are coerced and
//! how the delimited output is laid out.

use chrono_tz::Tz;

use crate::column::ColumnTypes;

/// Reference zone for serial dates when none is configured.
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::America::Los_Angeles;

/// Line written after the last row of every sheet.
pub const DEFAULT_SHEET_SEPARATOR: &str =
    "--------------------------------------------------------";

/// Which value a formula cell contributes to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormulaMode {
    /// Coerce the value the workbook cached for the formula
    #[default]
    CachedValue,
    /// Echo the formula's source text
    Source,
}

/// Configuration options for sheet conversion.
///
/// # Examples
///
/// ```rust
/// use sheetcast::{ColumnType, ColumnTypes, ConvertOptions, FormulaMode};
///
/// let options = ConvertOptions::new(ColumnTypes::new(vec![
///     ColumnType::Decimal,
///     ColumnType::String,
/// ]))
/// .with_time_zone(chrono_tz::UTC)
/// .with_formula_mode(FormulaMode::Source);
/// assert_eq!(options.delimiter, b',');
/// ```
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Declared output type of each column
    pub columns: ColumnTypes,
    /// Zone in which serial dates are wall-clock times
    pub time_zone: Tz,
    /// What formula cells contribute
    pub formulas: FormulaMode,
    /// Field delimiter
    pub delimiter: u8,
    /// Line written when a sheet is complete
    pub sheet_separator: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            columns: ColumnTypes::default(),
            time_zone: DEFAULT_TIME_ZONE,
            formulas: FormulaMode::default(),
            delimiter: b',',
            sheet_separator: DEFAULT_SHEET_SEPARATOR.to_string(),
        }
    }
}

impl ConvertOptions {
    /// Create options for the given column declaration, with defaults for
    /// everything else.
    #[inline]
    pub fn new(columns: ColumnTypes) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Set the reference zone for serial dates.
    #[inline]
    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Set what formula cells contribute.
    #[inline]
    pub fn with_formula_mode(mut self, formulas: FormulaMode) -> Self {
        self.formulas = formulas;
        self
    }

    /// Set the field delimiter.
    #[inline]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the line written after each sheet.
    #[inline]
    pub fn with_sheet_separator(mut self, separator: impl Into<String>) -> Self {
        self.sheet_separator = separator.into();
        self
    }
}
