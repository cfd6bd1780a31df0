//! Declared output types for each column.
//!
//! The caller declares, once per run, what every column of the output must
//! look like. Cells are coerced to that type whatever raw representation
//! the workbook used to store them.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConvertError, Result};

/// Output contract for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Fixed-point number
    Decimal,
    /// ISO-8601 instant
    DateTime,
    /// `TRUE` or `FALSE`
    Boolean,
    /// Text
    String,
}

impl ColumnType {
    /// All column types, in table order.
    pub const ALL: [ColumnType; 4] = [
        ColumnType::Decimal,
        ColumnType::DateTime,
        ColumnType::Boolean,
        ColumnType::String,
    ];

    /// Lower-case name used in column declarations.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Decimal => "decimal",
            ColumnType::DateTime => "datetime",
            ColumnType::Boolean => "boolean",
            ColumnType::String => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a column type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown column type {0:?} (expected decimal, datetime, boolean or string)")]
pub struct UnknownColumnType(pub String);

impl FromStr for ColumnType {
    type Err = UnknownColumnType;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "decimal" | "number" | "num" => Ok(ColumnType::Decimal),
            "datetime" | "date" | "time" => Ok(ColumnType::DateTime),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            "string" | "str" | "text" => Ok(ColumnType::String),
            _ => Err(UnknownColumnType(s.to_string())),
        }
    }
}

/// Ordered registry of column types, indexed by zero-based column.
///
/// Immutable once built; shared read-only by every sheet of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypes {
    types: Vec<ColumnType>,
}

impl ColumnTypes {
    /// Create a registry from types in column order.
    pub fn new(types: Vec<ColumnType>) -> Self {
        Self { types }
    }

    /// Declared type of a column.
    ///
    /// Columns beyond the declaration are an error on first use.
    #[inline]
    pub fn get(&self, column: u32) -> Result<ColumnType> {
        self.types
            .get(column as usize)
            .copied()
            .ok_or(ConvertError::UndeclaredColumn(column))
    }

    /// Number of declared columns.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no columns are declared.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over the declared types in column order.
    pub fn iter(&self) -> impl Iterator<Item = ColumnType> + '_ {
        self.types.iter().copied()
    }
}

impl From<Vec<ColumnType>> for ColumnTypes {
    fn from(types: Vec<ColumnType>) -> Self {
        Self::new(types)
    }
}

impl FromStr for ColumnTypes {
    type Err = UnknownColumnType;

    /// Parse a comma-separated declaration such as `decimal,string,datetime`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declaration() {
        let columns: ColumnTypes = "decimal, String,DATE,bool".parse().unwrap();
        assert_eq!(
            columns.iter().collect::<Vec<_>>(),
            vec![
                ColumnType::Decimal,
                ColumnType::String,
                ColumnType::DateTime,
                ColumnType::Boolean,
            ]
        );
    }

    #[test]
    fn test_unknown_type() {
        let err = "decimal,currency".parse::<ColumnTypes>().unwrap_err();
        assert_eq!(err, UnknownColumnType("currency".to_string()));
    }

    #[test]
    fn test_undeclared_column_is_error() {
        let columns = ColumnTypes::new(vec![ColumnType::String]);
        assert_eq!(columns.get(0).unwrap(), ColumnType::String);
        assert!(matches!(columns.get(1), Err(ConvertError::UndeclaredColumn(1))));
    }
}
