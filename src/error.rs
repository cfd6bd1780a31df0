//! Error types for sheet conversion.

use thiserror::Error;

use crate::coerce::CellKind;
use crate::column::ColumnType;

/// Result type for sheet conversion.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Error types for sheet conversion.
///
/// Every variant is fatal for the whole run: the converter never skips a
/// cell or emits a partial row.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Cell reference or row number that cannot be decoded
    #[error("Malformed cell reference: {0:?}")]
    MalformedReference(String),

    /// Non-numeric text where a number is required
    #[error("Cannot parse {0:?} as a number")]
    NumericParse(String),

    /// Coercion the type matrix does not allow
    #[error("Cannot convert a {kind} cell to {expected}")]
    UnsupportedCoercion { kind: CellKind, expected: ColumnType },

    /// Text or serial number that does not denote a date
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Cell lies beyond the declared column types
    #[error("Column {0} has no declared output type")]
    UndeclaredColumn(u32),

    /// Shared string index outside the table
    #[error("Shared string index {0} is out of range")]
    MissingSharedString(usize),

    /// Malformed markup reported by the event source
    #[error("XML error: {0}")]
    Xml(String),

    /// Package part not found
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP container error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Error raised while converting a specific cell
    #[error("cell {cell}: {source}")]
    InCell {
        cell: String,
        #[source]
        source: Box<ConvertError>,
    },

    /// Error raised while converting a specific sheet
    #[error("sheet {sheet:?}: {source}")]
    InSheet {
        sheet: String,
        #[source]
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    /// Attach the address of the cell being converted.
    pub fn in_cell(self, cell: impl Into<String>) -> Self {
        ConvertError::InCell {
            cell: cell.into(),
            source: Box::new(self),
        }
    }

    /// Attach the name of the sheet being converted.
    pub fn in_sheet(self, sheet: impl Into<String>) -> Self {
        ConvertError::InSheet {
            sheet: sheet.into(),
            source: Box::new(self),
        }
    }

    /// The underlying error with location wrappers removed.
    pub fn root(&self) -> &ConvertError {
        match self {
            ConvertError::InCell { source, .. } | ConvertError::InSheet { source, .. } => {
                source.root()
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_strips_locations() {
        let err = ConvertError::NumericParse("abc".to_string())
            .in_cell("B7")
            .in_sheet("Sales");
        assert!(matches!(err.root(), ConvertError::NumericParse(text) if text == "abc"));
        assert_eq!(
            err.to_string(),
            "sheet \"Sales\": cell B7: Cannot parse \"abc\" as a number"
        );
    }
}
