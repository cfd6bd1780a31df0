//! Read-only workbook tables consulted while converting a sheet.
//!
//! The sheet state machine only sees these traits; where the tables come
//! from (an `.xlsx` package, a binary workbook, a test fixture) is up to
//! the caller.

use crate::format::NumberFormatMeta;

/// Shared strings lookup by index.
pub trait SharedStringLookup {
    /// Get a string by its index.
    fn get(&self, index: usize) -> Option<&str>;
}

/// Cell style lookup resolving a style index to its number format.
pub trait StyleLookup {
    /// Number format of the style at `index`.
    fn get(&self, index: usize) -> Option<&NumberFormatMeta>;

    /// Number of cell styles; a cell without an explicit style uses style 0
    /// when this is non-zero.
    fn style_count(&self) -> usize;
}

/// Shared strings table for efficient string storage.
#[derive(Debug, Default, Clone)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Create a new empty shared strings table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a string, returning its index.
    pub fn push(&mut self, text: String) -> usize {
        self.strings.push(text);
        self.strings.len() - 1
    }

    /// Get the number of strings in the table.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl From<Vec<String>> for SharedStrings {
    fn from(strings: Vec<String>) -> Self {
        Self { strings }
    }
}

impl SharedStringLookup for SharedStrings {
    #[inline]
    fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }
}

/// Number formats of the workbook's cell styles (`cellXfs`), by style index.
#[derive(Debug, Default, Clone)]
pub struct StyleTable {
    formats: Vec<NumberFormatMeta>,
}

impl StyleTable {
    /// Create a new empty style table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the number format of the next cell style.
    pub fn push(&mut self, format: NumberFormatMeta) {
        self.formats.push(format);
    }
}

impl From<Vec<NumberFormatMeta>> for StyleTable {
    fn from(formats: Vec<NumberFormatMeta>) -> Self {
        Self { formats }
    }
}

impl StyleLookup for StyleTable {
    #[inline]
    fn get(&self, index: usize) -> Option<&NumberFormatMeta> {
        self.formats.get(index)
    }

    fn style_count(&self) -> usize {
        self.formats.len()
    }
}
