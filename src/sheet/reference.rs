//! A1-style cell references.

use std::fmt;

use crate::error::{ConvertError, Result};

/// Largest column index a worksheet can hold (`XFD`, zero-based).
pub const MAX_COLUMN: u32 = 16_383;

/// Zero-based position of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CellAddress {
    /// Row index (zero-based)
    pub row: u32,
    /// Column index (zero-based)
    pub column: u32,
}

impl CellAddress {
    /// Create an address from zero-based coordinates.
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Decode a reference such as `B7` or `aa12`.
    pub fn parse(reference: &str) -> Result<Self> {
        let malformed = || ConvertError::MalformedReference(reference.to_string());
        let bytes = reference.as_bytes();

        let letters = bytes.iter().take_while(|b| b.is_ascii_alphabetic()).count();
        if letters == 0 || letters == bytes.len() {
            return Err(malformed());
        }

        // A=1, B=2, ..., Z=26, AA=27, etc.
        let mut column = 0u32;
        for &byte in &bytes[..letters] {
            column = column
                .checked_mul(26)
                .and_then(|c| c.checked_add((byte.to_ascii_uppercase() - b'A' + 1) as u32))
                .filter(|&c| c <= MAX_COLUMN + 1)
                .ok_or_else(malformed)?;
        }

        let row = parse_row_number(&reference[letters..]).map_err(|_| malformed())?;

        Ok(Self {
            row,
            column: column - 1,
        })
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row + 1)
    }
}

/// Parse a one-based row number attribute into a zero-based row index.
pub fn parse_row_number(text: &str) -> Result<u32> {
    let malformed = || ConvertError::MalformedReference(text.to_string());
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let row: u32 = atoi_simd::parse::<u32, false, false>(text.as_bytes()).map_err(|_| malformed())?;
    row.checked_sub(1).ok_or_else(malformed)
}

/// Convert a zero-based column index to letters (0 -> "A", 26 -> "AA").
pub fn column_letters(column: u32) -> String {
    let mut letters = Vec::with_capacity(3);
    let mut col = column + 1;

    while col > 0 {
        col -= 1;
        letters.push((col % 26) as u8 + b'A');
        col /= 26;
    }

    letters.iter().rev().map(|&b| b as char).collect()
}
