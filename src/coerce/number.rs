//! Numeric parsing and fixed-point rendering.

use crate::error::{ConvertError, Result};

/// Maximum number of fractional digits in rendered output.
const MAX_FRACTION_DIGITS: usize = 13;

/// Parse numeric cell text.
///
/// Surrounding whitespace is ignored; anything else that is not a float
/// literal is an error.
#[inline]
pub fn parse_number(text: &str) -> Result<f64> {
    fast_float2::parse(text.trim()).map_err(|_| ConvertError::NumericParse(text.to_string()))
}

/// Render a number in fixed-point notation.
///
/// At most 13 fractional digits (rounded half to even), trailing zeros
/// trimmed, no grouping separators and always `.` as the decimal point.
pub fn render_fixed(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }

    let mut out = format!("{:.*}", MAX_FRACTION_DIGITS, value);
    let trimmed = out.trim_end_matches('0').trim_end_matches('.').len();
    out.truncate(trimmed);

    if out == "-0" {
        out.remove(0);
    }
    out
}
