//! Delimited output.
//!
//! Cells of the open row are held until the row ends, so a conversion that
//! fails partway through a row leaves no partial line in the sink. Nothing
//! beyond that one row is buffered.

use std::io::Write;

use crate::error::Result;

/// Writes coerced cells as delimited lines, filling skipped columns with
/// empty fields.
pub struct DelimitedEmitter<W: Write> {
    sink: W,
    row: Vec<u8>,
    delimiter: u8,
    quote: u8,
}

impl<W: Write> DelimitedEmitter<W> {
    /// Create a comma-delimited emitter.
    pub fn new(sink: W) -> Self {
        Self::with_delimiter(sink, b',')
    }

    /// Create an emitter with a custom field delimiter.
    pub fn with_delimiter(sink: W, delimiter: u8) -> Self {
        Self {
            sink,
            row: Vec::with_capacity(256),
            delimiter,
            quote: b'"',
        }
    }

    /// Add one cell to the open row.
    ///
    /// `previous` is the last column written in the current row, or `None`
    /// at the start of a row. One delimiter is written per column between
    /// the two, so skipped columns come out as empty fields.
    pub fn write_cell(&mut self, previous: Option<u32>, column: u32, text: &str) -> Result<()> {
        let delimiters = match previous {
            Some(previous) => column.saturating_sub(previous).max(1),
            None => column,
        };
        self.row
            .extend(std::iter::repeat_n(self.delimiter, delimiters as usize));
        self.push_field(text);
        Ok(())
    }

    /// Write the open row to the sink as one line.
    pub fn end_row(&mut self) -> Result<()> {
        self.row.push(b'\n');
        self.sink.write_all(&self.row)?;
        self.row.clear();
        Ok(())
    }

    /// Drop the cells of the open row without writing them.
    pub fn discard_row(&mut self) {
        self.row.clear();
    }

    /// Write a complete single-field line, such as a sheet name.
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.row.clear();
        self.push_field(text);
        self.end_row()
    }

    /// Flush buffered output to the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    /// Return the underlying sink. Cells of a row that never ended are lost.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn push_field(&mut self, text: &str) {
        let quote = char::from(self.quote);
        let needs_quote = text.contains(char::from(self.delimiter))
            || text.contains(quote)
            || text.contains('\n')
            || text.contains('\r');

        if needs_quote {
            let escaped = text.replace(quote, &format!("{0}{0}", quote));
            self.row.push(self.quote);
            self.row.extend_from_slice(escaped.as_bytes());
            self.row.push(self.quote);
        } else {
            self.row.extend_from_slice(text.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(emitter: DelimitedEmitter<Vec<u8>>) -> String {
        String::from_utf8(emitter.into_inner()).unwrap()
    }

    #[test]
    fn test_gap_filling() {
        let mut emitter = DelimitedEmitter::new(Vec::new());
        emitter.write_cell(None, 0, "val0").unwrap();
        emitter.write_cell(Some(0), 3, "val3").unwrap();
        emitter.end_row().unwrap();
        assert_eq!(output(emitter), "val0,,,val3\n");
    }

    #[test]
    fn test_leading_gap_and_no_trailing_fields() {
        let mut emitter = DelimitedEmitter::new(Vec::new());
        emitter.write_cell(None, 2, "x").unwrap();
        emitter.end_row().unwrap();
        emitter.write_cell(None, 0, "a").unwrap();
        emitter.write_cell(Some(0), 1, "b").unwrap();
        emitter.end_row().unwrap();
        emitter.end_row().unwrap();
        assert_eq!(output(emitter), ",,x\na,b\n\n");
    }

    #[test]
    fn test_fields_are_quoted_when_needed() {
        let mut emitter = DelimitedEmitter::new(Vec::new());
        emitter.write_cell(None, 0, "Smith, John").unwrap();
        emitter.write_cell(Some(0), 1, "say \"hi\"").unwrap();
        emitter.write_cell(Some(1), 2, "two\nlines").unwrap();
        emitter.end_row().unwrap();
        assert_eq!(
            output(emitter),
            "\"Smith, John\",\"say \"\"hi\"\"\",\"two\nlines\"\n"
        );
    }

    #[test]
    fn test_custom_delimiter_and_lines() {
        let mut emitter = DelimitedEmitter::with_delimiter(Vec::new(), b'\t');
        emitter.write_line("Sheet1").unwrap();
        emitter.write_cell(None, 0, "1,5").unwrap();
        emitter.write_cell(Some(0), 2, "3").unwrap();
        emitter.end_row().unwrap();
        assert_eq!(output(emitter), "Sheet1\n1,5\t\t3\n");
    }

    #[test]
    fn test_row_reaches_sink_only_when_it_ends() {
        let mut emitter = DelimitedEmitter::new(Vec::new());
        emitter.write_line("Sheet1").unwrap();
        emitter.write_cell(None, 0, "a").unwrap();
        emitter.write_cell(Some(0), 1, "b").unwrap();
        assert_eq!(emitter.sink, b"Sheet1\n");

        emitter.end_row().unwrap();
        emitter.write_cell(None, 0, "dropped").unwrap();
        emitter.discard_row();
        emitter.write_cell(None, 1, "c").unwrap();
        emitter.end_row().unwrap();
        emitter.write_cell(None, 0, "unfinished").unwrap();
        assert_eq!(output(emitter), "Sheet1\na,b\n,c\n");
    }
}
