//! Row/cell event state machine for one worksheet.

use std::io::Write;

use tracing::trace;

use crate::coerce::{CellKind, CoercionEngine, RawCell};
use crate::column::ColumnTypes;
use crate::config::FormulaMode;
use crate::emit::DelimitedEmitter;
use crate::error::{ConvertError, Result};
use crate::lookup::StyleLookup;
use crate::sheet::context::{SheetParseContext, TagState};
use crate::sheet::reference::{CellAddress, parse_row_number};
use crate::sheet::{Attributes, SheetContentHandler};

/// Counts reported when a sheet is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SheetSummary {
    /// Data rows written (the header row is not counted)
    pub rows: u64,
    /// Cells written
    pub cells: u64,
}

/// Converts one sheet's markup events into delimited output.
///
/// The first row is the header: its cells are decoded like any other but
/// nothing is written for it. From the second row on, every completed value
/// is coerced to its column's declared type as soon as it completes; the
/// row reaches the sink when it closes.
pub struct SheetHandler<'a, W: Write> {
    columns: &'a ColumnTypes,
    styles: &'a dyn StyleLookup,
    engine: CoercionEngine<'a>,
    emitter: &'a mut DelimitedEmitter<W>,
    formulas: FormulaMode,
    ctx: SheetParseContext,
}

impl<'a, W: Write> SheetHandler<'a, W> {
    /// Create a handler for a sheet that has not started yet.
    pub fn new(
        columns: &'a ColumnTypes,
        styles: &'a dyn StyleLookup,
        engine: CoercionEngine<'a>,
        emitter: &'a mut DelimitedEmitter<W>,
    ) -> Self {
        Self {
            columns,
            styles,
            engine,
            emitter,
            formulas: FormulaMode::default(),
            ctx: SheetParseContext::new(),
        }
    }

    /// Choose what formula cells contribute.
    pub fn with_formula_mode(mut self, formulas: FormulaMode) -> Self {
        self.formulas = formulas;
        self
    }

    /// Current parse state.
    pub fn context(&self) -> &SheetParseContext {
        &self.ctx
    }

    /// Finish the sheet, returning what was written.
    pub fn finish(self) -> SheetSummary {
        SheetSummary {
            rows: self.ctx.rows_emitted,
            cells: self.ctx.cells_emitted,
        }
    }

    fn open_row(&mut self, attributes: &Attributes) -> Result<()> {
        let row = match attributes.get("r") {
            Some(number) => parse_row_number(number)?,
            // Some writers omit row numbers; count on from the previous row.
            None => self.ctx.next_row,
        };
        self.ctx.begin_row(row);
        self.emitter.discard_row();
        Ok(())
    }

    fn close_row(&mut self) -> Result<()> {
        if self.ctx.end_row() {
            self.emitter.end_row()?;
            self.ctx.rows_emitted += 1;
        }
        Ok(())
    }

    fn open_cell(&mut self, attributes: &Attributes) -> Result<()> {
        let address = match attributes.get("r") {
            Some(reference) => CellAddress::parse(reference)?,
            None => CellAddress::new(self.ctx.row, self.ctx.next_column),
        };
        let kind = CellKind::from_type_attr(attributes.get("t"));

        let style = match (kind, attributes.get("s")) {
            (CellKind::Number, Some(index)) => Some(
                atoi_simd::parse::<usize, false, false>(index.as_bytes()).map_err(|_| {
                    ConvertError::NumericParse(index.to_string()).in_cell(address.to_string())
                })?,
            ),
            (CellKind::Number, None) if self.styles.style_count() > 0 => Some(0),
            _ => None,
        };

        self.ctx.begin_cell(address, kind, style);
        Ok(())
    }

    fn open_formula(&mut self, attributes: &Attributes) {
        self.ctx.formula.clear();

        // Cells inside a shared formula's range only carry its index; the
        // text lives on the cell that defines the range.
        let defines = attributes.get("t") != Some("shared") || attributes.get("ref").is_some();
        if defines {
            self.ctx.state = TagState::InFormula;
            self.ctx.cell.has_formula = true;
        } else {
            trace!(
                cell = %self.ctx.cell.address,
                si = attributes.get("si").unwrap_or_default(),
                "shared formula reference, no text captured"
            );
        }
    }

    /// A `<v>` or `<is>` element closed: the cell's value is complete.
    fn complete_value(&mut self) -> Result<()> {
        self.ctx.state = TagState::Idle;

        if !self.ctx.headers_processed {
            self.ctx.value.clear();
            return Ok(());
        }

        let address = self.ctx.cell.address;
        self.emit_cell(address)
            .map_err(|e| e.in_cell(address.to_string()))?;
        self.ctx.value.clear();
        Ok(())
    }

    fn emit_cell(&mut self, address: CellAddress) -> Result<()> {
        let ctx = &mut self.ctx;
        let expected = self.columns.get(address.column)?;

        let kind = match self.formulas {
            FormulaMode::Source if ctx.cell.has_formula => CellKind::Formula,
            _ => ctx.cell.kind,
        };
        let cell = match kind {
            CellKind::Formula => RawCell::new(&ctx.formula),
            CellKind::Number => RawCell::new(&ctx.value)
                .with_format(ctx.cell.style.and_then(|style| self.styles.get(style))),
            _ => RawCell::new(&ctx.value),
        };

        let output = self.engine.coerce(kind, &cell, expected)?;
        self.emitter
            .write_cell(ctx.previous_column, address.column, &output)?;
        ctx.mark_emitted(address.column);
        Ok(())
    }
}

impl<W: Write> SheetContentHandler for SheetHandler<'_, W> {
    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()> {
        match (name, self.ctx.state) {
            ("row", _) => self.open_row(attributes)?,
            ("c", _) => self.open_cell(attributes)?,
            ("v", _) => {
                self.ctx.value.clear();
                self.ctx.state = TagState::InValue;
            },
            ("is", _) => {
                self.ctx.value.clear();
                self.ctx.state = TagState::InInlineString {
                    in_text: false,
                    in_phonetic: false,
                };
            },
            ("rPh", TagState::InInlineString { .. }) => {
                self.ctx.state = TagState::InInlineString {
                    in_text: false,
                    in_phonetic: true,
                };
            },
            ("t", TagState::InInlineString { in_phonetic: false, .. }) => {
                self.ctx.state = TagState::InInlineString {
                    in_text: true,
                    in_phonetic: false,
                };
            },
            ("f", _) => self.open_formula(attributes),
            _ => {},
        }
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        match (name, self.ctx.state) {
            ("v", TagState::InValue) | ("is", TagState::InInlineString { .. }) => {
                self.complete_value()?
            },
            ("t", TagState::InInlineString { in_phonetic, .. }) => {
                self.ctx.state = TagState::InInlineString {
                    in_text: false,
                    in_phonetic,
                };
            },
            ("rPh", TagState::InInlineString { .. }) => {
                self.ctx.state = TagState::InInlineString {
                    in_text: false,
                    in_phonetic: false,
                };
            },
            ("f", TagState::InFormula) => self.ctx.state = TagState::Idle,
            ("row", _) => self.close_row()?,
            _ => {},
        }
        Ok(())
    }

    #[inline]
    fn characters(&mut self, text: &str) -> Result<()> {
        self.ctx.push_text(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use crate::format::NumberFormatMeta;
    use crate::lookup::{SharedStrings, StyleTable};
    use chrono_tz::America::Los_Angeles;

    /// Events for one sheet, written compactly.
    enum Ev<'e> {
        Open(&'e str, &'e [(&'e str, &'e str)]),
        Close(&'e str),
        Text(&'e str),
    }
    use Ev::*;

    struct Fixture {
        columns: ColumnTypes,
        strings: SharedStrings,
        styles: StyleTable,
        formulas: FormulaMode,
    }

    impl Fixture {
        fn new(columns: &[ColumnType]) -> Self {
            Self {
                columns: ColumnTypes::new(columns.to_vec()),
                strings: SharedStrings::from(vec![
                    "Name".to_string(),
                    "Widget".to_string(),
                    "Acme".to_string(),
                ]),
                styles: StyleTable::from(vec![
                    NumberFormatMeta::new(0, None),
                    NumberFormatMeta::new(14, None),
                ]),
                formulas: FormulaMode::CachedValue,
            }
        }

        fn run(&self, events: &[Ev<'_>]) -> (Result<SheetSummary>, String) {
            let mut emitter = DelimitedEmitter::new(Vec::new());
            let result = {
                let engine = CoercionEngine::new(&self.strings, Los_Angeles);
                let mut handler = SheetHandler::new(&self.columns, &self.styles, engine, &mut emitter)
                    .with_formula_mode(self.formulas);
                feed(&mut handler, events).map(|()| handler.finish())
            };
            (result, String::from_utf8(emitter.into_inner()).unwrap())
        }
    }

    fn feed<H: SheetContentHandler>(handler: &mut H, events: &[Ev<'_>]) -> Result<()> {
        for event in events {
            match event {
                Open(name, attrs) => {
                    let attributes: Attributes = attrs.iter().copied().collect();
                    handler.start_element(name, &attributes)?;
                },
                Close(name) => handler.end_element(name)?,
                Text(text) => handler.characters(text)?,
            }
        }
        Ok(())
    }

    /// `<c r=.. t=..><v>text</v></c>` as events.
    fn value_cell<'e>(attrs: &'e [(&'e str, &'e str)], text: &'e str) -> [Ev<'e>; 5] {
        [Open("c", attrs), Open("v", &[]), Text(text), Close("v"), Close("c")]
    }

    fn header_row() -> Vec<Ev<'static>> {
        let mut events = vec![Open("row", &[("r", "1")])];
        events.extend(value_cell(&[("r", "A1"), ("t", "s")], "0"));
        events.push(Close("row"));
        events
    }

    #[test]
    fn test_header_row_is_not_emitted() {
        let fixture = Fixture::new(&[ColumnType::Decimal]);
        let (result, output) = fixture.run(&header_row());
        assert_eq!(result.unwrap(), SheetSummary::default());
        assert_eq!(output, "");
    }

    #[test]
    fn test_header_cells_are_not_coerced() {
        // "Name" is not a decimal, but header cells are never coerced.
        let fixture = Fixture::new(&[ColumnType::Decimal]);
        let mut events = header_row();
        events.push(Open("row", &[("r", "2")]));
        events.extend(value_cell(&[("r", "A2")], "3.14000"));
        events.push(Close("row"));

        let (result, output) = fixture.run(&events);
        assert_eq!(result.unwrap(), SheetSummary { rows: 1, cells: 1 });
        assert_eq!(output, "3.14\n");
    }

    #[test]
    fn test_gap_filling_and_shared_strings() {
        let fixture = Fixture::new(&[ColumnType::String; 4]);
        let mut events = header_row();
        events.push(Open("row", &[("r", "2")]));
        events.extend(value_cell(&[("r", "A2"), ("t", "s")], "1"));
        events.extend(value_cell(&[("r", "D2"), ("t", "s")], "2"));
        events.push(Close("row"));

        let (result, output) = fixture.run(&events);
        result.unwrap();
        assert_eq!(output, "Widget,,,Acme\n");
    }

    #[test]
    fn test_missing_row_number_follows_previous_row() {
        let fixture = Fixture::new(&[ColumnType::String]);
        let events = [
            Open("row", &[("r", "5")]),
            Close("row"),
            Open("row", &[]),
        ];
        let mut emitter = DelimitedEmitter::new(Vec::new());
        let engine = CoercionEngine::new(&fixture.strings, Los_Angeles);
        let mut handler = SheetHandler::new(&fixture.columns, &fixture.styles, engine, &mut emitter);
        feed(&mut handler, &events).unwrap();
        assert_eq!(handler.context().row(), 5);
    }

    #[test]
    fn test_cell_without_reference_takes_next_column() {
        let fixture = Fixture::new(&[ColumnType::Decimal; 3]);
        let mut events = header_row();
        events.push(Open("row", &[]));
        events.extend(value_cell(&[("r", "B2")], "1"));
        events.extend(value_cell(&[], "2"));
        events.push(Close("row"));

        let (result, output) = fixture.run(&events);
        result.unwrap();
        assert_eq!(output, ",1,2\n");
    }

    #[test]
    fn test_inline_string_rich_text_runs() {
        let fixture = Fixture::new(&[ColumnType::String]);
        let mut events = header_row();
        events.extend([
            Open("row", &[("r", "2")]),
            Open("c", &[("r", "A2"), ("t", "inlineStr")]),
            Open("is", &[]),
            Open("r", &[]),
            Open("t", &[]),
            Text("Hello, "),
            Close("t"),
            Close("r"),
            Text("\n  "),
            Open("r", &[]),
            Open("t", &[]),
            Text("world"),
            Close("t"),
            Close("r"),
            Close("is"),
            Close("c"),
            Close("row"),
        ]);

        let (result, output) = fixture.run(&events);
        result.unwrap();
        assert_eq!(output, "\"Hello, world\"\n");
    }

    #[test]
    fn test_inline_string_phonetic_runs_are_skipped() {
        let fixture = Fixture::new(&[ColumnType::String]);
        let mut events = header_row();
        events.extend([
            Open("row", &[("r", "2")]),
            Open("c", &[("r", "A2"), ("t", "inlineStr")]),
            Open("is", &[]),
            Open("t", &[]),
            Text("東京"),
            Close("t"),
            Open("rPh", &[("sb", "0"), ("eb", "2")]),
            Open("t", &[]),
            Text("トウキョウ"),
            Close("t"),
            Close("rPh"),
            Open("phoneticPr", &[("fontId", "1")]),
            Close("phoneticPr"),
            Close("is"),
            Close("c"),
            Close("row"),
        ]);

        let (result, output) = fixture.run(&events);
        assert_eq!(result.unwrap().cells, 1);
        assert_eq!(output, "東京\n");
    }

    #[test]
    fn test_date_styled_number_with_default_style_fallback() {
        let fixture = Fixture::new(&[ColumnType::DateTime, ColumnType::DateTime]);
        let mut events = header_row();
        events.push(Open("row", &[("r", "2")]));
        // Explicit date style.
        events.extend(value_cell(&[("r", "A2"), ("s", "1")], "43831.5"));
        // No style: falls back to style 0, which is General.
        events.extend(value_cell(&[("r", "B2")], "43831.5"));
        events.push(Close("row"));

        let (result, output) = fixture.run(&events);
        result.unwrap();
        assert_eq!(output, "2020-01-01T20:00:00Z,43831.5\n");
    }

    #[test]
    fn test_boolean_to_datetime_aborts() {
        let fixture = Fixture::new(&[ColumnType::DateTime]);
        let mut events = header_row();
        events.push(Open("row", &[("r", "2")]));
        events.extend(value_cell(&[("r", "A2"), ("t", "b")], "1"));
        events.push(Close("row"));

        let (result, output) = fixture.run(&events);
        let err = result.unwrap_err();
        assert!(matches!(err, ConvertError::InCell { ref cell, .. } if cell == "A2"));
        assert!(matches!(
            err.root(),
            ConvertError::UnsupportedCoercion {
                kind: CellKind::Boolean,
                expected: ColumnType::DateTime,
            }
        ));
        // Nothing of the failing row was written.
        assert_eq!(output, "");
    }

    #[test]
    fn test_failure_later_in_row_leaves_no_partial_line() {
        let fixture = Fixture::new(&[ColumnType::String, ColumnType::DateTime]);
        let mut events = header_row();
        events.push(Open("row", &[("r", "2")]));
        events.extend(value_cell(&[("r", "A2"), ("t", "str")], "kept"));
        events.extend(value_cell(&[("r", "B2"), ("t", "b")], "1"));
        events.push(Close("row"));

        let (result, output) = fixture.run(&events);
        let err = result.unwrap_err();
        assert!(matches!(err, ConvertError::InCell { ref cell, .. } if cell == "B2"));
        assert!(matches!(err.root(), ConvertError::UnsupportedCoercion { .. }));
        assert_eq!(output, "");
    }

    #[test]
    fn test_malformed_reference_aborts_even_in_header() {
        let fixture = Fixture::new(&[ColumnType::String]);
        let events = [Open("row", &[("r", "1")]), Open("c", &[("r", "1A")])];
        let (result, _) = fixture.run(&events);
        assert!(matches!(result, Err(ConvertError::MalformedReference(r)) if r == "1A"));
    }

    #[test]
    fn test_undeclared_column_aborts() {
        let fixture = Fixture::new(&[ColumnType::String]);
        let mut events = header_row();
        events.push(Open("row", &[("r", "2")]));
        events.extend(value_cell(&[("r", "C2"), ("t", "str")], "x"));
        let (result, _) = fixture.run(&events);
        assert!(matches!(result.unwrap_err().root(), ConvertError::UndeclaredColumn(2)));
    }

    #[test]
    fn test_formula_modes() {
        let events = || {
            let mut events = header_row();
            events.extend([
                Open("row", &[("r", "2")]),
                // Defines a shared formula over A2:A3.
                Open("c", &[("r", "A2")]),
                Open("f", &[("t", "shared"), ("ref", "A2:A3"), ("si", "0")]),
                Text("B2*2"),
                Close("f"),
                Open("v", &[]),
                Text("4"),
                Close("v"),
                Close("c"),
                Close("row"),
                Open("row", &[("r", "3")]),
                // Only references the shared formula.
                Open("c", &[("r", "A3")]),
                Open("f", &[("t", "shared"), ("si", "0")]),
                Close("f"),
                Open("v", &[]),
                Text("6"),
                Close("v"),
                Close("c"),
                Close("row"),
            ]);
            events
        };

        let mut fixture = Fixture::new(&[ColumnType::Decimal]);
        let (result, output) = fixture.run(&events());
        result.unwrap();
        assert_eq!(output, "4\n6\n");

        fixture.formulas = FormulaMode::Source;
        let (result, output) = fixture.run(&events());
        result.unwrap();
        assert_eq!(output, "B2*2\n6\n");
    }

    #[test]
    fn test_error_cells_and_empty_rows() {
        let fixture = Fixture::new(&[ColumnType::Decimal, ColumnType::Decimal]);
        let mut events = header_row();
        events.extend([Open("row", &[("r", "2")]), Open("c", &[("r", "A2"), ("s", "0")]), Close("c"), Close("row")]);
        events.push(Open("row", &[("r", "3")]));
        events.extend(value_cell(&[("r", "B3"), ("t", "e")], "#DIV/0!"));
        events.push(Close("row"));

        let (result, output) = fixture.run(&events);
        assert_eq!(result.unwrap(), SheetSummary { rows: 2, cells: 1 });
        assert_eq!(output, "\n,**ERR**\n");
    }
}
