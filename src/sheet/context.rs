//! Mutable state of one sheet's conversion.

use crate::coerce::CellKind;
use crate::sheet::reference::CellAddress;

/// Which text-bearing element is currently open.
///
/// Exactly one of these is active at a time; character data is routed by
/// this state alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagState {
    /// Outside any element whose text matters
    #[default]
    Idle,
    /// Inside `<v>`
    InValue,
    /// Inside a formula definition `<f>`
    InFormula,
    /// Inside an inline string `<is>`; text counts only within its `<t>` runs
    InInlineString {
        /// A `<t>` run is open
        in_text: bool,
        /// Inside a phonetic run `<rPh>`, whose text is a reading guide
        in_phonetic: bool,
    },
}

/// Per-cell state, reset whenever a cell opens.
#[derive(Debug, Clone, Default)]
pub struct CellState {
    /// Position of the cell
    pub address: CellAddress,
    /// Encoding of the cell's value
    pub kind: CellKind,
    /// Style whose number format applies, for numeric cells
    pub style: Option<usize>,
    /// The cell defines a formula and its text was captured
    pub has_formula: bool,
}

/// State of one sheet's event stream.
///
/// Created when the stream begins, mutated in place by every event, and
/// dropped when the sheet ends. Never shared between sheets.
#[derive(Debug, Default)]
pub struct SheetParseContext {
    pub(crate) row: u32,
    pub(crate) next_row: u32,
    pub(crate) previous_column: Option<u32>,
    pub(crate) next_column: u32,
    pub(crate) state: TagState,
    pub(crate) value: String,
    pub(crate) formula: String,
    pub(crate) cell: CellState,
    pub(crate) headers_processed: bool,
    pub(crate) rows_emitted: u64,
    pub(crate) cells_emitted: u64,
}

impl SheetParseContext {
    /// Create the state for a sheet that has not seen any event yet.
    pub fn new() -> Self {
        Self {
            value: String::with_capacity(64),
            formula: String::with_capacity(64),
            ..Self::default()
        }
    }

    /// Zero-based index of the current row.
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Row index assumed for a row without an explicit number.
    pub fn next_row(&self) -> u32 {
        self.next_row
    }

    /// Last column written in the current row.
    pub fn previous_column(&self) -> Option<u32> {
        self.previous_column
    }

    /// Current tag state.
    pub fn state(&self) -> TagState {
        self.state
    }

    /// The header row has been consumed.
    pub fn headers_processed(&self) -> bool {
        self.headers_processed
    }

    /// State of the cell being parsed.
    pub fn cell(&self) -> &CellState {
        &self.cell
    }

    pub(crate) fn begin_row(&mut self, row: u32) {
        self.row = row;
        self.previous_column = None;
        self.next_column = 0;
        self.state = TagState::Idle;
    }

    /// Close the current row, returning whether it carries output.
    pub(crate) fn end_row(&mut self) -> bool {
        self.next_row = self.row + 1;
        self.previous_column = None;
        self.state = TagState::Idle;
        let is_data_row = self.headers_processed;
        self.headers_processed = true;
        is_data_row
    }

    pub(crate) fn begin_cell(&mut self, address: CellAddress, kind: CellKind, style: Option<usize>) {
        self.next_column = address.column + 1;
        self.cell = CellState {
            address,
            kind,
            style,
            has_formula: false,
        };
        self.state = TagState::Idle;
        self.value.clear();
        self.formula.clear();
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        match self.state {
            TagState::InValue
            | TagState::InInlineString {
                in_text: true,
                in_phonetic: false,
            } => self.value.push_str(text),
            TagState::InFormula => self.formula.push_str(text),
            TagState::Idle | TagState::InInlineString { .. } => {},
        }
    }

    /// Record that a value was written for `column`.
    pub(crate) fn mark_emitted(&mut self, column: u32) {
        self.previous_column = Some(column);
        self.cells_emitted += 1;
    }
}
