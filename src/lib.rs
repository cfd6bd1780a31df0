//! Sheetcast - streaming conversion of Excel worksheets to type-coerced CSV
//!
//! Every cell of a sheet is converted to the type declared for its column
//! (decimal, datetime, boolean or string) as soon as its value is complete,
//! and written straight to the output. Sheets are never materialized in
//! memory, so arbitrarily large sheets convert in bounded space.
//!
//! # Architecture
//!
//! - [`column`]: the declared output type of each column
//! - [`coerce`]: the `(cell kind, column type)` coercion rules
//! - [`sheet`]: the row/cell state machine fed by markup events
//! - [`emit`]: delimited output with gap filling between sparse cells
//! - [`xlsx`]: the `.xlsx` package reader producing those events
//! - [`convert`]: the whole-workbook driver tying them together
//!
//! # Example
//!
//! ```no_run
//! use sheetcast::{ColumnTypes, ConvertOptions, convert_file};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let columns: ColumnTypes = "decimal,datetime,boolean,string".parse()?;
//! let options = ConvertOptions::new(columns);
//!
//! let stdout = std::io::stdout();
//! for summary in convert_file("sales.xlsx", &options, stdout.lock())? {
//!     eprintln!("{} rows, {} cells", summary.rows, summary.cells);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Driving the state machine directly
//!
//! Any event source can feed a [`SheetHandler`]; the `.xlsx` reader is only
//! one of them.
//!
//! ```
//! use sheetcast::coerce::CoercionEngine;
//! use sheetcast::emit::DelimitedEmitter;
//! use sheetcast::lookup::{SharedStrings, StyleTable};
//! use sheetcast::sheet::{Attributes, SheetContentHandler, SheetHandler};
//! use sheetcast::{ColumnType, ColumnTypes};
//!
//! # fn main() -> sheetcast::Result<()> {
//! let columns = ColumnTypes::new(vec![ColumnType::Decimal, ColumnType::Boolean]);
//! let strings = SharedStrings::new();
//! let styles = StyleTable::new();
//! let mut emitter = DelimitedEmitter::new(Vec::new());
//!
//! let engine = CoercionEngine::new(&strings, chrono_tz::UTC);
//! let mut handler = SheetHandler::new(&columns, &styles, engine, &mut emitter);
//! for row in ["1", "2"] {
//!     handler.start_element("row", &[("r", row)].into_iter().collect())?;
//!     for (cell, value) in [("A", "2.50"), ("B", "0")] {
//!         let reference = format!("{cell}{row}");
//!         handler.start_element("c", &[("r", reference.as_str())].into_iter().collect())?;
//!         handler.start_element("v", &Attributes::new())?;
//!         handler.characters(value)?;
//!         handler.end_element("v")?;
//!         handler.end_element("c")?;
//!     }
//!     handler.end_element("row")?;
//! }
//! handler.finish();
//!
//! // The first row is the header and produces no output.
//! assert_eq!(emitter.into_inner(), b"2.5,FALSE\n");
//! # Ok(())
//! # }
//! ```

pub mod coerce;
pub mod column;
pub mod config;
pub mod convert;
pub mod emit;
pub mod error;
pub mod format;
pub mod lookup;
pub mod sheet;
pub mod xlsx;

// Re-export commonly used types for convenience
pub use coerce::{CellKind, CoercionEngine, DateSystem};
pub use column::{ColumnType, ColumnTypes, UnknownColumnType};
pub use config::{ConvertOptions, FormulaMode};
pub use convert::{convert_file, convert_workbook};
pub use error::{ConvertError, Result};
pub use sheet::{SheetHandler, SheetSummary};
pub use xlsx::XlsxWorkbook;
