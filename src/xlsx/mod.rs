//! Excel `.xlsx` (Office Open XML) workbook reader.
//!
//! An `.xlsx` file is a ZIP package. The workbook part lists the sheets,
//! its relationships part maps each sheet to a worksheet part, and the
//! shared strings and styles parts hold the tables cells refer to by index.
//!
//! Worksheet parts are never materialized: [`XlsxWorkbook::read_sheet`]
//! streams the part through quick-xml and forwards every event to a
//! [`crate::sheet::SheetContentHandler`].

pub mod events;
pub mod package;
pub mod shared_strings;
pub mod styles;
pub mod workbook;

pub use events::drive_sheet;
pub use package::{Sheet, XlsxWorkbook};
pub use workbook::{SheetEntry, WorkbookInfo};
