//! Whole-workbook conversion.

use std::io::{Read, Seek, Write};
use std::path::Path;

use tracing::{debug, info, info_span};

use crate::coerce::CoercionEngine;
use crate::config::ConvertOptions;
use crate::emit::DelimitedEmitter;
use crate::error::Result;
use crate::sheet::{SheetHandler, SheetSummary};
use crate::xlsx::XlsxWorkbook;

/// Convert every sheet of `workbook`, in tab order, into `sink`.
///
/// Each sheet produces its name on a line of its own, one line per data row
/// and then the configured separator line. Output is flushed after every
/// sheet. The first error aborts the whole run; it carries the name of the
/// sheet and, where one applies, the address of the cell.
pub fn convert_workbook<R, W>(
    workbook: &XlsxWorkbook<R>,
    options: &ConvertOptions,
    sink: W,
) -> Result<Vec<SheetSummary>>
where
    R: Read + Seek,
    W: Write,
{
    let mut emitter = DelimitedEmitter::with_delimiter(sink, options.delimiter);
    let engine = CoercionEngine::new(workbook.shared_strings(), options.time_zone)
        .with_date_system(workbook.date_system());

    let mut summaries = Vec::with_capacity(workbook.sheets().len());
    for sheet in workbook.sheets() {
        let span = info_span!("sheet", name = %sheet.name);
        let _guard = span.enter();

        let summary = convert_sheet(workbook, sheet, engine, options, &mut emitter)
            .map_err(|e| e.in_sheet(sheet.name.as_str()))?;
        debug!(rows = summary.rows, cells = summary.cells, "sheet converted");
        summaries.push(summary);
    }

    info!(sheets = summaries.len(), "workbook converted");
    Ok(summaries)
}

/// Open the workbook at `path` and convert it into `sink`.
pub fn convert_file<P: AsRef<Path>, W: Write>(
    path: P,
    options: &ConvertOptions,
    sink: W,
) -> Result<Vec<SheetSummary>> {
    let workbook = XlsxWorkbook::open(path)?;
    convert_workbook(&workbook, options, sink)
}

fn convert_sheet<R: Read + Seek, W: Write>(
    workbook: &XlsxWorkbook<R>,
    sheet: &crate::xlsx::Sheet,
    engine: CoercionEngine<'_>,
    options: &ConvertOptions,
    emitter: &mut DelimitedEmitter<W>,
) -> Result<SheetSummary> {
    emitter.write_line(&sheet.name)?;

    let mut handler = SheetHandler::new(&options.columns, workbook.styles(), engine, emitter)
        .with_formula_mode(options.formulas);
    workbook.read_sheet(sheet, &mut handler)?;
    let summary = handler.finish();

    emitter.write_line(&options.sheet_separator)?;
    emitter.flush()?;
    Ok(summary)
}
