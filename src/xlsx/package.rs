//! `.xlsx` package access.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, info};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::coerce::DateSystem;
use crate::error::{ConvertError, Result};
use crate::lookup::{SharedStrings, StyleTable};
use crate::sheet::SheetContentHandler;
use crate::xlsx::events::drive_sheet;
use crate::xlsx::shared_strings::parse_shared_strings;
use crate::xlsx::styles::parse_styles;
use crate::xlsx::workbook::{
    Relationship, SheetEntry, parse_relationships, parse_workbook, resolve_target,
};

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";

const OFFICE_DOCUMENT_REL: &str = "/officeDocument";
const SHARED_STRINGS_REL: &str = "/sharedStrings";
const STYLES_REL: &str = "/styles";

/// A worksheet and the package part holding its cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    /// Display name of the sheet
    pub name: String,
    /// Path of the worksheet part inside the package
    pub part: String,
}

/// An opened `.xlsx` workbook.
///
/// Opening reads the workbook-level parts (sheet list, shared strings,
/// styles) up front; worksheet parts are streamed one at a time by
/// [`XlsxWorkbook::read_sheet`].
pub struct XlsxWorkbook<R: Read + Seek> {
    archive: RefCell<ZipArchive<R>>,
    sheets: Vec<Sheet>,
    shared_strings: SharedStrings,
    styles: StyleTable,
    date_system: DateSystem,
}

impl XlsxWorkbook<BufReader<File>> {
    /// Open a workbook file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> XlsxWorkbook<R> {
    /// Read a workbook from any seekable source.
    pub fn new(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let package_rels = match read_optional(&mut archive, PACKAGE_RELS)? {
            Some(content) => parse_relationships(content.as_slice())?,
            None => Vec::new(),
        };
        let workbook_part = package_rels
            .into_iter()
            .find(|rel| rel.kind.ends_with(OFFICE_DOCUMENT_REL))
            .map(|rel| resolve_target("", &rel.target))
            .unwrap_or_else(|| DEFAULT_WORKBOOK_PART.to_string());
        let (base_dir, file_name) = split_part(&workbook_part);

        let info = parse_workbook(read_part(&mut archive, &workbook_part)?.as_slice())?;
        let rels_part = resolve_target(base_dir, &format!("_rels/{file_name}.rels"));
        let relationships = match read_optional(&mut archive, &rels_part)? {
            Some(content) => parse_relationships(content.as_slice())?,
            None => Vec::new(),
        };

        let target_of = |kind: &str| {
            relationships
                .iter()
                .find(|rel| rel.kind.ends_with(kind))
                .map(|rel| resolve_target(base_dir, &rel.target))
        };
        let shared_strings_part =
            target_of(SHARED_STRINGS_REL).unwrap_or_else(|| resolve_target(base_dir, "sharedStrings.xml"));
        let styles_part =
            target_of(STYLES_REL).unwrap_or_else(|| resolve_target(base_dir, "styles.xml"));

        let sheets = info
            .sheets
            .into_iter()
            .map(|entry| locate_sheet(entry, &relationships, base_dir))
            .collect::<Result<Vec<_>>>()?;

        let shared_strings = match read_optional(&mut archive, &shared_strings_part)? {
            Some(content) => parse_shared_strings(content.as_slice())?,
            None => SharedStrings::new(),
        };
        let styles = match read_optional(&mut archive, &styles_part)? {
            Some(content) => parse_styles(content.as_slice())?,
            None => StyleTable::new(),
        };

        info!(
            sheets = sheets.len(),
            shared_strings = shared_strings.len(),
            date_system = ?info.date_system,
            "opened workbook"
        );

        Ok(Self {
            archive: RefCell::new(archive),
            sheets,
            shared_strings,
            styles,
            date_system: info.date_system,
        })
    }

    /// Worksheets in tab order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// The workbook's shared strings table.
    pub fn shared_strings(&self) -> &SharedStrings {
        &self.shared_strings
    }

    /// Number formats of the workbook's cell styles.
    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// Epoch of the workbook's serial dates.
    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    /// Stream one worksheet's markup events through `handler`.
    ///
    /// The handler may borrow the workbook's tables while the sheet is read.
    pub fn read_sheet<H: SheetContentHandler + ?Sized>(&self, sheet: &Sheet, handler: &mut H) -> Result<()> {
        let mut archive = self.archive.borrow_mut();
        let part = archive.by_name(&sheet.part).map_err(|e| part_error(&sheet.part, e))?;
        debug!(part = %sheet.part, size = part.size(), "reading worksheet");
        drive_sheet(BufReader::new(part), handler)
    }
}

fn locate_sheet(entry: SheetEntry, relationships: &[Relationship], base_dir: &str) -> Result<Sheet> {
    let rel = relationships
        .iter()
        .find(|rel| rel.id == entry.relationship_id)
        .ok_or_else(|| {
            ConvertError::PartNotFound(format!(
                "relationship {} of sheet {:?}",
                entry.relationship_id, entry.name
            ))
        })?;
    Ok(Sheet {
        name: entry.name,
        part: resolve_target(base_dir, &rel.target),
    })
}

/// Directory and file name of a part path.
fn split_part(part: &str) -> (&str, &str) {
    part.rsplit_once('/').unwrap_or(("", part))
}

fn part_error(part: &str, err: ZipError) -> ConvertError {
    match err {
        ZipError::FileNotFound => ConvertError::PartNotFound(part.to_string()),
        other => ConvertError::Zip(other),
    }
}

/// Read a whole part into memory.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, part: &str) -> Result<Vec<u8>> {
    let mut file = archive.by_name(part).map_err(|e| part_error(part, e))?;
    let mut content = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut content)?;
    Ok(content)
}

/// Like [`read_part`], but a missing part is `None`.
fn read_optional<R: Read + Seek>(archive: &mut ZipArchive<R>, part: &str) -> Result<Option<Vec<u8>>> {
    match read_part(archive, part) {
        Ok(content) => Ok(Some(content)),
        Err(ConvertError::PartNotFound(_)) => {
            debug!(part, "optional part not present");
            Ok(None)
        },
        Err(e) => Err(e),
    }
}
