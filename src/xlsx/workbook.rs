//! Parsers for `xl/workbook.xml` and package relationship parts.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::coerce::DateSystem;
use crate::error::{ConvertError, Result};
use crate::xlsx::events::attribute_value;

/// A worksheet declared in the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    /// Display name of the sheet
    pub name: String,
    /// Relationship id pointing at the sheet part
    pub relationship_id: String,
}

/// Workbook-level metadata.
#[derive(Debug, Clone, Default)]
pub struct WorkbookInfo {
    /// Worksheets in tab order
    pub sheets: Vec<SheetEntry>,
    /// Epoch of serial dates
    pub date_system: DateSystem,
}

/// One `<Relationship>` of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship id, referenced from the source part (e.g. `rId1`)
    pub id: String,
    /// Relationship type URI
    pub kind: String,
    /// Target path, relative to the source part's directory unless absolute
    pub target: String,
}

/// Parse workbook.xml content.
pub fn parse_workbook<R: BufRead>(source: R) -> Result<WorkbookInfo> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);

    let mut info = WorkbookInfo::default();
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"workbookPr" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"date1904"
                            && matches!(attr.value.as_ref(), b"1" | b"true")
                        {
                            info.date_system = DateSystem::Excel1904;
                        }
                    }
                },
                b"sheet" => {
                    let mut name = None;
                    let mut relationship_id = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"name" => {
                                name = Some(attribute_value(&reader, &attr)?);
                            },
                            // r:id; the prefix varies between writers
                            b"id" => {
                                relationship_id = Some(attribute_value(&reader, &attr)?);
                            },
                            _ => {},
                        }
                    }
                    match (name, relationship_id) {
                        (Some(name), Some(relationship_id)) => info.sheets.push(SheetEntry {
                            name,
                            relationship_id,
                        }),
                        _ => {
                            return Err(ConvertError::Xml(
                                "sheet element without name or r:id".to_string(),
                            ));
                        },
                    }
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ConvertError::Xml(format!("XML error in workbook: {}", e))),
            _ => {},
        }
    }

    Ok(info)
}

/// Parse a `.rels` part.
pub fn parse_relationships<R: BufRead>(source: R) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);

    let mut relationships = Vec::new();
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let (mut id, mut kind, mut target) = (String::new(), String::new(), String::new());
                for attr in e.attributes().flatten() {
                    let slot = match attr.key.local_name().as_ref() {
                        b"Id" => &mut id,
                        b"Type" => &mut kind,
                        b"Target" => &mut target,
                        _ => continue,
                    };
                    *slot = attribute_value(&reader, &attr)?;
                }
                relationships.push(Relationship { id, kind, target });
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ConvertError::Xml(format!("XML error in relationships: {}", e))),
            _ => {},
        }
    }

    Ok(relationships)
}

/// Resolve a relationship target against the directory of its source part.
///
/// `resolve_target("xl", "worksheets/sheet1.xml")` is
/// `xl/worksheets/sheet1.xml`; absolute targets are taken from the package
/// root and `..` segments climb out of the directory.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    let (mut segments, relative) = match target.strip_prefix('/') {
        Some(absolute) => (Vec::new(), absolute),
        None => (
            base_dir.split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>(),
            target,
        ),
    };

    for segment in relative.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_workbook() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <workbookPr date1904="1"/>
  <bookViews><workbookView activeTab="1"/></bookViews>
  <sheets>
    <sheet name="Sales &amp; Costs" sheetId="1" r:id="rId1"/>
    <sheet name="Notes" sheetId="2" r:id="rId2"/>
  </sheets>
</workbook>"#;

        let info = parse_workbook(xml.as_bytes()).unwrap();
        assert_eq!(info.date_system, DateSystem::Excel1904);
        assert_eq!(
            info.sheets,
            [
                SheetEntry {
                    name: "Sales & Costs".to_string(),
                    relationship_id: "rId1".to_string(),
                },
                SheetEntry {
                    name: "Notes".to_string(),
                    relationship_id: "rId2".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_default_date_system() {
        let info = parse_workbook(r#"<workbook><workbookPr date1904="0"/></workbook>"#.as_bytes()).unwrap();
        assert_eq!(info.date_system, DateSystem::Excel1900);
        assert!(info.sheets.is_empty());
    }

    #[test]
    fn test_parse_relationships() {
        let xml = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="/xl/sharedStrings.xml"/>
</Relationships>"#;
        let rels = parse_relationships(xml.as_bytes()).unwrap();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].id, "rId1");
        assert!(rels[1].kind.ends_with("/sharedStrings"));
        assert_eq!(rels[1].target, "/xl/sharedStrings.xml");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("xl", "worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("xl", "/xl/styles.xml"), "xl/styles.xml");
        assert_eq!(resolve_target("xl/worksheets", "../sharedStrings.xml"), "xl/sharedStrings.xml");
        assert_eq!(resolve_target("", "xl/workbook.xml"), "xl/workbook.xml");
    }
}
