//! Parser for `xl/styles.xml`.
//!
//! Only the number formats matter here: the custom `numFmts` codes and the
//! `numFmtId` of each `cellXfs` entry. Fonts, fills and borders are skipped.

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{ConvertError, Result};
use crate::format::NumberFormatMeta;
use crate::lookup::StyleTable;
use crate::xlsx::events::attribute_value;

/// Read the cell style table from a part's content.
pub fn parse_styles<R: BufRead>(source: R) -> Result<StyleTable> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);

    let mut custom_formats = HashMap::new();
    let mut format_ids = Vec::new();
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"numFmts" => parse_number_formats(&mut reader, &mut custom_formats)?,
                b"cellXfs" => parse_cell_xfs(&mut reader, &mut format_ids)?,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ConvertError::Xml(format!("XML parsing error: {}", e))),
            _ => {},
        }
    }

    Ok(format_ids
        .into_iter()
        .map(|id| NumberFormatMeta::new(id, custom_formats.get(&id).cloned()))
        .collect::<Vec<_>>()
        .into())
}

/// Parse the custom number formats section.
fn parse_number_formats<R: BufRead>(
    reader: &mut Reader<R>,
    formats: &mut HashMap<u32, String>,
) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"numFmt" => {
                let mut id = None;
                let mut code = None;

                for attr in e.attributes().flatten() {
                    match attr.key.local_name().as_ref() {
                        b"numFmtId" => {
                            id = atoi_simd::parse::<u32, false, false>(&attr.value).ok();
                        },
                        b"formatCode" => {
                            code = Some(attribute_value(&reader, &attr)?);
                        },
                        _ => {},
                    }
                }

                if let (Some(id), Some(code)) = (id, code) {
                    formats.insert(id, code);
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"numFmts" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(ConvertError::Xml(format!("XML error in numFmts: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

/// Parse the cell formats section, one number format id per `xf`.
fn parse_cell_xfs<R: BufRead>(reader: &mut Reader<R>, format_ids: &mut Vec<u32>) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"xf" => {
                format_ids.push(number_format_id(&e));
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"cellXfs" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(ConvertError::Xml(format!("XML error in cellXfs: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

/// `numFmtId` of an `xf` element; General (0) when absent.
fn number_format_id(e: &BytesStart<'_>) -> u32 {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"numFmtId")
        .and_then(|attr| atoi_simd::parse::<u32, false, false>(&attr.value).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::StyleLookup;

    #[test]
    fn test_parse_cell_formats() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="2">
    <numFmt numFmtId="164" formatCode="yyyy\-mm\-dd"/>
    <numFmt numFmtId="165" formatCode="&quot;Total:&quot; 0.00"/>
  </numFmts>
  <fonts count="1"><font><sz val="11"/></font></fonts>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0"/></cellStyleXfs>
  <cellXfs count="5">
    <xf numFmtId="0" fontId="0" xfId="0"/>
    <xf numFmtId="14" fontId="0" xfId="0" applyNumberFormat="1"/>
    <xf numFmtId="164" fontId="0" xfId="0" applyNumberFormat="1"/>
    <xf numFmtId="165" fontId="0" xfId="0" applyNumberFormat="1"/>
    <xf fontId="0" xfId="0"><alignment wrapText="1"/></xf>
  </cellXfs>
</styleSheet>"#;

        let styles = parse_styles(xml.as_bytes()).unwrap();
        assert_eq!(styles.style_count(), 5);

        let general = styles.get(0).unwrap();
        assert_eq!(general.code.as_deref(), Some("General"));
        assert!(!general.is_date_time());

        assert!(styles.get(1).unwrap().is_date_time());

        let custom_date = styles.get(2).unwrap();
        assert_eq!(custom_date.code.as_deref(), Some("yyyy\\-mm\\-dd"));
        assert!(custom_date.is_date_time());

        let quoted = styles.get(3).unwrap();
        assert_eq!(quoted.code.as_deref(), Some("\"Total:\" 0.00"));
        assert!(!quoted.is_date_time());

        assert_eq!(styles.get(4).unwrap().id, 0);
        assert!(styles.get(5).is_none());
    }

    #[test]
    fn test_no_cell_formats() {
        let styles = parse_styles("<styleSheet/>".as_bytes()).unwrap();
        assert_eq!(styles.style_count(), 0);
    }
}
