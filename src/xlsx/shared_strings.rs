//! Parser for `xl/sharedStrings.xml`.
//!
//! Every `<si>` item becomes one entry, in document order. Rich text items
//! are the concatenation of their runs; phonetic runs (`<rPh>`) are
//! ignored since they annotate the text rather than belong to it.

use std::io::BufRead;

use crate::error::Result;
use crate::lookup::SharedStrings;
use crate::sheet::{Attributes, SheetContentHandler};
use crate::xlsx::events::drive_sheet;

/// Read the shared strings table from a part's content.
pub fn parse_shared_strings<R: BufRead>(source: R) -> Result<SharedStrings> {
    let mut collector = StringCollector::default();
    drive_sheet(source, &mut collector)?;
    Ok(collector.strings)
}

#[derive(Default)]
struct StringCollector {
    strings: SharedStrings,
    current: String,
    in_item: bool,
    in_text: bool,
    phonetic_depth: u32,
}

impl SheetContentHandler for StringCollector {
    fn start_element(&mut self, name: &str, _: &Attributes) -> Result<()> {
        match name {
            "si" => {
                self.in_item = true;
                self.current.clear();
            },
            "rPh" => self.phonetic_depth += 1,
            "t" if self.in_item && self.phonetic_depth == 0 => self.in_text = true,
            _ => {},
        }
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        match name {
            "si" => {
                self.in_item = false;
                self.strings.push(std::mem::take(&mut self.current));
            },
            "rPh" => self.phonetic_depth = self.phonetic_depth.saturating_sub(1),
            "t" => self.in_text = false,
            _ => {},
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if self.in_text {
            self.current.push_str(text);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::SharedStringLookup;

    #[test]
    fn test_plain_rich_and_phonetic_items() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4">
  <si><t>Name</t></si>
  <si><t xml:space="preserve"> padded </t></si>
  <si><r><rPr><b/></rPr><t>Bold</t></r><r><t xml:space="preserve"> and plain</t></r></si>
  <si><t>東京</t><rPh sb="0" eb="2"><t>トウキョウ</t></rPh></si>
  <si><t/></si>
  <si><t>Tom &amp; Jerry</t></si>
</sst>"#;

        let strings = parse_shared_strings(xml.as_bytes()).unwrap();
        assert_eq!(strings.len(), 6);
        assert_eq!(SharedStringLookup::get(&strings, 0), Some("Name"));
        assert_eq!(SharedStringLookup::get(&strings, 1), Some(" padded "));
        assert_eq!(SharedStringLookup::get(&strings, 2), Some("Bold and plain"));
        assert_eq!(SharedStringLookup::get(&strings, 3), Some("東京"));
        assert_eq!(SharedStringLookup::get(&strings, 4), Some(""));
        assert_eq!(SharedStringLookup::get(&strings, 5), Some("Tom & Jerry"));
        assert_eq!(SharedStringLookup::get(&strings, 6), None);
    }
}
