//! Translation of quick-xml events into [`SheetContentHandler`] calls.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesRef, BytesStart, Event};

use crate::error::{ConvertError, Result};
use crate::sheet::{Attributes, SheetContentHandler};

/// Stream a worksheet part through `handler`.
///
/// Self-closing elements are reported as an open immediately followed by a
/// close. Character data, CDATA sections and entity references all arrive
/// as [`SheetContentHandler::characters`], untrimmed.
pub fn drive_sheet<R: BufRead, H: SheetContentHandler + ?Sized>(
    source: R,
    handler: &mut H,
) -> Result<()> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::with_capacity(1024);
    let mut attributes = Attributes::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                collect_attributes(&reader, e, &mut attributes)?;
                handler.start_element(&local_name(e)?, &attributes)?;
            },
            Ok(Event::Empty(ref e)) => {
                collect_attributes(&reader, e, &mut attributes)?;
                let name = local_name(e)?;
                handler.start_element(&name, &attributes)?;
                handler.end_element(&name)?;
            },
            Ok(Event::End(ref e)) => {
                let name = e.local_name();
                handler.end_element(utf8(name.as_ref())?)?;
            },
            Ok(Event::Text(ref e)) => handler.characters(utf8(e)?)?,
            Ok(Event::CData(ref e)) => handler.characters(utf8(e)?)?,
            Ok(Event::GeneralRef(ref e)) => handler.characters(&resolve_reference(e)?)?,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ConvertError::Xml(format!(
                    "XML parsing error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            },
            _ => {},
        }
        buf.clear();
    }

    Ok(())
}

fn local_name(e: &BytesStart<'_>) -> Result<String> {
    let name = e.local_name();
    utf8(name.as_ref()).map(str::to_string)
}

fn collect_attributes<R>(
    reader: &Reader<R>,
    e: &BytesStart<'_>,
    attributes: &mut Attributes,
) -> Result<()> {
    attributes.clear();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ConvertError::Xml(e.to_string()))?;
        let value = attribute_value(reader, &attr)?;
        attributes.push(utf8(attr.key.local_name().as_ref())?, value);
    }
    Ok(())
}

/// Decoded and unescaped value of an attribute.
pub(crate) fn attribute_value<R>(reader: &Reader<R>, attr: &Attribute<'_>) -> Result<String> {
    attr.decode_and_unescape_value(reader.decoder())
        .map(|value| value.into_owned())
        .map_err(|e| ConvertError::Xml(format!("Invalid attribute value: {e}")))
}

/// Text of a character or predefined entity reference such as `&#10;` or `&amp;`.
fn resolve_reference(e: &BytesRef<'_>) -> Result<String> {
    if let Some(ch) = e
        .resolve_char_ref()
        .map_err(|e| ConvertError::Xml(e.to_string()))?
    {
        return Ok(ch.to_string());
    }
    let name = utf8(e)?;
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| ConvertError::Xml(format!("Unknown entity reference: &{name};")))
}

#[inline]
fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| ConvertError::Xml(format!("Invalid UTF-8: {e}")))
}
