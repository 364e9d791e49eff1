use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::CodecError;

/// Leading and trailing whitespace inside leaf elements is preserved.
pub(crate) fn reader(xml: &str) -> Reader<&[u8]> {
    Reader::from_str(xml)
}

pub(crate) fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Looks an attribute up by local name, ignoring any namespace prefix.
pub(crate) fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, CodecError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| CodecError::Xml(err.to_string()))?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|err| CodecError::Xml(err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Calls `visit` with the nesting depth of every element, root at depth 0.
pub(crate) fn for_each_element<F>(xml: &str, mut visit: F) -> Result<(), CodecError>
where
    F: FnMut(usize, &BytesStart<'_>) -> Result<(), CodecError>,
{
    let mut reader = reader(xml);
    let mut open: Vec<String> = Vec::new();
    let mut seen_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                seen_root = true;
                visit(open.len(), &e)?;
                open.push(local_name(&e));
            }
            Ok(Event::Empty(e)) => {
                seen_root = true;
                visit(open.len(), &e)?;
            }
            Ok(Event::End(_)) => {
                open.pop();
            }
            Ok(Event::Eof) => {
                ensure_closed(&open)?;
                break;
            }
            Ok(_) => {}
            Err(err) => return Err(CodecError::Xml(err.to_string())),
        }
    }

    if seen_root { Ok(()) } else { Err(CodecError::Empty) }
}

/// quick-xml reports `Eof` even with elements still open.
pub(crate) fn ensure_closed(open: &[String]) -> Result<(), CodecError> {
    match open.last() {
        Some(name) => Err(CodecError::Truncated(name.clone())),
        None => Ok(()),
    }
}
