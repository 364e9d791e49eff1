//! # Guest user codec
//!
//! Reading the listing and detail documents, and writing the document the
//! creation endpoint expects.

use guestmig_common::guest::{GuestRecord, PageResult};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::{CodecError, xml};

/// Prepended to every username re-created on the destination.
pub const USERNAME_PREFIX: &str = "guest";

// The server assigns the real id and ignores these two.
const PLACEHOLDER_ID: &str = "123456";
const DESCRIPTION: &str = "ERS Example user ";

const ROOT: &str = "ns0:guestuser";
const ROOT_LOCAL_NAME: &str = "guestuser";
const NAMESPACES: [(&str, &str); 4] = [
    ("xmlns:ns0", "identity.ers.ise.cisco.com"),
    ("xmlns:xs", "http://www.w3.org/2001/XMLSchema"),
    ("xmlns:ns1", "ers.ise.cisco.com"),
    ("xmlns:ers", "ers.ise.cisco.com"),
];

/// Parses one page of `GET /ers/config/guestuser`.
///
/// The root carries the `total` attribute; identifiers are the `id`
/// attributes of elements two levels below it. A missing `total` reads as 0.
pub fn parse_guest_page(body: &str) -> Result<PageResult, CodecError> {
    let mut page = PageResult::default();

    xml::for_each_element(body, |depth, element| {
        match depth {
            0 => {
                if let Some(total) = xml::attribute(element, "total")? {
                    page.total = total.trim().parse().map_err(|_| CodecError::NotANumber {
                        name: "total",
                        value: total.clone(),
                    })?;
                }
            }
            2 => {
                if let Some(id) = xml::attribute(element, "id")?.filter(|id| !id.is_empty()) {
                    page.ids.push(id);
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    Ok(page)
}

/// Parses `GET /ers/config/guestuser/{id}` into a record for `id`.
///
/// Unknown elements are ignored and absent ones leave their field empty. The
/// root must be a `guestuser` element and every element must be closed.
pub fn parse_guest_detail(id: &str, body: &str) -> Result<GuestRecord, CodecError> {
    let mut reader = xml::reader(body);
    let mut record = GuestRecord::new(id);
    let mut path: Vec<String> = Vec::new();
    let mut seen_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = xml::local_name(&e);
                if !seen_root {
                    check_root(&name)?;
                    seen_root = true;
                }
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                if !seen_root {
                    check_root(&xml::local_name(&e))?;
                    seen_root = true;
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| CodecError::Xml(err.to_string()))?;
                if let Some(slot) = field(&mut record, &path) {
                    slot.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(slot) = field(&mut record, &path) {
                    slot.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => {
                xml::ensure_closed(&path)?;
                break;
            }
            Ok(_) => {}
            Err(err) => return Err(CodecError::Xml(err.to_string())),
        }
    }

    if seen_root { Ok(record) } else { Err(CodecError::Empty) }
}

fn check_root(name: &str) -> Result<(), CodecError> {
    if name == ROOT_LOCAL_NAME {
        Ok(())
    } else {
        Err(CodecError::UnexpectedRoot {
            expected: ROOT_LOCAL_NAME,
            found: name.to_string(),
        })
    }
}

/// Maps an element path (root excluded) to the record field it fills.
fn field<'r>(record: &'r mut GuestRecord, path: &[String]) -> Option<&'r mut String> {
    let names: Vec<&str> = path.iter().skip(1).map(String::as_str).collect();
    match names.as_slice() {
        ["guestAccessInfo", "fromDate"] => Some(&mut record.from_date),
        ["guestAccessInfo", "toDate"] => Some(&mut record.to_date),
        ["guestAccessInfo", "validDays"] => Some(&mut record.valid_days),
        ["guestAccessInfo", "location"] => Some(&mut record.location),
        ["guestInfo", "enabled"] => Some(&mut record.enabled),
        ["guestInfo", "password"] => Some(&mut record.password),
        ["guestInfo", "userName"] => Some(&mut record.username),
        ["guestType"] => Some(&mut record.guest_type),
        ["sponsorUserName"] => Some(&mut record.sponsor_username),
        ["status"] => Some(&mut record.status),
        _ => None,
    }
}

/// Builds the body of `POST /ers/config/guestuser` for `record`.
///
/// Values are escaped by the writer. The username gains [`USERNAME_PREFIX`];
/// every other field is copied as is.
pub fn build_creation_payload(record: &GuestRecord, portal_id: &str) -> Result<String, CodecError> {
    let mut writer = Writer::new(Vec::new());

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new(ROOT);
    for namespace in NAMESPACES {
        root.push_attribute(namespace);
    }
    root.push_attribute(("description", DESCRIPTION));
    root.push_attribute(("id", PLACEHOLDER_ID));
    root.push_attribute(("name", record.username.as_str()));
    write(&mut writer, Event::Start(root))?;

    write(&mut writer, Event::Empty(BytesStart::new("customFields")))?;

    write(&mut writer, Event::Start(BytesStart::new("guestAccessInfo")))?;
    text_element(&mut writer, "fromDate", &record.from_date)?;
    text_element(&mut writer, "location", &record.location)?;
    text_element(&mut writer, "toDate", &record.to_date)?;
    text_element(&mut writer, "validDays", &record.valid_days)?;
    write(&mut writer, Event::End(BytesEnd::new("guestAccessInfo")))?;

    let username = format!("{USERNAME_PREFIX}{}", record.username);
    write(&mut writer, Event::Start(BytesStart::new("guestInfo")))?;
    text_element(&mut writer, "enabled", &record.enabled)?;
    text_element(&mut writer, "password", &record.password)?;
    text_element(&mut writer, "userName", &username)?;
    write(&mut writer, Event::End(BytesEnd::new("guestInfo")))?;

    text_element(&mut writer, "guestType", &record.guest_type)?;
    text_element(&mut writer, "portalId", portal_id)?;
    text_element(&mut writer, "sponsorUserName", &record.sponsor_username)?;

    write(&mut writer, Event::End(BytesEnd::new(ROOT)))?;

    String::from_utf8(writer.into_inner()).map_err(|err| CodecError::Write(err.to_string()))
}

fn text_element(writer: &mut Writer<Vec<u8>>, tag: &str, value: &str) -> Result<(), CodecError> {
    write(writer, Event::Start(BytesStart::new(tag)))?;
    write(writer, Event::Text(BytesText::new(value)))?;
    write(writer, Event::End(BytesEnd::new(tag)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), CodecError> {
    writer
        .write_event(event)
        .map_err(|err| CodecError::Write(err.to_string()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
