//! Portal listing.

use guestmig_common::guest::PortalSummary;

use crate::{CodecError, xml};

/// Parses `GET /ers/config/portal`. Each resource sits two levels below the
/// root and carries `id`, `name` and `description` attributes.
pub fn parse_portal_page(body: &str) -> Result<Vec<PortalSummary>, CodecError> {
    let mut portals = Vec::new();

    xml::for_each_element(body, |depth, element| {
        if depth != 2 {
            return Ok(());
        }
        let Some(id) = xml::attribute(element, "id")?.filter(|id| !id.is_empty()) else {
            return Ok(());
        };
        portals.push(PortalSummary {
            id,
            name: xml::attribute(element, "name")?.unwrap_or_default(),
            description: xml::attribute(element, "description")?.unwrap_or_default(),
        });
        Ok(())
    })?;

    Ok(portals)
}
