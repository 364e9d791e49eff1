//! Endpoint paths and media types.

pub const GUEST_MEDIA_TYPE: &str = "application/vnd.com.cisco.ise.identity.guestuser.2.0+xml";
pub const GUEST_CONTENT_TYPE: &str =
    "application/vnd.com.cisco.ise.identity.guestuser.2.0+xml; charset=utf-8";
pub const PORTAL_MEDIA_TYPE: &str = "application/vnd.com.cisco.ise.identity.portal.2.0+xml";
pub const SPONSOR_PORTAL_MEDIA_TYPE: &str =
    "application/vnd.com.cisco.ise.identity.sponsorportal.1.0+xml";

pub const GUEST_COLLECTION_PATH: &str = "/ers/config/guestuser";
pub const PORTAL_COLLECTION_PATH: &str = "/ers/config/portal";

pub fn guest_page_path(page: u32, size: u32) -> String {
    format!("{GUEST_COLLECTION_PATH}?page={page}&size={size}")
}

pub fn guest_path(id: &str) -> String {
    format!("{GUEST_COLLECTION_PATH}/{id}")
}

pub fn sponsor_portal_path(portal_id: &str) -> String {
    format!("/ers/config/sponsorportal/{portal_id}")
}
