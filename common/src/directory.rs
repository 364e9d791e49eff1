//! The central **abstraction** over one guest-management endpoint.
//!
//! The walker, the fetcher and the migration driver only ever talk to a
//! [`GuestDirectory`]. The HTTP implementation lives in `guestmig-core`;
//! tests substitute in-memory ones.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::guest::{GuestRecord, PageResult, PortalSummary};
use crate::target::TargetName;

#[async_trait]
pub trait GuestDirectory: Send + Sync {
    /// Which side of the migration this directory talks to.
    fn name(&self) -> TargetName;

    /// Fetches one listing page. Pages start at 1.
    async fn list_guests(&self, page: u32, size: u32) -> Result<PageResult, FetchError>;

    /// Fetches one guest by identifier.
    async fn guest_detail(&self, id: &str) -> Result<GuestRecord, FetchError>;

    /// Succeeds when the sponsor portal resolves.
    async fn sponsor_portal(&self, portal_id: &str) -> Result<(), FetchError>;

    /// Creates `record` attached to `portal_id`.
    async fn create_guest(&self, record: &GuestRecord, portal_id: &str) -> Result<(), FetchError>;

    async fn list_portals(&self) -> Result<Vec<PortalSummary>, FetchError>;
}
