//! # Portal Validator

use guestmig_common::directory::GuestDirectory;
use guestmig_common::error::FetchError;
use guestmig_common::guest::PortalSummary;
use guestmig_common::{success, warn};

/// `true` only when the sponsor portal answers with a success status.
pub async fn portal_exists(directory: &dyn GuestDirectory, portal_id: &str) -> bool {
    let target = directory.name();
    match directory.sponsor_portal(portal_id).await {
        Ok(()) => {
            success!("sponsor portal {portal_id} found on {target}");
            true
        }
        Err(FetchError::HttpStatus(404)) => {
            warn!("sponsor portal {portal_id} does not exist on {target}");
            false
        }
        Err(err) => {
            warn!("cannot verify sponsor portal {portal_id} on {target}: {err}");
            false
        }
    }
}

/// Lists the portals configured on `directory`, sorted by name.
pub async fn list_portals(directory: &dyn GuestDirectory) -> Result<Vec<PortalSummary>, FetchError> {
    let mut portals = directory.list_portals().await?;
    portals.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(portals)
}
