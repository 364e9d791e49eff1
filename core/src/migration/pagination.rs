//! # Pagination Walker
//!
//! Walks the guest listing of one target page by page and collects guest
//! identifiers.
//!
//! The walk ends cleanly when the server reports a total of zero, returns
//! a page with no unseen identifier, or the page cap is reached. Any failed page ends it early
//! with `complete == false`; there is no retry.

use std::collections::HashSet;

use tracing::debug;

use guestmig_common::config::MAX_PAGE_SIZE;
use guestmig_common::directory::GuestDirectory;
use guestmig_common::error::FetchError;
use guestmig_common::{success, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageWalk {
    /// `false` when a page failed; `ids` then holds what came before it.
    pub complete: bool,
    /// Distinct identifiers in the order they were first seen.
    pub ids: Vec<String>,
    /// Number of entries in `ids`.
    pub count: usize,
    /// Listing calls issued, including a failed one.
    pub requests: u32,
    /// Identifiers the server sent more than once.
    pub duplicates: usize,
    /// What ended an incomplete walk.
    pub stop: Option<FetchError>,
}

/// Collects guest identifiers from `directory`.
///
/// `page_size` is clamped to `1..=100`; `max_pages == 0` means no cap.
pub async fn list_guest_ids(directory: &dyn GuestDirectory, page_size: u32, max_pages: u32) -> PageWalk {
    let size = page_size.clamp(1, MAX_PAGE_SIZE);
    let target = directory.name();
    let mut seen: HashSet<String> = HashSet::new();
    let mut walk = PageWalk::default();
    let mut page: u32 = 1;

    loop {
        walk.requests += 1;
        let result = match directory.list_guests(page, size).await {
            Ok(result) => result,
            Err(err) => {
                report_failure(target, page, &err);
                walk.stop = Some(err);
                break;
            }
        };

        let received = result.ids.len();
        let before = walk.ids.len();
        for id in result.ids {
            if seen.insert(id.clone()) {
                walk.ids.push(id);
            } else {
                walk.duplicates += 1;
                debug!("duplicate guest id {id} on page {page}");
            }
        }
        debug!("page {page} on {target}: {received} ids, total={}, collected={}", result.total, walk.ids.len());

        // A server ignoring `page` would otherwise be walked forever.
        let exhausted = walk.ids.len() == before;
        let capped = max_pages != 0 && page >= max_pages;
        if result.total == 0 || exhausted || capped {
            walk.complete = true;
            break;
        }
        page += 1;
    }

    walk.count = walk.ids.len();

    if walk.duplicates > 0 {
        warn!("{} duplicate guest ids dropped from the {target} listing", walk.duplicates);
    }
    if walk.complete {
        success!("{} guest ids listed on {target} in {} page(s)", walk.count, walk.requests);
    }

    walk
}

fn report_failure(target: impl std::fmt::Display, page: u32, err: &FetchError) {
    match err {
        FetchError::Auth => warn!("{target}: credentials rejected while listing page {page}"),
        FetchError::Timeout => warn!("{target}: listing page {page} timed out"),
        other => warn!("{target}: listing page {page} failed: {other}"),
    }
}
