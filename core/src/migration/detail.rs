//! # Detail Fetcher
//!
//! Resolves guest identifiers into full records, one request each.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, StreamExt};

use guestmig_common::directory::GuestDirectory;
use guestmig_common::error::FetchError;
use guestmig_common::guest::{GuestRecord, SkippedGuest};
use guestmig_common::warn;

/// Fetches one guest and hands back its sponsor alongside the record.
pub async fn get_guest_detail(
    directory: &dyn GuestDirectory,
    id: &str,
) -> Result<(GuestRecord, String), FetchError> {
    let record = directory.guest_detail(id).await?;
    let sponsor = record.sponsor_username.clone();
    Ok((record, sponsor))
}

/// Everything [`fetch_details`] gathered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailBatch {
    /// Fetched records, in listing order.
    pub records: Vec<GuestRecord>,
    /// Distinct non-empty sponsor usernames.
    pub sponsors: BTreeSet<String>,
    /// Identifiers that could not be fetched.
    pub skipped: Vec<SkippedGuest>,
    /// Set when the stop flag cut the batch short.
    pub interrupted: bool,
}

/// Fetches every id in `ids`, dropping the ones that fail.
///
/// With `concurrency > 1` up to that many requests are in flight; results
/// are still collected in `ids` order. `on_fetched` is called after each id
/// with the number handled so far.
pub async fn fetch_details(
    directory: &dyn GuestDirectory,
    ids: &[String],
    concurrency: usize,
    stop: Option<&Arc<AtomicBool>>,
    on_fetched: &(dyn Fn(usize) + Send + Sync),
) -> DetailBatch {
    let mut batch = DetailBatch::default();
    let target = directory.name();
    let stopped = || stop.is_some_and(|flag| flag.load(Ordering::Relaxed));

    let mut results = stream::iter(ids.iter())
        .map(|id| async move { (id, get_guest_detail(directory, id).await) })
        .buffered(concurrency.max(1));

    let mut handled: usize = 0;
    while let Some((id, result)) = results.next().await {
        handled += 1;
        match result {
            Ok((record, sponsor)) => {
                if !sponsor.is_empty() {
                    batch.sponsors.insert(sponsor);
                }
                batch.records.push(record);
            }
            Err(error) => {
                warn!("{target}: skipping guest {id}: {error}");
                batch.skipped.push(SkippedGuest {
                    id: id.clone(),
                    error,
                });
            }
        }
        on_fetched(handled);

        if stopped() {
            batch.interrupted = handled < ids.len();
            break;
        }
    }

    batch
}
