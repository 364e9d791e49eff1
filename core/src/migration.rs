//! # Migration Driver
//!
//! Runs one migration from the legacy target to the new one as a fixed
//! sequence of stages, each gating the next:
//!
//! 1. **ConnectivityCheck**: a one-item listing on both targets.
//! 2. **Paginate**: collect every guest id on the source.
//! 3. **FetchDetails**: resolve ids into records and gather sponsors.
//! 4. **ValidateDestinationPortal**: the configured portal must exist.
//! 5. **CreateOnDestination**: replay every record as a creation call.
//!
//! Per-record failures are recorded and the run moves on. Failures that make
//! the rest pointless end the run, and the reason is kept on the
//! [`MigrationOutcome`] next to whatever had been collected.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use guestmig_common::config::{ListingPolicy, RunOptions};
use guestmig_common::directory::GuestDirectory;
use guestmig_common::error::FetchError;
use guestmig_common::guest::{CreationFailure, FailureReason, GuestRecord, SkippedGuest};
use guestmig_common::target::TargetName;
use guestmig_common::{info, success, warn};

pub mod detail;
pub mod pagination;
pub mod portal;

#[cfg(test)]
pub(crate) mod fake;

pub use detail::{DetailBatch, fetch_details, get_guest_detail};
pub use pagination::{PageWalk, list_guest_ids};
pub use portal::{list_portals, portal_exists};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    #[default]
    ConnectivityCheck,
    Paginate,
    FetchDetails,
    ValidateDestinationPortal,
    CreateOnDestination,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::ConnectivityCheck => "connectivity check",
            Stage::Paginate => "guest listing",
            Stage::FetchDetails => "detail fetch",
            Stage::ValidateDestinationPortal => "portal validation",
            Stage::CreateOnDestination => "guest creation",
            Stage::Done => "done",
        };
        f.write_str(label)
    }
}

/// Reasons a run stops before every stage has run.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("{target} target is unreachable: {source}")]
    Unreachable { target: TargetName, source: FetchError },
    #[error("guest listing on {target} stopped after {collected} id(s): {reason}")]
    IncompleteListing {
        target: TargetName,
        collected: usize,
        reason: String,
    },
    #[error("sponsor portal {portal_id} is not available on {target}")]
    PortalNotFound { target: TargetName, portal_id: String },
    #[error("interrupted during {0}")]
    Interrupted(Stage),
}

/// Everything a run produced, complete or not.
#[derive(Debug, Default)]
pub struct MigrationOutcome {
    /// Last stage entered; [`Stage::Done`] when the run finished.
    pub stage: Stage,
    pub listing_complete: bool,
    pub duplicates: usize,
    /// Records fetched from the source, in listing order.
    pub records: Vec<GuestRecord>,
    pub sponsors: BTreeSet<String>,
    pub skipped: Vec<SkippedGuest>,
    pub created: usize,
    pub failures: Vec<CreationFailure>,
    pub abort: Option<MigrationError>,
}

impl MigrationOutcome {
    fn aborted(mut self, err: MigrationError) -> Self {
        self.abort = Some(err);
        self
    }

    pub fn is_success(&self) -> bool {
        self.abort.is_none() && self.failures.is_empty()
    }

    pub fn was_interrupted(&self) -> bool {
        matches!(self.abort, Some(MigrationError::Interrupted(_)))
    }

    /// Records the creation stage never got to.
    pub fn pending(&self) -> usize {
        if self.stage < Stage::CreateOnDestination {
            return 0;
        }
        self.records.len() - self.created - self.failures.len()
    }
}

/// Decides whether guests of a sponsor may be created on the destination.
///
/// Consulted once per distinct sponsor before any creation call. Guests
/// whose sponsor is refused are recorded as failures without a request.
#[async_trait]
pub trait SponsorPolicy: Send + Sync {
    async fn accepts(&self, sponsor: &str, destination: &dyn GuestDirectory) -> bool;
}

pub struct AcceptAllSponsors;

#[async_trait]
impl SponsorPolicy for AcceptAllSponsors {
    async fn accepts(&self, _sponsor: &str, _destination: &dyn GuestDirectory) -> bool {
        true
    }
}

/// Called with the current stage, items handled so far and the stage total.
pub type ProgressHook = Box<dyn Fn(Stage, usize, usize) + Send + Sync>;

/// One-item listing used to confirm a target answers. Returns the total the
/// server reported.
pub async fn probe(directory: &dyn GuestDirectory) -> Result<u64, FetchError> {
    directory.list_guests(1, 1).await.map(|page| page.total)
}

/// Walks the listing of `directory` and applies the configured
/// [`ListingPolicy`] to an incomplete walk.
pub async fn collect_guest_ids(
    directory: &dyn GuestDirectory,
    options: &RunOptions,
) -> Result<PageWalk, MigrationError> {
    let walk = list_guest_ids(directory, options.page_size, options.max_pages).await;
    if walk.complete {
        return Ok(walk);
    }

    let reason = walk
        .stop
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown error".to_string());
    match options.listing_policy {
        ListingPolicy::FailFast => Err(MigrationError::IncompleteListing {
            target: directory.name(),
            collected: walk.count,
            reason,
        }),
        ListingPolicy::BestEffort => {
            warn!(
                "listing on {} is incomplete ({reason}); continuing with {} guest id(s)",
                directory.name(),
                walk.count
            );
            Ok(walk)
        }
    }
}

pub struct MigrationDriver<'a> {
    source: &'a dyn GuestDirectory,
    destination: &'a dyn GuestDirectory,
    portal_id: &'a str,
    options: &'a RunOptions,
    sponsor_policy: Box<dyn SponsorPolicy + 'a>,
    stop: Option<Arc<AtomicBool>>,
    on_progress: Option<ProgressHook>,
}

impl<'a> MigrationDriver<'a> {
    pub fn new(
        source: &'a dyn GuestDirectory,
        destination: &'a dyn GuestDirectory,
        portal_id: &'a str,
        options: &'a RunOptions,
    ) -> Self {
        Self {
            source,
            destination,
            portal_id,
            options,
            sponsor_policy: Box::new(AcceptAllSponsors),
            stop: None,
            on_progress: None,
        }
    }

    pub fn with_sponsor_policy(mut self, policy: impl SponsorPolicy + 'a) -> Self {
        self.sponsor_policy = Box::new(policy);
        self
    }

    /// The run stops between two records once `flag` is raised.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    pub fn on_progress(mut self, hook: ProgressHook) -> Self {
        self.on_progress = Some(hook);
        self
    }

    pub async fn run(&self) -> MigrationOutcome {
        let mut outcome = MigrationOutcome::default();

        if let Err(err) = self.check_connectivity().await {
            return outcome.aborted(err);
        }

        outcome.stage = Stage::Paginate;
        self.progress(Stage::Paginate, 0, 0);
        let walk = match collect_guest_ids(self.source, self.options).await {
            Ok(walk) => walk,
            Err(err) => return outcome.aborted(err),
        };
        outcome.listing_complete = walk.complete;
        outcome.duplicates = walk.duplicates;

        if self.stopped() {
            return outcome.aborted(MigrationError::Interrupted(Stage::Paginate));
        }

        outcome.stage = Stage::FetchDetails;
        let total = walk.ids.len();
        self.progress(Stage::FetchDetails, 0, total);
        let report = |handled: usize| self.progress(Stage::FetchDetails, handled, total);
        let batch = fetch_details(
            self.source,
            &walk.ids,
            self.options.fetch_concurrency,
            self.stop.as_ref(),
            &report,
        )
        .await;

        outcome.records = batch.records;
        outcome.sponsors = batch.sponsors;
        outcome.skipped = batch.skipped;
        if !outcome.skipped.is_empty() {
            warn!("{} guest(s) skipped while fetching details", outcome.skipped.len());
        }
        info!(
            "{} guest record(s) fetched from {}, {} distinct sponsor(s)",
            outcome.records.len(),
            self.source.name(),
            outcome.sponsors.len()
        );
        if batch.interrupted {
            return outcome.aborted(MigrationError::Interrupted(Stage::FetchDetails));
        }

        outcome.stage = Stage::ValidateDestinationPortal;
        if !portal_exists(self.destination, self.portal_id).await {
            return outcome.aborted(MigrationError::PortalNotFound {
                target: self.destination.name(),
                portal_id: self.portal_id.to_string(),
            });
        }

        if self.options.dry_run {
            info!("dry run: {} guest(s) would be created on {}", outcome.records.len(), self.destination.name());
            outcome.stage = Stage::Done;
            return outcome;
        }

        outcome.stage = Stage::CreateOnDestination;
        if let Err(err) = self.create_all(&mut outcome).await {
            return outcome.aborted(err);
        }

        outcome.stage = Stage::Done;
        outcome
    }

    async fn check_connectivity(&self) -> Result<(), MigrationError> {
        for directory in [self.source, self.destination] {
            let target = directory.name();
            match probe(directory).await {
                Ok(total) => success!("{target} target reachable ({total} guest(s) reported)"),
                Err(source) => return Err(MigrationError::Unreachable { target, source }),
            }
        }
        Ok(())
    }

    async fn create_all(&self, outcome: &mut MigrationOutcome) -> Result<(), MigrationError> {
        let refused = self.refused_sponsors(&outcome.sponsors).await;
        let destination = self.destination.name();
        let total = outcome.records.len();
        self.progress(Stage::CreateOnDestination, 0, total);

        for (index, record) in outcome.records.iter().enumerate() {
            if self.stopped() {
                return Err(MigrationError::Interrupted(Stage::CreateOnDestination));
            }

            if refused.contains(&record.sponsor_username) {
                outcome.failures.push(CreationFailure {
                    record: record.clone(),
                    reason: FailureReason::SponsorNotAccepted(record.sponsor_username.clone()),
                });
            } else {
                match self.destination.create_guest(record, self.portal_id).await {
                    Ok(()) => {
                        outcome.created += 1;
                        debug!("guest {} created on {destination}", record.id);
                    }
                    Err(err) => {
                        warn!("{destination}: cannot create guest {} ({}): {err}", record.username, record.id);
                        outcome.failures.push(CreationFailure {
                            record: record.clone(),
                            reason: FailureReason::Request(err),
                        });
                    }
                }
            }

            self.progress(Stage::CreateOnDestination, index + 1, total);
        }

        if outcome.failures.is_empty() {
            success!("{} guest(s) created on {destination}", outcome.created);
        } else {
            warn!(
                "{} guest(s) created on {destination}, {} failed",
                outcome.created,
                outcome.failures.len()
            );
        }
        Ok(())
    }

    async fn refused_sponsors(&self, sponsors: &BTreeSet<String>) -> HashSet<String> {
        let mut refused = HashSet::new();
        for sponsor in sponsors {
            if !self.sponsor_policy.accepts(sponsor, self.destination).await {
                warn!("sponsor {sponsor} refused for {}", self.destination.name());
                refused.insert(sponsor.clone());
            }
        }
        refused
    }

    fn stopped(&self) -> bool {
        self.stop.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn progress(&self, stage: Stage, handled: usize, total: usize) {
        if let Some(hook) = &self.on_progress {
            hook(stage, handled, total);
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
