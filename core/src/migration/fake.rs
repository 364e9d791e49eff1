//! In-memory directory for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use guestmig_common::directory::GuestDirectory;
use guestmig_common::error::FetchError;
use guestmig_common::guest::{GuestRecord, PageResult, PortalSummary};
use guestmig_common::target::TargetName;

#[derive(Default)]
struct Calls {
    listing_sizes: Vec<u32>,
    details: Vec<String>,
    portal_checks: usize,
    created: Vec<String>,
    create_attempts: usize,
}

pub(crate) struct FakeDirectory {
    name: TargetName,
    pages: Vec<Result<PageResult, FetchError>>,
    details: HashMap<String, Result<GuestRecord, FetchError>>,
    portal: Result<(), FetchError>,
    rejected: HashMap<String, FetchError>,
    interrupt: Option<(Arc<AtomicBool>, usize)>,
    calls: Mutex<Calls>,
}

impl FakeDirectory {
    pub(crate) fn new(name: TargetName) -> Self {
        Self {
            name,
            pages: Vec::new(),
            details: HashMap::new(),
            portal: Ok(()),
            rejected: HashMap::new(),
            interrupt: None,
            calls: Mutex::new(Calls::default()),
        }
    }

    /// Listing answers indexed by page number. Pages past the end are empty.
    pub(crate) fn with_pages(mut self, pages: Vec<Result<PageResult, FetchError>>) -> Self {
        self.pages = pages;
        self
    }

    /// Serves `records` both as a single listing page and as details.
    pub(crate) fn with_guests(self, records: &[GuestRecord]) -> Self {
        let ids = records.iter().map(|r| r.id.clone()).collect();
        let mut dir = self.with_pages(vec![
            Ok(PageResult { ids, total: records.len() as u64 }),
            Ok(PageResult::default()),
        ]);
        for record in records {
            dir.details.insert(record.id.clone(), Ok(record.clone()));
        }
        dir
    }

    pub(crate) fn with_detail_error(mut self, id: &str, err: FetchError) -> Self {
        self.details.insert(id.to_string(), Err(err));
        self
    }

    pub(crate) fn with_portal(mut self, answer: Result<(), FetchError>) -> Self {
        self.portal = answer;
        self
    }

    pub(crate) fn rejecting(mut self, id: &str, err: FetchError) -> Self {
        self.rejected.insert(id.to_string(), err);
        self
    }

    /// Raises `flag` once `after` detail requests have been served.
    pub(crate) fn interrupting(mut self, flag: Arc<AtomicBool>, after: usize) -> Self {
        self.interrupt = Some((flag, after));
        self
    }

    pub(crate) fn listing_calls(&self) -> usize {
        self.calls.lock().unwrap().listing_sizes.len()
    }

    pub(crate) fn requested_sizes(&self) -> Vec<u32> {
        self.calls.lock().unwrap().listing_sizes.clone()
    }

    pub(crate) fn detail_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().details.clone()
    }

    pub(crate) fn portal_checks(&self) -> usize {
        self.calls.lock().unwrap().portal_checks
    }

    pub(crate) fn create_attempts(&self) -> usize {
        self.calls.lock().unwrap().create_attempts
    }

    pub(crate) fn created(&self) -> Vec<String> {
        self.calls.lock().unwrap().created.clone()
    }
}

#[async_trait]
impl GuestDirectory for FakeDirectory {
    fn name(&self) -> TargetName {
        self.name
    }

    async fn list_guests(&self, page: u32, size: u32) -> Result<PageResult, FetchError> {
        self.calls.lock().unwrap().listing_sizes.push(size);
        self.pages
            .get(page.saturating_sub(1) as usize)
            .cloned()
            .unwrap_or_else(|| Ok(PageResult::default()))
    }

    async fn guest_detail(&self, id: &str) -> Result<GuestRecord, FetchError> {
        let served = {
            let mut calls = self.calls.lock().unwrap();
            calls.details.push(id.to_string());
            calls.details.len()
        };
        if let Some((flag, after)) = &self.interrupt {
            if served >= *after {
                flag.store(true, Ordering::Relaxed);
            }
        }
        self.details
            .get(id)
            .cloned()
            .unwrap_or(Err(FetchError::HttpStatus(404)))
    }

    async fn sponsor_portal(&self, _portal_id: &str) -> Result<(), FetchError> {
        self.calls.lock().unwrap().portal_checks += 1;
        self.portal.clone()
    }

    async fn create_guest(&self, record: &GuestRecord, _portal_id: &str) -> Result<(), FetchError> {
        let mut calls = self.calls.lock().unwrap();
        calls.create_attempts += 1;
        match self.rejected.get(&record.id) {
            Some(err) => Err(err.clone()),
            None => {
                calls.created.push(record.id.clone());
                Ok(())
            }
        }
    }

    async fn list_portals(&self) -> Result<Vec<PortalSummary>, FetchError> {
        Ok(Vec::new())
    }
}
