//! # Guest Records
//!
//! The normalized shape every guest account is reduced to, whatever the
//! exact XML the source instance returned.

use std::fmt;

use crate::error::FetchError;

/// One temporary network-access account.
///
/// Only `id` is guaranteed. Every other field is an opaque string copied
/// from the source and left empty when the source did not send it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GuestRecord {
    /// Identifier assigned by the source instance.
    pub id: String,
    pub username: String,
    pub password: String,
    pub location: String,
    pub from_date: String,
    pub to_date: String,
    pub valid_days: String,
    pub guest_type: String,
    pub enabled: String,
    pub status: String,
    pub sponsor_username: String,
}

impl GuestRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

impl fmt::Debug for GuestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("location", &self.location)
            .field("from_date", &self.from_date)
            .field("to_date", &self.to_date)
            .field("valid_days", &self.valid_days)
            .field("guest_type", &self.guest_type)
            .field("enabled", &self.enabled)
            .field("status", &self.status)
            .field("sponsor_username", &self.sponsor_username)
            .finish()
    }
}

/// One page of the guest listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    pub ids: Vec<String>,
    /// The `total` the server reported for this page. `0` ends pagination.
    pub total: u64,
}

/// A portal as returned by the portal listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// An identifier dropped while fetching details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedGuest {
    pub id: String,
    pub error: FetchError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The destination refused or never answered the creation call.
    Request(FetchError),
    /// The sponsor check vetoed the record; no call was made.
    SponsorNotAccepted(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Request(err) => write!(f, "{err}"),
            FailureReason::SponsorNotAccepted(sponsor) => {
                write!(f, "sponsor '{sponsor}' not accepted by destination")
            }
        }
    }
}

/// A record that could not be created on the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationFailure {
    pub record: GuestRecord,
    pub reason: FailureReason,
}

impl CreationFailure {
    pub fn status(&self) -> Option<u16> {
        match &self.reason {
            FailureReason::Request(err) => err.status(),
            FailureReason::SponsorNotAccepted(_) => None,
        }
    }
}
