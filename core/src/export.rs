//! # CSV Export
//!
//! Writes fetched guest records as CSV, one row per record, with a fixed
//! header. Failed creations get the same columns plus the reason.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use guestmig_common::guest::{CreationFailure, GuestRecord};

/// Header row, in column order.
pub const COLUMNS: [&str; 11] = [
    "username",
    "password",
    "uid",
    "enabled",
    "status",
    "from_date",
    "to_date",
    "valid_days",
    "location",
    "guest_type",
    "sponsor_username",
];

pub const ERROR_COLUMN: &str = "error";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv output failed: {0}")]
    Csv(#[from] csv::Error),
}

fn row(record: &GuestRecord) -> [&str; 11] {
    [
        record.username.as_str(),
        record.password.as_str(),
        record.id.as_str(),
        record.enabled.as_str(),
        record.status.as_str(),
        record.from_date.as_str(),
        record.to_date.as_str(),
        record.valid_days.as_str(),
        record.location.as_str(),
        record.guest_type.as_str(),
        record.sponsor_username.as_str(),
    ]
}

/// Writes the header and one row per record. An empty slice still produces
/// the header.
pub fn write_guests<W: Write>(out: W, records: &[GuestRecord]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.write_record(row(record))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_failures<W: Write>(out: W, failures: &[CreationFailure]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(COLUMNS.iter().chain([&ERROR_COLUMN]))?;
    for failure in failures {
        let reason = failure.reason.to_string();
        writer.write_record(row(&failure.record).iter().copied().chain([reason.as_str()]))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn create(path: &Path) -> Result<File, ExportError> {
    File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Creates (or truncates) `path` and writes `records` into it.
pub fn export_to_path(path: &Path, records: &[GuestRecord]) -> Result<(), ExportError> {
    write_guests(create(path)?, records)
}

pub fn export_failures_to_path(path: &Path, failures: &[CreationFailure]) -> Result<(), ExportError> {
    write_failures(create(path)?, failures)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
