//! Error taxonomy shared by the transport, the codec boundary and the driver.

use std::path::PathBuf;

use thiserror::Error;

use crate::target::TargetName;

/// Why a single call against a target did not produce a usable answer.
///
/// Every variant is local to one request: callers decide whether it aborts
/// the run or just drops one record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("credentials rejected (HTTP 401)")]
    Auth,
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),
    /// Non-success answer to a write, with whatever the server said about it.
    #[error("rejected with HTTP {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Parse(String),
}

impl FetchError {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => FetchError::Auth,
            other => FetchError::HttpStatus(other),
        }
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Auth => Some(401),
            FetchError::HttpStatus(status) | FetchError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown target '{0}' (expected 'legacy' or 'new')")]
    UnknownTarget(String),
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{target} target is missing '{field}'")]
    MissingField { target: TargetName, field: &'static str },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
    #[error("cannot build HTTP client for {target}: {reason}")]
    Client { target: TargetName, reason: String },
}
