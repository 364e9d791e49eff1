//! # ERS wire format
//!
//! Paths, media types and XML (de)serialization for the guest-user and
//! portal resources of the external RESTful services API.

use guestmig_common::error::FetchError;
use thiserror::Error;

pub mod ers;
pub mod guest;
pub mod portal;

mod xml;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid XML: {0}")]
    Xml(String),
    #[error("document has no root element")]
    Empty,
    #[error("document ends inside <{0}>")]
    Truncated(String),
    #[error("expected <{expected}> as root, found <{found}>")]
    UnexpectedRoot { expected: &'static str, found: String },
    #[error("attribute '{name}' is not a number: {value}")]
    NotANumber { name: &'static str, value: String },
    #[error("cannot write XML: {0}")]
    Write(String),
}

impl From<CodecError> for FetchError {
    fn from(err: CodecError) -> Self {
        FetchError::Parse(err.to_string())
    }
}
