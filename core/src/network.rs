//! Talking to a management endpoint over HTTPS.

pub mod client;

pub use client::{ErsClient, Timeouts};
