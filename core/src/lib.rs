//! # Guest migration engine
//!
//! * **[`network`]**: the HTTP implementation of the
//!   [`GuestDirectory`](guestmig_common::directory::GuestDirectory) port.
//! * **[`migration`]**: pagination, detail fetching, portal validation and
//!   the driver that sequences them.
//! * **[`export`]**: the CSV row sink.

pub mod export;
pub mod migration;
pub mod network;
