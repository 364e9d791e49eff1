//! # Shared building blocks
//!
//! Types every other crate agrees on: the two named [`target`]s, their
//! [`config`], the [`guest`] record model, the [`error`] taxonomy and the
//! [`directory::GuestDirectory`] port the migration logic is written against.

pub mod config;
pub mod directory;
pub mod error;
pub mod guest;
pub mod macros;
pub mod target;

#[doc(hidden)]
pub use tracing as __tracing;
