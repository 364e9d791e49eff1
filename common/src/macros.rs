//! Logging shorthands.
//!
//! Thin wrappers over `tracing` so library code reports progress the same
//! way everywhere. `success!` uses its own target so the terminal formatter
//! can render it differently from a plain `info!`.

pub const SUCCESS_TARGET: &str = "guestmig::success";

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: "guestmig::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::__tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::__tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__tracing::error!($($arg)*)
    };
}
