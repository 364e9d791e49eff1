//! # Migration Targets
//!
//! Exactly two management endpoints take part in a migration:
//! * **legacy**: the instance guests are read from.
//! * **new**: the instance guests are re-created on.
//!
//! Names arrive from the command line and the environment, so parsing is
//! case-insensitive and an unknown name is a [`ConfigError`], never a panic.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetName {
    /// Source of the migration.
    Legacy,
    /// Destination of the migration.
    New,
}

impl TargetName {
    pub const ALL: [TargetName; 2] = [TargetName::Legacy, TargetName::New];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetName::Legacy => "legacy",
            TargetName::New => "new",
        }
    }

    /// Prefix used for environment overrides, e.g. `GUESTMIG_LEGACY_URL`.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            TargetName::Legacy => "GUESTMIG_LEGACY",
            TargetName::New => "GUESTMIG_NEW",
        }
    }

    pub fn counterpart(&self) -> TargetName {
        match self {
            TargetName::Legacy => TargetName::New,
            TargetName::New => TargetName::Legacy,
        }
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetName {
    type Err = ConfigError;

    /// Accepts "legacy"/"old"/"source" and "new"/"destination", any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_keyword(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| ConfigError::UnknownTarget(s.to_string()))
    }
}

fn parse_keyword(s_lower: &str) -> Option<TargetName> {
    match s_lower {
        "legacy" | "old" | "source" => Some(TargetName::Legacy),
        "new" | "destination" => Some(TargetName::New),
        _ => None,
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
