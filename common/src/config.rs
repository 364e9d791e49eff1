//! # Configuration
//!
//! Connection settings for both targets are read once, from a TOML file and
//! the environment, into a [`Config`] that is then passed by reference to
//! whatever needs it. Nothing here is global.
//!
//! Every file value can be overridden per field with
//! `GUESTMIG_{LEGACY,NEW}_{URL,LOGIN,PASSWORD,PORTAL_ID,INSECURE_TLS}`.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::target::TargetName;

pub const DEFAULT_CONFIG_PATH: &str = "guestmig.toml";

/// Upper bound the management API puts on a listing page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Settings for one side of the migration.
#[derive(Clone, PartialEq, Eq)]
pub struct TargetConfig {
    pub name: TargetName,
    /// Base URL without a trailing slash, e.g. `https://ise.example.net:9060`.
    pub url: String,
    pub login: String,
    pub password: String,
    /// Sponsor portal new guests are attached to. Only the destination needs one.
    pub portal_id: Option<String>,
    /// Skip TLS certificate verification. Off unless asked for.
    pub insecure_tls: bool,
}

impl TargetConfig {
    pub fn require_portal_id(&self) -> Result<&str, ConfigError> {
        self.portal_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingField {
                target: self.name,
                field: "portal_id",
            })
    }
}

impl fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConfig")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("portal_id", &self.portal_id)
            .field("insecure_tls", &self.insecure_tls)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub legacy: TargetConfig,
    pub new: TargetConfig,
}

impl Config {
    /// Loads `path`, or `guestmig.toml` in the working directory when no
    /// path is given and that file exists, then applies the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let contents = match path {
            Some(path) => Some(read_file(path)?),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Some(read_file(default)?)
                } else {
                    None
                }
            }
        };

        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Builds a config from optional TOML text and an environment lookup.
    pub fn from_sources<F>(toml_text: Option<&str>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = match toml_text {
            Some(text) => toml::from_str(text)?,
            None => RawConfig::default(),
        };

        Ok(Self {
            legacy: raw.legacy.resolve(TargetName::Legacy, &env)?,
            new: raw.new.resolve(TargetName::New, &env)?,
        })
    }

    pub fn target(&self, name: TargetName) -> &TargetConfig {
        match name {
            TargetName::Legacy => &self.legacy,
            TargetName::New => &self.new,
        }
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    legacy: RawTarget,
    #[serde(default)]
    new: RawTarget,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTarget {
    url: Option<String>,
    login: Option<String>,
    password: Option<String>,
    portal_id: Option<String>,
    insecure_tls: Option<bool>,
}

impl RawTarget {
    fn resolve<F>(self, name: TargetName, env: &F) -> Result<TargetConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |field: &str| env(&format!("{}_{}", name.env_prefix(), field));
        let required = |value: Option<String>, field: &'static str| {
            value
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingField { target: name, field })
        };

        let url = required(lookup("URL").or(self.url), "url")?;
        let login = required(lookup("LOGIN").or(self.login), "login")?;
        let password = required(lookup("PASSWORD").or(self.password), "password")?;
        let portal_id = lookup("PORTAL_ID").or(self.portal_id);

        let insecure_tls = match lookup("INSECURE_TLS") {
            Some(value) => parse_flag(&format!("{}_INSECURE_TLS", name.env_prefix()), &value)?,
            None => self.insecure_tls.unwrap_or(false),
        };

        Ok(TargetConfig {
            name,
            url: url.trim_end_matches('/').to_string(),
            login,
            password,
            portal_id,
            insecure_tls,
        })
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// What to do when the source listing stops early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingPolicy {
    /// Continue with the identifiers collected so far.
    #[default]
    BestEffort,
    /// Abort the run before touching any record.
    FailFast,
}

/// Knobs for one run, gathered from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Items requested per listing page, clamped to `1..=MAX_PAGE_SIZE`.
    pub page_size: u32,
    /// Stop after this many pages. `0` means no limit.
    pub max_pages: u32,
    pub listing_policy: ListingPolicy,
    /// Detail requests kept in flight at once. `1` is strictly sequential.
    pub fetch_concurrency: usize,
    /// Stop after validating the destination portal; create nothing.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_pages: 0,
            listing_policy: ListingPolicy::BestEffort,
            fetch_concurrency: 1,
            dry_run: false,
        }
    }
}

impl RunOptions {
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}
