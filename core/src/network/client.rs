//! # ERS HTTP client
//!
//! One [`ErsClient`] per target. Requests are authenticated with HTTP basic
//! auth, bounded by a timeout and attempted exactly once.
//!
//! Listing pages may take a while on large deployments and get the long
//! timeout; every single-resource call gets the short one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use guestmig_common::config::TargetConfig;
use guestmig_common::directory::GuestDirectory;
use guestmig_common::error::{ConfigError, FetchError};
use guestmig_common::guest::{GuestRecord, PageResult, PortalSummary};
use guestmig_common::target::TargetName;
use guestmig_protocols::{ers, guest, portal};

const USER_AGENT: &str = concat!("guestmig/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    /// Whole-request bound for listing pages.
    pub listing: Duration,
    /// Whole-request bound for detail, portal and creation calls.
    pub resource: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            listing: Duration::from_secs(30),
            resource: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErsClient {
    name: TargetName,
    base_url: String,
    login: String,
    password: String,
    http: Client,
    timeouts: Timeouts,
}

impl ErsClient {
    pub fn new(cfg: &TargetConfig) -> Result<Self, ConfigError> {
        Self::with_timeouts(cfg, Timeouts::default())
    }

    pub fn with_timeouts(cfg: &TargetConfig, timeouts: Timeouts) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.listing)
            .danger_accept_invalid_certs(cfg.insecure_tls)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ConfigError::Client {
                target: cfg.name,
                reason: e.to_string(),
            })?;

        if cfg.insecure_tls {
            guestmig_common::warn!("TLS certificate verification is disabled for the {} target", cfg.name);
        }

        Ok(Self {
            name: cfg.name,
            base_url: cfg.url.trim_end_matches('/').to_string(),
            login: cfg.login.clone(),
            password: cfg.password.clone(),
            http,
            timeouts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str, accept: &str, timeout: Duration) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(target: "guestmig::http", "GET {url} ({})", self.name);
        self.http
            .get(url)
            .basic_auth(&self.login, Some(&self.password))
            .header(ACCEPT, accept)
            .timeout(timeout)
    }

    /// Sends `request` and returns the body of a successful answer.
    async fn fetch_text(&self, request: RequestBuilder) -> Result<String, FetchError> {
        let response = send(request).await?;
        response.text().await.map_err(classify)
    }
}

#[async_trait]
impl GuestDirectory for ErsClient {
    fn name(&self) -> TargetName {
        self.name
    }

    async fn list_guests(&self, page: u32, size: u32) -> Result<PageResult, FetchError> {
        let request = self.get(
            &ers::guest_page_path(page, size),
            ers::GUEST_MEDIA_TYPE,
            self.timeouts.listing,
        );
        let body = self.fetch_text(request).await?;
        Ok(guest::parse_guest_page(&body)?)
    }

    async fn guest_detail(&self, id: &str) -> Result<GuestRecord, FetchError> {
        let request = self.get(&ers::guest_path(id), ers::GUEST_MEDIA_TYPE, self.timeouts.resource);
        let body = self.fetch_text(request).await?;
        Ok(guest::parse_guest_detail(id, &body)?)
    }

    async fn sponsor_portal(&self, portal_id: &str) -> Result<(), FetchError> {
        let request = self.get(
            &ers::sponsor_portal_path(portal_id),
            ers::SPONSOR_PORTAL_MEDIA_TYPE,
            self.timeouts.resource,
        );
        send(request).await.map(|_| ())
    }

    async fn create_guest(&self, record: &GuestRecord, portal_id: &str) -> Result<(), FetchError> {
        let body = guest::build_creation_payload(record, portal_id)?;
        let url = format!("{}{}", self.base_url, ers::GUEST_COLLECTION_PATH);
        debug!(target: "guestmig::http", "POST {url} ({}) for guest {}", self.name, record.id);

        let response = self
            .http
            .post(url)
            .basic_auth(&self.login, Some(&self.password))
            .header(CONTENT_TYPE, ers::GUEST_CONTENT_TYPE)
            .header(ACCEPT, ers::GUEST_MEDIA_TYPE)
            .timeout(self.timeouts.resource)
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status.as_u16() == 401 {
            return Err(FetchError::Auth);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(FetchError::Rejected {
            status: status.as_u16(),
            detail: detail.trim().to_string(),
        })
    }

    async fn list_portals(&self) -> Result<Vec<PortalSummary>, FetchError> {
        let request = self.get(
            ers::PORTAL_COLLECTION_PATH,
            ers::PORTAL_MEDIA_TYPE,
            self.timeouts.listing,
        );
        let body = self.fetch_text(request).await?;
        Ok(portal::parse_portal_page(&body)?)
    }
}

async fn send(request: RequestBuilder) -> Result<Response, FetchError> {
    let response = request.send().await.map_err(classify)?;
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::from_status(status.as_u16()))
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(err.to_string())
    }
}
