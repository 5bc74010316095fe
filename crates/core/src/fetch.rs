//! The fetch boundary.
//!
//! The pipeline never talks to the network directly. It hands a
//! [`FetchPlan`] to a [`Fetcher`] and consumes the [`FetchedResponse`] it
//! returns. [`HttpFetcher`] is the default, reqwest-backed implementation.

#[cfg(feature = "fetch")]
use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "fetch")]
use reqwest::{Client, redirect};
use url::Url;

use crate::rewrite::FetchPlan;
#[cfg(feature = "fetch")]
use crate::rewrite::RedirectPolicy;
use crate::{PagedownError, Result};

/// Performs the request described by a [`FetchPlan`].
///
/// Implementations must honour the plan's redirect policy and send all of
/// its headers. An `Err` means no response was obtained at all; HTTP error
/// statuses are returned as responses and judged by the dispatcher.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, plan: &FetchPlan) -> Result<FetchedResponse>;
}

/// Status, headers and raw body of a fetched resource.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// The URL the response came from (after any followed redirects).
    pub url: Url,
    /// HTTP status code.
    pub status: u16,
    /// Response headers in the order received.
    pub headers: Vec<(String, String)>,
    /// Undecoded response body.
    pub body: Vec<u8>,
}

impl FetchedResponse {
    /// Creates an empty response with the given status.
    pub fn new(url: Url, status: u16) -> Self {
        Self { url, status, headers: Vec::new(), body: Vec::new() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a header value, ignoring the case of `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The declared `Content-Type`, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// HTTP client configuration for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Maximum redirects followed under [`RedirectPolicy::Follow`](crate::rewrite::RedirectPolicy).
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, max_redirects: 10 }
    }
}

/// Parses a conversion target, requiring an absolute http(s) URL.
pub fn parse_target(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| PagedownError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(PagedownError::InvalidUrl(format!(
            "unsupported scheme `{other}`, expected http:// or https://"
        ))),
    }
}

/// Fetcher backed by two reqwest clients, one per redirect policy.
///
/// reqwest fixes the redirect policy per client, so both are built up front
/// and share the same timeout.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    follow: Client,
    manual: Client,
    config: FetchConfig,
}

#[cfg(feature = "fetch")]
impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let follow = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()?;
        let manual = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self { follow, manual, config })
    }

    fn transport_error(&self, err: reqwest::Error) -> PagedownError {
        if err.is_timeout() { PagedownError::Timeout { timeout: self.config.timeout } } else { err.into() }
    }
}

#[cfg(feature = "fetch")]
#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, plan: &FetchPlan) -> Result<FetchedResponse> {
        let client = match plan.redirect() {
            RedirectPolicy::Follow => &self.follow,
            RedirectPolicy::Manual => &self.manual,
        };

        let mut request = client.get(plan.destination().clone());
        for (name, value) in plan.headers() {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let url = response.url().clone();
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?.to_vec();

        Ok(FetchedResponse { url, status, headers, body })
    }
}
