//! HTTP fetcher and per-URL worker
//!
//! This module handles all HTTP requests, including:
//! - Building the HTTP client with the browser-like user agent and timeout
//! - GET requests for page content
//! - Error classification into network, HTTP and parse failures
//! - Running extraction on the fetched body

use crate::config::FetcherConfig;
use crate::extract::{extract_content, ExtractionMode};
use crate::registry::Outcome;
use reqwest::Client;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Failure of a single page fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, DNS, timeout, invalid URL or body read failure
    #[error("{0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("{status} {reason} for url: {url}")]
    Http {
        status: u16,
        reason: String,
        url: String,
    },

    /// Body could not be interpreted as markup
    #[error("Could not parse response body: {0}")]
    Parse(String),
}

/// Coarse classification of a [`FetchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Network,
    Http,
    Parse,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) => FailureKind::Network,
            Self::Http { .. } => FailureKind::Http,
            Self::Parse(_) => FailureKind::Parse,
        }
    }

    /// Classifies a reqwest error raised while sending or reading
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Network(format!("Request timed out: {}", error))
        } else if error.is_connect() {
            Self::Network(format!("Connection failed: {}", error))
        } else if error.is_decode() {
            Self::Parse(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration (user agent and timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_gather::config::FetcherConfig;
/// use sumi_gather::harvest::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body with a single GET request
///
/// # Returns
///
/// * `Ok(String)` - The response body of a 2xx response
/// * `Err(FetchError)` - Classified failure; never retried
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            url: url.to_string(),
        });
    }

    response.text().await.map_err(FetchError::from_reqwest)
}

/// Fetches one URL and extracts its content
///
/// Every failure is converted into an [`Outcome::Error`] carrying
/// `Error fetching <url>: <reason>`, so nothing escapes a single worker.
/// A panic inside extraction is caught and reported as a parse failure.
pub async fn run_worker(client: &Client, url: &str, mode: ExtractionMode) -> Outcome {
    match fetch_and_extract(client, url, mode).await {
        Ok(text) => {
            tracing::debug!("Extracted {} bytes of {} from {}", text.len(), mode, url);
            Outcome::Success(text)
        }
        Err(e) => {
            tracing::debug!("Fetch failed for {} ({:?}): {}", url, e.kind(), e);
            Outcome::Error(format!("Error fetching {}: {}", url, e))
        }
    }
}

async fn fetch_and_extract(
    client: &Client,
    url: &str,
    mode: ExtractionMode,
) -> Result<String, FetchError> {
    let base_url =
        Url::parse(url).map_err(|e| FetchError::Network(format!("Invalid URL '{}': {}", url, e)))?;

    let body = fetch_page(client, &base_url).await?;

    catch_unwind(AssertUnwindSafe(|| extract_content(&body, &base_url, mode)))
        .map_err(|_| FetchError::Parse("extraction aborted on malformed markup".to_string()))
}
