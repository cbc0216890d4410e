//! Integration tests for the fetch-and-extract pipeline
//!
//! These tests use wiremock to create mock HTTP servers and drive real
//! batches end-to-end through the registry, coordinator and exporters.

mod batch_tests;
mod export_tests;
mod fetcher_tests;

use std::sync::Arc;
use sumi_gather::config::FetcherConfig;
use sumi_gather::harvest::build_http_client;
use sumi_gather::{BatchCoordinator, UrlRegistry};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fetcher settings for tests: short timeout, default user agent
pub fn test_fetcher_config(timeout_secs: u64) -> FetcherConfig {
    FetcherConfig {
        timeout_secs,
        ..Default::default()
    }
}

/// Creates a coordinator over `registry` with the given concurrency cap
pub fn create_coordinator(registry: &Arc<UrlRegistry>, concurrency: usize) -> BatchCoordinator {
    let client = build_http_client(&test_fetcher_config(5)).expect("Failed to build client");
    BatchCoordinator::with_client(client, Arc::clone(registry), concurrency)
}

/// Mounts an HTML page at `route`
pub async fn mount_page(server: &MockServer, route: &str, html: &str, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html")
                .set_delay(std::time::Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

/// Mounts a bare status response at `route`
pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
