//! Batch coordinator tests: isolation, ordering, progress and cancellation

use super::{create_coordinator, mount_page, mount_status};
use std::sync::Arc;
use std::time::{Duration, Instant};
use sumi_gather::{ExtractionMode, FetchState, ProgressPhase, UrlRegistry};
use wiremock::MockServer;

/// Registers one URL per route on the mock server
fn register_routes(registry: &UrlRegistry, server: &MockServer, routes: &[&str]) -> Vec<String> {
    routes
        .iter()
        .map(|route| {
            registry
                .add_url(&format!("{}{}", server.uri(), route))
                .expect("Failed to add URL")
        })
        .collect()
}

#[tokio::test]
async fn test_failed_url_is_isolated() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/a", "<p>Alpha</p>", 0).await;
    mount_status(&mock_server, "/b", 500).await;
    mount_page(&mock_server, "/c", "<p>Gamma</p>", 0).await;

    let registry = Arc::new(UrlRegistry::new());
    let urls = register_routes(&registry, &mock_server, &["/a", "/b", "/c"]);

    let handle = create_coordinator(&registry, 3).submit(urls.clone(), ExtractionMode::Text);
    let report = handle.finish().await.expect("Batch failed");

    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.succeeded, 2);
    assert_eq!(report.summary.failed, 1);

    let entries = registry.snapshot();
    assert_eq!(entries[0].state, FetchState::Success);
    assert_eq!(entries[0].payload.as_deref(), Some("Alpha"));
    assert_eq!(entries[1].state, FetchState::Error);
    assert_eq!(entries[2].state, FetchState::Success);
    assert_eq!(entries[2].payload.as_deref(), Some("Gamma"));

    // The failing segment shows exactly its error message
    let message = entries[1].error_message.clone().expect("Missing error message");
    assert_eq!(entries[1].payload.as_deref(), Some(message.as_str()));
    assert!(message.contains("500"));
    assert!(report
        .report
        .contains(&format!("=== Results from {} ===\n\n{}\n", urls[1], message)));

    // Every URL contributes a segment
    assert_eq!(report.report.matches("=== Results from ").count(), 3);
}

#[tokio::test]
async fn test_report_order_ignores_completion_order() {
    let mock_server = MockServer::start().await;
    let registry = Arc::new(UrlRegistry::new());
    let urls = register_routes(&registry, &mock_server, &["/one", "/two", "/three"]);

    let delay_orders: [[u64; 3]; 3] = [[0, 150, 300], [300, 150, 0], [150, 300, 0]];
    let mut reports = Vec::new();

    for delays in delay_orders {
        mock_server.reset().await;
        mount_page(&mock_server, "/one", "<h1>One</h1>", delays[0]).await;
        mount_page(&mock_server, "/two", "<h1>Two</h1>", delays[1]).await;
        mount_page(&mock_server, "/three", "<h1>Three</h1>", delays[2]).await;

        registry.reset_payloads();
        let handle = create_coordinator(&registry, 3).submit(urls.clone(), ExtractionMode::Headings);
        reports.push(handle.finish().await.expect("Batch failed").report);
    }

    assert!(reports.iter().all(|report| *report == reports[0]));

    let positions: Vec<usize> = urls
        .iter()
        .map(|url| {
            reports[0]
                .find(&format!("=== Results from {} ===", url))
                .expect("Missing segment")
        })
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(reports[0].contains("H1: One"));
    assert!(reports[0].contains("H1: Three"));
}

#[tokio::test]
async fn test_progress_events() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/x", "<p>x</p>", 50).await;
    mount_status(&mock_server, "/y", 404).await;
    mount_page(&mock_server, "/z", "<p>z</p>", 0).await;

    let registry = Arc::new(UrlRegistry::new());
    let urls = register_routes(&registry, &mock_server, &["/x", "/y", "/z"]);

    let mut handle = create_coordinator(&registry, 2).submit(urls.clone(), ExtractionMode::Text);

    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }
    assert!(handle.try_next_event().is_none());
    handle.finish().await.expect("Batch failed");

    let started = events
        .iter()
        .filter(|event| event.phase == ProgressPhase::Started)
        .count();
    assert_eq!(started, 3);

    let terminal: Vec<_> = events
        .iter()
        .filter(|event| event.phase.is_terminal())
        .collect();
    assert_eq!(terminal.len(), 3);

    // Completion counts grow by one per recorded outcome
    let counts: Vec<usize> = terminal.iter().map(|event| event.completed).collect();
    assert_eq!(counts, vec![1, 2, 3]);
    assert!((terminal[2].percent() - 100.0).abs() < f64::EPSILON);

    for event in &events {
        assert_eq!(event.total, 3);
        assert_eq!(event.url, urls[event.index]);
    }

    let failed: Vec<_> = terminal
        .iter()
        .filter(|event| event.phase == ProgressPhase::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].url, urls[1]);
}

#[tokio::test]
async fn test_concurrency_cap_serializes_fetches() {
    let mock_server = MockServer::start().await;
    for route in ["/s1", "/s2", "/s3"] {
        mount_page(&mock_server, route, "<p>slow</p>", 200).await;
    }

    let registry = Arc::new(UrlRegistry::new());
    let urls = register_routes(&registry, &mock_server, &["/s1", "/s2", "/s3"]);

    let started_at = Instant::now();
    let handle = create_coordinator(&registry, 1).submit(urls, ExtractionMode::Text);
    let report = handle.finish().await.expect("Batch failed");

    assert_eq!(report.summary.succeeded, 3);
    assert!(started_at.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn test_submit_returns_before_batch_finishes() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/slow", "<p>slow</p>", 500).await;

    let registry = Arc::new(UrlRegistry::new());
    let urls = register_routes(&registry, &mock_server, &["/slow"]);

    let handle = create_coordinator(&registry, 1).submit(urls, ExtractionMode::Text);
    assert!(!handle.is_finished());

    let report = handle.finish().await.expect("Batch failed");
    assert_eq!(report.summary.succeeded, 1);
}

#[tokio::test]
async fn test_cancel_mid_batch_keeps_finished_outcomes() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/fast", "<p>Fast</p>", 0).await;
    mount_page(&mock_server, "/stalled", "<p>Stalled</p>", 10_000).await;

    let registry = Arc::new(UrlRegistry::new());
    let urls = register_routes(&registry, &mock_server, &["/fast", "/stalled"]);

    let started_at = Instant::now();
    let mut handle = create_coordinator(&registry, 2).submit(urls.clone(), ExtractionMode::Text);

    while let Some(event) = handle.next_event().await {
        if event.phase == ProgressPhase::Completed {
            assert_eq!(event.url, urls[0]);
            handle.cancel();
        }
    }
    let report = handle.finish().await.expect("Batch failed");

    assert!(started_at.elapsed() < Duration::from_secs(5));
    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.summary.cancelled, 1);

    assert_eq!(registry.get(&urls[0]).unwrap().state, FetchState::Success);
    assert_eq!(registry.get(&urls[1]).unwrap().state, FetchState::Unfetched);
    assert!(report.report.contains("Fast"));
    assert!(!report.report.contains(&urls[1]));
}

#[tokio::test]
async fn test_refetch_overwrites_previous_outcome() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/flaky", 503).await;

    let registry = Arc::new(UrlRegistry::new());
    let urls = register_routes(&registry, &mock_server, &["/flaky"]);
    let coordinator = create_coordinator(&registry, 1);

    coordinator
        .submit(urls.clone(), ExtractionMode::Text)
        .finish()
        .await
        .expect("Batch failed");
    assert_eq!(registry.get(&urls[0]).unwrap().state, FetchState::Error);

    mock_server.reset().await;
    mount_page(&mock_server, "/flaky", "<p>Recovered</p>", 0).await;

    let report = coordinator
        .submit(urls.clone(), ExtractionMode::Text)
        .finish()
        .await
        .expect("Batch failed");

    let entry = registry.get(&urls[0]).unwrap();
    assert_eq!(entry.state, FetchState::Success);
    assert_eq!(entry.payload.as_deref(), Some("Recovered"));
    assert_eq!(entry.error_message, None);
    assert!(!report.report.contains("503"));
}

#[tokio::test]
async fn test_fetch_selected_leaves_others_untouched() {
    let mock_server = MockServer::start().await;
    for route in ["/p0", "/p1", "/p2"] {
        mount_page(&mock_server, route, "<p>page</p>", 0).await;
    }

    let registry = Arc::new(UrlRegistry::new());
    let urls = register_routes(&registry, &mock_server, &["/p0", "/p1", "/p2"]);

    let selected = registry.select(&[2, 0, 7]);
    assert_eq!(selected, vec![urls[2].clone(), urls[0].clone()]);

    let report = create_coordinator(&registry, 2)
        .submit(selected, ExtractionMode::Text)
        .finish()
        .await
        .expect("Batch failed");

    assert_eq!(report.summary.total, 2);
    assert_eq!(registry.get(&urls[1]).unwrap().state, FetchState::Unfetched);

    // Segments still follow registry order, not selection order
    let first = report.report.find(&urls[0]).expect("Missing first segment");
    let last = report.report.find(&urls[2]).expect("Missing last segment");
    assert!(first < last);
    assert!(!report.report.contains(&urls[1]));
}
