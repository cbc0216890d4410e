//! Fetch worker tests against a mock server

use super::{mount_page, mount_status, test_fetcher_config};
use std::time::Duration;
use sumi_gather::config::DEFAULT_USER_AGENT;
use sumi_gather::harvest::{build_http_client, fetch_page, run_worker, FailureKind, FetchError};
use sumi_gather::{ExtractionMode, Outcome};
use url::Url;
use wiremock::matchers::{headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_page_returns_body() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/page", "<p>Hello</p>", 0).await;

    let client = build_http_client(&test_fetcher_config(5)).unwrap();
    let url = Url::parse(&format!("{}/page", mock_server.uri())).unwrap();

    let body = fetch_page(&client, &url).await.unwrap();
    assert_eq!(body, "<p>Hello</p>");
}

#[tokio::test]
async fn test_fetch_sends_browser_user_agent() {
    let mock_server = MockServer::start().await;

    // wiremock splits header values on commas, and the agent string
    // contains "(KHTML, like Gecko)". Unmatched requests get a 404.
    let agent_parts: Vec<&str> = DEFAULT_USER_AGENT.split(',').map(str::trim).collect();
    assert_eq!(agent_parts.len(), 2);

    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(headers("user-agent", agent_parts))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = build_http_client(&test_fetcher_config(5)).unwrap();
    let url = Url::parse(&format!("{}/ua", mock_server.uri())).unwrap();

    assert_eq!(fetch_page(&client, &url).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_http_error_carries_status() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/missing", 404).await;

    let client = build_http_client(&test_fetcher_config(5)).unwrap();
    let url = Url::parse(&format!("{}/missing", mock_server.uri())).unwrap();

    let error = fetch_page(&client, &url).await.unwrap_err();
    assert_eq!(error.kind(), FailureKind::Http);
    match &error {
        FetchError::Http { status, .. } => assert_eq!(*status, 404),
        other => panic!("Expected HTTP error, got {:?}", other),
    }
    assert!(error.to_string().contains("404"));
}

#[tokio::test]
async fn test_timeout_is_network_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let client = build_http_client(&test_fetcher_config(1)).unwrap();
    let url = Url::parse(&format!("{}/slow", mock_server.uri())).unwrap();

    let error = fetch_page(&client, &url).await.unwrap_err();
    assert_eq!(error.kind(), FailureKind::Network);
}

#[tokio::test]
async fn test_undecodable_body_is_parse_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/garbled"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_bytes(b"this body was never gzipped".to_vec()),
        )
        .mount(&mock_server)
        .await;

    let client = build_http_client(&test_fetcher_config(5)).unwrap();
    let url = Url::parse(&format!("{}/garbled", mock_server.uri())).unwrap();

    let error = fetch_page(&client, &url).await.unwrap_err();
    assert_eq!(error.kind(), FailureKind::Parse);

    match run_worker(&client, url.as_str(), ExtractionMode::Text).await {
        Outcome::Error(message) => {
            assert!(message.starts_with(&format!("Error fetching {}: Could not parse", url)))
        }
        other => panic!("Expected error outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_worker_resolves_links_against_page_url() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/docs/index.html",
        r#"<a href="/about">About</a><a href="guide.html"> </a><a href="https://other.org/x">X</a>"#,
        0,
    )
    .await;

    let client = build_http_client(&test_fetcher_config(5)).unwrap();
    let url = format!("{}/docs/index.html", mock_server.uri());

    let outcome = run_worker(&client, &url, ExtractionMode::Links).await;
    let expected = format!(
        "{base}/about (About)\n{base}/docs/guide.html\nhttps://other.org/x (X)",
        base = mock_server.uri()
    );
    assert_eq!(outcome, Outcome::Success(expected));
}

#[tokio::test]
async fn test_worker_error_message_names_url_and_status() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/broken", 500).await;

    let client = build_http_client(&test_fetcher_config(5)).unwrap();
    let url = format!("{}/broken", mock_server.uri());

    match run_worker(&client, &url, ExtractionMode::Text).await {
        Outcome::Error(message) => {
            assert_eq!(
                message,
                format!(
                    "Error fetching {url}: 500 Internal Server Error for url: {url}",
                    url = url
                )
            );
        }
        other => panic!("Expected error outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_worker_on_empty_page_succeeds_with_empty_text() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/empty", "<html><body></body></html>", 0).await;

    let client = build_http_client(&test_fetcher_config(5)).unwrap();
    let url = format!("{}/empty", mock_server.uri());

    for mode in ExtractionMode::all_modes() {
        let outcome = run_worker(&client, &url, mode).await;
        assert_eq!(outcome, Outcome::Success(String::new()), "mode {}", mode);
    }
}
