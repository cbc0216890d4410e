//! Export tests: a fetched batch written out as text and PDF

use super::{create_coordinator, mount_page};
use std::sync::Arc;
use sumi_gather::config::ExportConfig;
use sumi_gather::report::{export, ExportDocument, ExportError, ExportFormat};
use sumi_gather::{ExtractionMode, UrlRegistry};
use tempfile::TempDir;
use wiremock::MockServer;

#[tokio::test]
async fn test_export_batch_as_text_and_pdf() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/news",
        "<h1>BREAKING NEWS</h1><p>Prices rose \u{2014} again\u{2026}</p>",
        0,
    )
    .await;
    mount_page(&mock_server, "/links", r#"<a href="/home">Home</a>"#, 0).await;

    let registry = Arc::new(UrlRegistry::new());
    let news = registry
        .add_url(&format!("{}/news", mock_server.uri()))
        .unwrap();
    let links = registry
        .add_url(&format!("{}/links", mock_server.uri()))
        .unwrap();
    // Never fetched, so it only appears on the cover page
    registry.add_url("unfetched.example").unwrap();

    let coordinator = create_coordinator(&registry, 2);
    coordinator
        .submit(vec![news], ExtractionMode::Text)
        .finish()
        .await
        .expect("Batch failed");
    let report = coordinator
        .submit(vec![links], ExtractionMode::Links)
        .finish()
        .await
        .expect("Batch failed");

    let temp_dir = TempDir::new().unwrap();
    let document = ExportDocument::from_entries(&report.entries);
    assert_eq!(document.urls.len(), 3);
    assert_eq!(document.segments.len(), 2);

    let text_path = temp_dir.path().join("results.txt");
    export(&document, ExportFormat::Text, &text_path, &ExportConfig::default()).unwrap();
    let written = std::fs::read_to_string(&text_path).unwrap();
    assert_eq!(written, report.report);

    let pdf_path = temp_dir.path().join("results.pdf");
    export(&document, ExportFormat::Pdf, &pdf_path, &ExportConfig::default()).unwrap();
    let bytes = std::fs::read(&pdf_path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    // Cover page plus one page per fetched URL
    let pdf = lopdf::Document::load(&pdf_path).unwrap();
    assert_eq!(pdf.get_pages().len(), 3);
}

#[tokio::test]
async fn test_export_with_nothing_fetched_is_rejected() {
    let registry = UrlRegistry::new();
    registry.add_url("example.com").unwrap();

    let temp_dir = TempDir::new().unwrap();
    let document = ExportDocument::from_entries(&registry.snapshot());

    for (format, name) in [(ExportFormat::Text, "out.txt"), (ExportFormat::Pdf, "out.pdf")] {
        let path = temp_dir.path().join(name);
        let result = export(&document, format, &path, &ExportConfig::default());
        assert!(matches!(result, Err(ExportError::NothingToExport)));
        assert!(!path.exists());
    }
}

#[test]
fn test_missing_embedded_font_falls_back_to_builtin() {
    let registry = UrlRegistry::new();
    let url = registry.add_url("example.com").unwrap();
    registry.set_outcome(&url, sumi_gather::Outcome::Success("Hello".to_string()));

    let config = ExportConfig {
        use_embedded_font: true,
        font_path: "/nonexistent/Regular.ttf".to_string(),
        bold_font_path: "/nonexistent/Bold.ttf".to_string(),
    };

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("fallback.pdf");
    let document = ExportDocument::from_entries(&registry.snapshot());

    export(&document, ExportFormat::Pdf, &path, &config).unwrap();
    assert!(path.exists());
}
