//! Report module for aggregating and exporting batch results
//!
//! This module handles:
//! - Building the combined report in registry order
//! - Exporting it as plain text
//! - Exporting the per-URL segments as a paginated PDF

pub mod aggregate;
pub mod layout;
mod pdf;
pub mod sanitize;
mod text;
mod traits;

pub use aggregate::{build_report, collect_segments, render_segments, ReportSegment};
pub use pdf::{FontSource, PdfExporter};
pub use text::TextExporter;
pub use traits::{ExportDocument, ExportError, ExportResult, Exporter};

use crate::config::ExportConfig;
use std::path::Path;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Pdf,
}

/// Exports `document` to `path` in the given format
///
/// # Returns
///
/// * `Ok(())` - The file was written
/// * `Err(ExportError)` - Nothing to export, or writing failed; the
///   registry is never affected
pub fn export(
    document: &ExportDocument,
    format: ExportFormat,
    path: &Path,
    config: &ExportConfig,
) -> ExportResult<()> {
    let exporter: Box<dyn Exporter> = match format {
        ExportFormat::Text => Box::new(TextExporter),
        ExportFormat::Pdf => Box::new(PdfExporter::new(config)),
    };

    tracing::debug!(
        "Exporting {} segments as {}",
        document.segments.len(),
        exporter.format_name()
    );
    exporter.export(document, path)
}
