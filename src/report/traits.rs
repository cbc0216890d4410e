//! Exporter trait and shared export types
//!
//! Exporters receive an [`ExportDocument`] built from one registry snapshot
//! and write it to a caller-chosen path. A failed export never touches the
//! registry.

use crate::registry::UrlEntry;
use crate::report::aggregate::{collect_segments, render_segments, ReportSegment};
use chrono::{DateTime, Local};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export")]
    NothingToExport,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build PDF: {0}")]
    Pdf(String),
}

impl From<lopdf::Error> for ExportError {
    fn from(error: lopdf::Error) -> Self {
        Self::Pdf(error.to_string())
    }
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Everything an exporter needs, taken from one registry snapshot
#[derive(Debug, Clone)]
pub struct ExportDocument {
    /// Every registered URL, fetched or not, in registry order
    pub urls: Vec<String>,

    /// Segments with a payload, in registry order
    pub segments: Vec<ReportSegment>,

    /// The combined report text
    pub report: String,

    pub generated_at: DateTime<Local>,
}

impl ExportDocument {
    /// Builds an export document stamped with the current local time
    pub fn from_entries(entries: &[UrlEntry]) -> Self {
        Self::from_entries_at(entries, Local::now())
    }

    pub fn from_entries_at(entries: &[UrlEntry], generated_at: DateTime<Local>) -> Self {
        let segments = collect_segments(entries);
        let report = render_segments(&segments);

        Self {
            urls: entries.iter().map(|entry| entry.url.clone()).collect(),
            segments,
            report,
            generated_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Trait for writing an export document to disk
pub trait Exporter {
    /// Short format name used in logs
    fn format_name(&self) -> &'static str;

    /// Writes `document` to `path`
    ///
    /// Returns [`ExportError::NothingToExport`] when the document has no
    /// segments.
    fn export(&self, document: &ExportDocument, path: &Path) -> ExportResult<()>;
}
