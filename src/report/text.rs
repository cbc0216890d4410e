//! Plain-text export
//!
//! Writes the combined report verbatim as UTF-8.

use crate::report::traits::{ExportDocument, ExportError, ExportResult, Exporter};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Exports the combined report as a `.txt` file
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExporter;

impl Exporter for TextExporter {
    fn format_name(&self) -> &'static str {
        "text"
    }

    fn export(&self, document: &ExportDocument, path: &Path) -> ExportResult<()> {
        if document.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        let mut file = File::create(path)?;
        file.write_all(document.report.as_bytes())?;
        file.flush()?;

        tracing::info!(
            "Exported {} segments as text to {}",
            document.segments.len(),
            path.display()
        );
        Ok(())
    }
}
