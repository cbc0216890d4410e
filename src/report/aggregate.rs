//! Combined report generation
//!
//! The combined report is rebuilt from a registry snapshot every time it is
//! needed, so its order always follows registry insertion order no matter
//! in which order workers finished.

use crate::registry::UrlEntry;

/// Width of the `=` rule closing every segment
pub const SEPARATOR_WIDTH: usize = 50;

/// One URL's contribution to the combined report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSegment {
    pub url: String,

    /// Extracted payload, or the error message of a failed fetch
    pub text: String,
}

/// Collects a segment for every entry that carries a payload
///
/// Unfetched entries are skipped; failed entries contribute their error
/// message. A successful fetch that extracted nothing still contributes a
/// segment with empty text.
pub fn collect_segments(entries: &[UrlEntry]) -> Vec<ReportSegment> {
    entries
        .iter()
        .filter_map(|entry| {
            entry.payload.as_ref().map(|text| ReportSegment {
                url: entry.url.clone(),
                text: text.clone(),
            })
        })
        .collect()
}

/// Builds the combined report for a registry snapshot
///
/// Every segment is rendered as a `=== Results from <url> ===` header, the
/// payload and a 50-character `=` rule, with blank lines between parts.
/// The output depends only on `entries`, so repeated calls are identical.
///
/// # Example
///
/// ```
/// use sumi_gather::registry::{Outcome, UrlEntry};
/// use sumi_gather::report::build_report;
///
/// let mut entry = UrlEntry::new("https://ex.com");
/// entry.apply(Outcome::Success("Hello".to_string()));
///
/// let report = build_report(&[entry]);
/// assert!(report.starts_with("\n=== Results from https://ex.com ===\n\nHello\n"));
/// ```
pub fn build_report(entries: &[UrlEntry]) -> String {
    render_segments(&collect_segments(entries))
}

/// Renders already collected segments
pub fn render_segments(segments: &[ReportSegment]) -> String {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    let mut parts = Vec::with_capacity(segments.len() * 3);

    for segment in segments {
        parts.push(format!("\n=== Results from {} ===\n", segment.url));
        parts.push(segment.text.clone());
        parts.push(format!("\n{}\n", separator));
    }

    parts.join("\n")
}
