//! Content extraction from fetched HTML
//!
//! Extraction is pure and synchronous: given a page body, the page's own
//! URL (for resolving relative references) and an [`ExtractionMode`], it
//! produces a text payload. Markup is parsed with the tolerant HTML5 parser
//! from `scraper`, so malformed input never fails; a page without matching
//! elements yields an empty string.

mod rules;

pub use rules::{extract_headings, extract_images, extract_links, extract_tables, extract_text};

use scraper::Html;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Category of content pulled from every page of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Paragraph and heading text
    #[default]
    Text,
    /// Anchors with their resolved targets
    Links,
    /// Images with their resolved sources and alt text
    Images,
    /// Headings grouped by level
    Headings,
    /// Table rows
    Tables,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Links => "links",
            Self::Images => "images",
            Self::Headings => "headings",
            Self::Tables => "tables",
        }
    }

    /// Returns all modes in menu order
    pub fn all_modes() -> [Self; 5] {
        [
            Self::Text,
            Self::Links,
            Self::Images,
            Self::Headings,
            Self::Tables,
        ]
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all_modes()
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown extraction mode: {}", s))
    }
}

/// Parses `html` and extracts content according to `mode`
///
/// # Arguments
///
/// * `html` - The page body
/// * `base_url` - The page URL, used to resolve relative links and image sources
/// * `mode` - The content category to extract
///
/// # Example
///
/// ```
/// use sumi_gather::extract::{extract_content, ExtractionMode};
/// use url::Url;
///
/// let base = Url::parse("https://ex.com").unwrap();
/// let links = extract_content(r#"<a href="/x">Go</a>"#, &base, ExtractionMode::Links);
/// assert_eq!(links, "https://ex.com/x (Go)");
/// ```
pub fn extract_content(html: &str, base_url: &Url, mode: ExtractionMode) -> String {
    let document = Html::parse_document(html);
    extract_from_document(&document, base_url, mode)
}

/// Extracts content from an already parsed document
pub fn extract_from_document(document: &Html, base_url: &Url, mode: ExtractionMode) -> String {
    match mode {
        ExtractionMode::Text => extract_text(document),
        ExtractionMode::Links => extract_links(document, base_url),
        ExtractionMode::Images => extract_images(document, base_url),
        ExtractionMode::Headings => extract_headings(document),
        ExtractionMode::Tables => extract_tables(document),
    }
}
