//! Extraction rules, one per [`ExtractionMode`](super::ExtractionMode)
//!
//! Every rule walks the parsed document in document order and joins its
//! lines with a fixed separator. Absence of matching elements yields an
//! empty string.

use scraper::{ElementRef, Html, Selector};
use url::Url;

const HEADING_LEVELS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Builds a selector from a literal that is known to be valid
fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Collects and trims the text of an element and its descendants
fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolves an attribute value against the page URL
///
/// Values that already carry an `http://` or `https://` scheme are kept
/// verbatim. Everything else is joined onto `base_url`; a value that
/// cannot be joined is returned unchanged.
fn resolve_reference(reference: &str, base_url: &Url) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return reference.to_string();
    }

    match base_url.join(reference) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            tracing::trace!("Keeping unresolvable reference {:?}: {}", reference, e);
            reference.to_string()
        }
    }
}

/// Extracts paragraph and heading text
///
/// # Rules
///
/// - `<p>` and `<h1>`..`<h6>` elements in document order
/// - Each element's text is trimmed; empty results are dropped
/// - Remaining blocks are separated by a blank line
pub fn extract_text(document: &Html) -> String {
    let Some(blocks) = selector("p, h1, h2, h3, h4, h5, h6") else {
        return String::new();
    };

    document
        .select(&blocks)
        .map(|element| element_text(&element))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Extracts every anchor that carries an `href`
///
/// Each line is `"<resolved-url> (<text>)"`, or just `"<resolved-url>"`
/// when the anchor has no visible text.
pub fn extract_links(document: &Html, base_url: &Url) -> String {
    let Some(anchors) = selector("a[href]") else {
        return String::new();
    };

    document
        .select(&anchors)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let target = resolve_reference(href, base_url);
            let text = element_text(&element);

            Some(if text.is_empty() {
                target
            } else {
                format!("{} ({})", target, text)
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts every image that carries a `src`
///
/// Each line is `"<resolved-url> (Alt: <alt>)"`. A missing `alt` attribute
/// reads as `No alt text`; a present but empty one is kept empty.
pub fn extract_images(document: &Html, base_url: &Url) -> String {
    let Some(images) = selector("img[src]") else {
        return String::new();
    };

    document
        .select(&images)
        .filter_map(|element| {
            let src = element.value().attr("src")?;
            let alt = element.value().attr("alt").unwrap_or("No alt text");
            Some(format!(
                "{} (Alt: {})",
                resolve_reference(src, base_url),
                alt
            ))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts headings grouped by level
///
/// All `<h1>` elements come first, then all `<h2>`, and so on; document
/// order applies only within a level. Lines read `"H<n>: <text>"`.
pub fn extract_headings(document: &Html) -> String {
    let mut headings = Vec::new();

    for level in HEADING_LEVELS {
        let Some(level_selector) = selector(level) else {
            continue;
        };
        let label = level.to_uppercase();

        for element in document.select(&level_selector) {
            let text = element_text(&element);
            if !text.is_empty() {
                headings.push(format!("{}: {}", label, text));
            }
        }
    }

    headings.join("\n")
}

/// Extracts the rows of every table
///
/// Each table contributes a `=== TABLE <n> ===` marker (numbered from 1 in
/// document order), one `" | "`-joined line of trimmed `td`/`th` texts per
/// row, and a trailing blank part. All parts are joined with newlines.
pub fn extract_tables(document: &Html) -> String {
    let (Some(tables), Some(rows), Some(cells)) =
        (selector("table"), selector("tr"), selector("td, th"))
    else {
        return String::new();
    };

    let mut parts = Vec::new();

    for (number, table) in document.select(&tables).enumerate() {
        parts.push(format!("\n=== TABLE {} ===\n", number + 1));

        for row in table.select(&rows) {
            let line = row
                .select(&cells)
                .map(|cell| element_text(&cell))
                .collect::<Vec<_>>()
                .join(" | ");
            parts.push(line);
        }

        parts.push("\n".to_string());
    }

    parts.join("\n")
}
