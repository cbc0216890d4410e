//! Page layout for the PDF export
//!
//! Layout is computed independently of the PDF writer: the document is
//! flowed into A4 pages of positioned text runs, with automatic page breaks
//! above the bottom margin. Text widths are estimated from an average glyph
//! width, which is enough for wrapping and centring with the Helvetica
//! family.

use crate::report::sanitize::{classify_line, substitute_special_chars, LineStyle};
use crate::report::traits::ExportDocument;

/// A4 width in points
pub const PAGE_WIDTH: f32 = 595.28;

/// A4 height in points
pub const PAGE_HEIGHT: f32 = 841.89;

/// Average glyph advance as a fraction of the font size
const AVERAGE_CHAR_WIDTH: f32 = 0.55;

/// Converts millimetres to points
fn mm(value: f32) -> f32 {
    value * 72.0 / 25.4
}

fn margin() -> f32 {
    mm(10.0)
}

fn bottom_margin() -> f32 {
    mm(15.0)
}

fn line_height() -> f32 {
    mm(10.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// One line of text placed on a page
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,

    /// Left edge in points
    pub x: f32,

    /// Baseline in points from the bottom of the page
    pub y: f32,

    pub size: f32,
    pub weight: FontWeight,

    /// Target of a hyperlink run, drawn in blue
    pub link: Option<String>,
}

impl TextRun {
    /// Estimated rendered width in points
    pub fn width(&self) -> f32 {
        estimate_width(&self.text, self.size)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

/// Estimates the width of `text` at `size` points
pub fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVERAGE_CHAR_WIDTH
}

/// Word-wraps `text` to at most `max_chars` characters per line
///
/// Words longer than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Flows text into pages, tracking the vertical cursor from the top edge
struct PageFlow {
    pages: Vec<Page>,
    cursor: f32,
}

impl PageFlow {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            cursor: margin(),
        }
    }

    fn add_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = margin();
    }

    fn gap(&mut self, height: f32) {
        self.cursor += height;
    }

    /// Places one single-line cell of `height`, breaking the page first if needed
    fn cell(
        &mut self,
        text: &str,
        size: f32,
        weight: FontWeight,
        align: Align,
        height: f32,
        link: Option<String>,
    ) {
        if self.pages.is_empty() || self.cursor + height > PAGE_HEIGHT - bottom_margin() {
            self.add_page();
        }

        let x = match align {
            Align::Left => margin(),
            Align::Center => ((PAGE_WIDTH - estimate_width(text, size)) / 2.0).max(margin()),
        };
        // Vertically centre the glyphs in the cell
        let baseline_from_top = self.cursor + height / 2.0 + size * 0.35;

        if let Some(page) = self.pages.last_mut() {
            page.runs.push(TextRun {
                text: text.to_string(),
                x,
                y: PAGE_HEIGHT - baseline_from_top,
                size,
                weight,
                link,
            });
        }
        self.cursor += height;
    }

    /// Places text wrapped to the usable page width
    fn paragraph(&mut self, text: &str, size: f32, height: f32) {
        let usable = PAGE_WIDTH - 2.0 * margin();
        let max_chars = (usable / (size * AVERAGE_CHAR_WIDTH)).floor() as usize;

        for line in wrap_text(text, max_chars) {
            self.cell(&line, size, FontWeight::Regular, Align::Left, height, None);
        }
    }

    fn finish(self) -> Vec<Page> {
        self.pages
    }
}

/// Lays out the whole export document
///
/// # Structure
///
/// 1. Cover page: title, generation time and the list of registered URLs
/// 2. One page (or more) per segment, starting with a `Results from:` header
///
/// Payload lines are trimmed, empty lines skipped, and each remaining line
/// is styled by [`classify_line`].
pub fn layout_document(document: &ExportDocument) -> Vec<Page> {
    let mut flow = PageFlow::new();
    let line = line_height();

    flow.add_page();
    flow.cell(
        "Web Scraping Report",
        20.0,
        FontWeight::Bold,
        Align::Center,
        mm(40.0),
        None,
    );
    flow.gap(mm(20.0));
    flow.cell(
        &format!(
            "Generated on: {}",
            document.generated_at.format("%Y-%m-%d %H:%M:%S")
        ),
        14.0,
        FontWeight::Regular,
        Align::Center,
        line,
        None,
    );
    flow.gap(mm(10.0));
    flow.cell("Scraped URLs:", 16.0, FontWeight::Bold, Align::Left, line, None);
    for url in &document.urls {
        flow.cell(
            &format!("- {}", url),
            12.0,
            FontWeight::Regular,
            Align::Left,
            line,
            None,
        );
    }

    for segment in &document.segments {
        flow.add_page();
        flow.cell(
            &format!("Results from: {}", segment.url),
            16.0,
            FontWeight::Bold,
            Align::Left,
            line,
            None,
        );
        flow.gap(mm(10.0));

        let cleaned = substitute_special_chars(&segment.text);
        for raw_line in cleaned.lines() {
            let text = raw_line.trim();
            if text.is_empty() {
                continue;
            }

            match classify_line(text) {
                LineStyle::Heading => {
                    flow.cell(text, 12.0, FontWeight::Bold, Align::Left, line, None)
                }
                LineStyle::Link => flow.cell(
                    text,
                    12.0,
                    FontWeight::Regular,
                    Align::Left,
                    line,
                    Some(link_target(text)),
                ),
                LineStyle::Body => flow.paragraph(text, 12.0, line),
            }
            flow.gap(mm(2.0));
        }
    }

    flow.finish()
}

/// The URL part of a link line such as `https://ex.com/x (Go)`
fn link_target(line: &str) -> String {
    line.split_whitespace().next().unwrap_or(line).to_string()
}
