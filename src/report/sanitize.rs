//! Character fallback and line styling for PDF output
//!
//! The built-in PDF fonts use a single-byte encoding, so a fixed set of
//! typographic characters is replaced with plain substitutes before
//! encoding, and anything still outside the single-byte range is dropped.

/// Fixed substitutes for characters the PDF fonts cannot render
const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "--"),
    ('\u{2026}', "..."),
    ('\u{00A0}', " "),
    ('\u{20AC}', "EUR"),
    ('\u{00A3}', "GBP"),
    ('\u{00A5}', "JPY"),
    ('\u{00A9}', "(c)"),
    ('\u{00AE}', "(R)"),
];

/// Longest line, in characters, that still counts as an all-caps heading
const HEADING_MAX_CHARS: usize = 50;

/// Rendering style of one payload line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Bold sub-heading
    Heading,
    /// Blue hyperlink
    Link,
    /// Wrapped body text
    Body,
}

/// Replaces typographic characters with their fixed substitutes
pub fn substitute_special_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

/// Encodes text for a single-byte PDF font
///
/// ASCII and the Latin-1 block from U+00A0 map to their own byte values;
/// every other character is dropped.
pub fn encode_single_byte(text: &str) -> Vec<u8> {
    substitute_special_chars(text)
        .chars()
        .filter_map(|c| match c as u32 {
            code @ 0x20..=0x7E => Some(code as u8),
            code @ 0xA0..=0xFF => Some(code as u8),
            _ => None,
        })
        .collect()
}

/// Classifies a trimmed payload line
///
/// Lines unchanged by upper-casing (including lines without letters) and
/// shorter than 50 characters, and lines ending in `:`, are headings; lines starting with `http://` or `https://` are links.
pub fn classify_line(line: &str) -> LineStyle {
    let all_caps = line.to_uppercase() == line && line.chars().count() < HEADING_MAX_CHARS;

    if all_caps || line.ends_with(':') {
        LineStyle::Heading
    } else if line.starts_with("http://") || line.starts_with("https://") {
        LineStyle::Link
    } else {
        LineStyle::Body
    }
}
