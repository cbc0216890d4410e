//! PDF export
//!
//! Renders the laid-out pages with `lopdf`. Fonts are resolved once when
//! the exporter is created: either the built-in Helvetica family or two
//! embedded TrueType files, depending on `export.use-embedded-font`.
//!
//! Built-in fonts are addressed with single-byte WinAnsi codes, so text is
//! reduced to Latin-1 first. Embedded fonts are written as Type0 fonts with
//! `Identity-H` encoding: text is shown as two-byte glyph ids, and the font
//! carries the advance widths and a `ToUnicode` map of every glyph used.

use crate::config::ExportConfig;
use crate::report::layout::{layout_document, FontWeight, Page, TextRun, PAGE_HEIGHT, PAGE_WIDTH};
use crate::report::sanitize::encode_single_byte;
use crate::report::traits::{ExportDocument, ExportError, ExportResult, Exporter};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use std::path::Path;
use ttf_parser::{Face, GlyphId};

/// Largest number of entries in one `beginbfchar` block
const BFCHAR_BLOCK: usize = 100;

/// Font programs used for the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// Helvetica and Helvetica-Bold from the standard PDF font set
    Builtin,

    /// TrueType font files embedded into the document
    Embedded { regular: Vec<u8>, bold: Vec<u8> },
}

impl FontSource {
    /// Resolves the font choice from configuration
    ///
    /// Falls back to [`FontSource::Builtin`] with a warning when embedding
    /// is requested but a font file cannot be read or is not a TrueType
    /// font.
    pub fn resolve(config: &ExportConfig) -> Self {
        if !config.use_embedded_font {
            return Self::Builtin;
        }

        let (regular, bold) = match (
            std::fs::read(&config.font_path),
            std::fs::read(&config.bold_font_path),
        ) {
            (Ok(regular), Ok(bold)) => (regular, bold),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(
                    "Embedded fonts not available ({}); using Helvetica, which may not support all characters",
                    e
                );
                return Self::Builtin;
            }
        };

        if let Err(e) = Face::parse(&regular, 0).and(Face::parse(&bold, 0)) {
            tracing::warn!(
                "Embedded fonts are not usable TrueType ({}); using Helvetica, which may not support all characters",
                e
            );
            return Self::Builtin;
        }

        Self::Embedded { regular, bold }
    }
}

/// Exports the collected segments as a paginated PDF document
#[derive(Debug, Clone)]
pub struct PdfExporter {
    fonts: FontSource,
}

impl PdfExporter {
    /// Creates an exporter, resolving fonts from `config`
    pub fn new(config: &ExportConfig) -> Self {
        Self::with_fonts(FontSource::resolve(config))
    }

    pub fn with_fonts(fonts: FontSource) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontSource {
        &self.fonts
    }

    /// Builds the in-memory PDF document
    pub fn render(&self, document: &ExportDocument) -> ExportResult<Document> {
        let pages = layout_document(document);

        let mut pdf = Document::with_version("1.5");
        let pages_id = pdf.new_object_id();
        let mut fonts = self.font_pair()?;

        let mut kids = Vec::with_capacity(pages.len());
        for page in &pages {
            let page_id = render_page(&mut pdf, page, pages_id, &mut fonts)?;
            kids.push(Object::from(page_id));
        }

        // Font objects are written last so they cover every glyph drawn
        let regular_id = fonts.regular.write(&mut pdf);
        let bold_id = fonts.bold.write(&mut pdf);
        let resources_id = pdf.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let page_count = kids.len() as i64;
        pdf.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let catalog_id = pdf.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        pdf.trailer.set("Root", catalog_id);

        Ok(pdf)
    }

    fn font_pair(&self) -> ExportResult<FontPair<'_>> {
        Ok(match &self.fonts {
            FontSource::Builtin => FontPair {
                regular: PdfFont::Builtin("Helvetica"),
                bold: PdfFont::Builtin("Helvetica-Bold"),
            },
            FontSource::Embedded { regular, bold } => FontPair {
                regular: PdfFont::Embedded(EmbeddedFont::parse("GatherSans", regular)?),
                bold: PdfFont::Embedded(EmbeddedFont::parse("GatherSans-Bold", bold)?),
            },
        })
    }
}

impl Exporter for PdfExporter {
    fn format_name(&self) -> &'static str {
        "pdf"
    }

    fn export(&self, document: &ExportDocument, path: &Path) -> ExportResult<()> {
        if document.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        let mut pdf = self.render(document)?;
        pdf.compress();
        pdf.save(path)?;

        tracing::info!(
            "Exported {} segments as PDF to {}",
            document.segments.len(),
            path.display()
        );
        Ok(())
    }
}

struct FontPair<'a> {
    regular: PdfFont<'a>,
    bold: PdfFont<'a>,
}

impl<'a> FontPair<'a> {
    fn get_mut(&mut self, weight: FontWeight) -> &mut PdfFont<'a> {
        match weight {
            FontWeight::Regular => &mut self.regular,
            FontWeight::Bold => &mut self.bold,
        }
    }
}

/// One font resource of the document
enum PdfFont<'a> {
    /// Standard Type1 font by base name
    Builtin(&'static str),
    Embedded(EmbeddedFont<'a>),
}

impl PdfFont<'_> {
    /// Encodes `text` as the operand of a `Tj` operator
    fn encode(&mut self, text: &str) -> Object {
        match self {
            Self::Builtin(_) => Object::string_literal(encode_single_byte(text)),
            Self::Embedded(font) => Object::String(font.encode(text), StringFormat::Hexadecimal),
        }
    }

    fn write(&self, pdf: &mut Document) -> ObjectId {
        match self {
            Self::Builtin(base_font) => pdf.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => *base_font,
                "Encoding" => "WinAnsiEncoding",
            }),
            Self::Embedded(font) => font.write(pdf),
        }
    }
}

/// TrueType program shown through glyph ids
struct EmbeddedFont<'a> {
    name: &'static str,
    program: &'a [u8],
    face: Face<'a>,

    /// Glyph id -> character it was first drawn for
    used: BTreeMap<u16, char>,
}

impl<'a> EmbeddedFont<'a> {
    fn parse(name: &'static str, program: &'a [u8]) -> ExportResult<Self> {
        let face = Face::parse(program, 0)
            .map_err(|e| ExportError::Pdf(format!("Invalid TrueType font {}: {}", name, e)))?;

        Ok(Self {
            name,
            program,
            face,
            used: BTreeMap::new(),
        })
    }

    /// Maps `text` to big-endian glyph ids, dropping characters without a glyph
    fn encode(&mut self, text: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(text.len() * 2);

        for c in text.chars() {
            let Some(GlyphId(glyph)) = self.face.glyph_index(c) else {
                tracing::trace!("No glyph for {:?} in {}", c, self.name);
                continue;
            };
            self.used.entry(glyph).or_insert(c);
            bytes.extend_from_slice(&glyph.to_be_bytes());
        }

        bytes
    }

    /// Converts font units to PDF glyph space (1000 units per em)
    fn scale(&self, value: f32) -> i64 {
        (value * 1000.0 / f32::from(self.face.units_per_em())).round() as i64
    }

    /// `W` array entries of the form `gid [width]` for every used glyph
    fn widths(&self) -> Vec<Object> {
        let mut widths = Vec::with_capacity(self.used.len() * 2);
        for &glyph in self.used.keys() {
            let advance = self.face.glyph_hor_advance(GlyphId(glyph)).unwrap_or(0);
            widths.push(Object::from(glyph));
            widths.push(Object::Array(vec![self.scale(f32::from(advance)).into()]));
        }
        widths
    }

    /// Character map from glyph ids back to Unicode, for text extraction
    fn to_unicode_cmap(&self) -> String {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );

        let entries: Vec<(u16, char)> = self.used.iter().map(|(&g, &c)| (g, c)).collect();
        for block in entries.chunks(BFCHAR_BLOCK) {
            cmap.push_str(&format!("{} beginbfchar\n", block.len()));
            for &(glyph, c) in block {
                let mut units = [0u16; 2];
                let utf16: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|unit| format!("{:04X}", unit))
                    .collect();
                cmap.push_str(&format!("<{:04X}> <{}>\n", glyph, utf16));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
        cmap
    }

    fn write(&self, pdf: &mut Document) -> ObjectId {
        let file_id = pdf.add_object(Stream::new(
            dictionary! { "Length1" => self.program.len() as i64 },
            self.program.to_vec(),
        ));

        let bbox = self.face.global_bounding_box();
        let ascent = self.scale(f32::from(self.face.ascender()));
        let cap_height = self
            .face
            .capital_height()
            .map(|height| self.scale(f32::from(height)))
            .unwrap_or(ascent);

        let descriptor_id = pdf.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => self.name,
            "Flags" => 32,
            "FontBBox" => vec![
                self.scale(f32::from(bbox.x_min)).into(),
                self.scale(f32::from(bbox.y_min)).into(),
                self.scale(f32::from(bbox.x_max)).into(),
                self.scale(f32::from(bbox.y_max)).into(),
            ],
            "ItalicAngle" => 0,
            "Ascent" => ascent,
            "Descent" => self.scale(f32::from(self.face.descender())),
            "CapHeight" => cap_height,
            "StemV" => 80,
            "FontFile2" => file_id,
        });

        let cid_font_id = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => self.name,
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "W" => self.widths(),
            "CIDToGIDMap" => "Identity",
        });

        let to_unicode_id = pdf.add_object(Stream::new(
            dictionary! {},
            self.to_unicode_cmap().into_bytes(),
        ));

        pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => self.name,
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::from(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        })
    }
}

/// Writes one page's content stream and link annotations
fn render_page(
    pdf: &mut Document,
    page: &Page,
    parent: ObjectId,
    fonts: &mut FontPair<'_>,
) -> ExportResult<ObjectId> {
    let mut operations = Vec::with_capacity(page.runs.len() * 6);
    let mut annotations = Vec::new();

    for run in &page.runs {
        operations.extend(text_operations(run, fonts));

        if let Some(target) = &run.link {
            let annotation_id = pdf.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![
                    run.x.into(),
                    (run.y - 2.0).into(),
                    (run.x + run.width()).into(),
                    (run.y + run.size).into(),
                ],
                "Border" => vec![0.into(), 0.into(), 0.into()],
                "A" => dictionary! {
                    "S" => "URI",
                    "URI" => Object::string_literal(target.as_bytes().to_vec()),
                },
            });
            annotations.push(Object::from(annotation_id));
        }
    }

    let content = Content { operations };
    let content_id = pdf.add_object(Stream::new(dictionary! {}, content.encode()?));

    let mut page_dict = dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    };
    if !annotations.is_empty() {
        page_dict.set("Annots", annotations);
    }

    Ok(pdf.add_object(page_dict))
}

fn text_operations(run: &TextRun, fonts: &mut FontPair<'_>) -> Vec<Operation> {
    let resource = match run.weight {
        FontWeight::Regular => "F1",
        FontWeight::Bold => "F2",
    };
    let (r, g, b): (f32, f32, f32) = if run.link.is_some() {
        (0.0, 0.0, 1.0)
    } else {
        (0.0, 0.0, 0.0)
    };
    let shown = fonts.get_mut(run.weight).encode(&run.text);

    vec![
        Operation::new("BT", vec![]),
        Operation::new("rg", vec![r.into(), g.into(), b.into()]),
        Operation::new("Tf", vec![resource.into(), run.size.into()]),
        Operation::new("Td", vec![run.x.into(), run.y.into()]),
        Operation::new("Tj", vec![shown]),
        Operation::new("ET", vec![]),
    ]
}
