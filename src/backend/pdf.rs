//! PDF layout backend using lopdf.
//!
//! Walks each page's content stream, tracking the text matrix and current
//! font, and emits one [`TextSpan`] per text-showing operator. Boxes are
//! estimated from font metrics and flipped to top-down coordinates so the
//! outline pipeline sees the same geometry it gets from JSON dumps.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::{LayoutBackend, LayoutDocument, LayoutSource, PageTextSource};
use crate::error::{Error, Result};
use crate::model::{BBox, TextSpan, FLAG_BOLD, FLAG_ITALIC};

/// US Letter height, used when a page has no readable MediaBox.
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Backend for `.pdf` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLayoutBackend;

impl PdfLayoutBackend {
    /// Create a new PDF backend.
    pub fn new() -> Self {
        Self
    }
}

impl LayoutBackend for PdfLayoutBackend {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn LayoutDocument>> {
        Ok(Box::new(PdfLayout::load_file(path)?))
    }
}

/// An opened PDF document.
pub struct PdfLayout {
    doc: LopdfDocument,
    pages: Vec<(u32, ObjectId)>,
}

impl PdfLayout {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_document(LopdfDocument::load(path)?))
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self::from_document(LopdfDocument::load_mem(data)?))
    }

    fn from_document(doc: LopdfDocument) -> Self {
        if doc.is_encrypted() {
            log::warn!("PDF is encrypted; text may not decode");
        }
        let pages = doc.get_pages().into_iter().collect();
        Self { doc, pages }
    }

    fn page_entry(&self, page: usize) -> Result<(u32, ObjectId)> {
        self.pages
            .get(page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.pages.len()))
    }

    /// Get page content stream.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let contents = page_dict.get(b"Contents")?;

        match contents {
            Object::Reference(r) => {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    return Ok(s.decompressed_content()?);
                }
                Err(Error::Layout("Invalid content stream".to_string()))
            }
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            if let Ok(data) = s.decompressed_content() {
                                content.extend_from_slice(&data);
                                content.push(b' ');
                            }
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::Layout("Invalid content stream".to_string())),
        }
    }

    /// MediaBox height, following Parent links for inherited boxes.
    fn page_height(&self, page_id: ObjectId) -> f32 {
        let mut current = Some(page_id);
        // Page trees are shallow; cap the walk in case of reference cycles
        for _ in 0..8 {
            let Some(id) = current else { break };
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };
            if let Some(height) = media_box_height(&self.doc, dict) {
                return height;
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }
        DEFAULT_PAGE_HEIGHT
    }

    fn parse_content_stream(
        &self,
        content: &[u8],
        page: usize,
        page_height: f32,
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    ) -> Result<Vec<TextSpan>> {
        let content = lopdf::content::Content::decode(content)?;

        let base_fonts: HashMap<&[u8], String> = fonts
            .iter()
            .map(|(name, dict)| {
                let base_font = dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_else(|| "Unknown".to_string());
                (name.as_slice(), base_font)
            })
            .collect();

        let mut spans = Vec::new();
        let mut current_font = String::new();
        let mut current_font_name: Vec<u8> = Vec::new();
        let mut current_font_size: f32 = 12.0;
        let mut text_matrix = TextMatrix::default();
        let mut in_text_block = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text_block = true;
                    text_matrix = TextMatrix::default();
                }
                "ET" => {
                    in_text_block = false;
                }
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(font_name) = &op.operands[0] {
                            current_font_name = font_name.clone();
                            current_font = base_fonts
                                .get(font_name.as_slice())
                                .cloned()
                                .unwrap_or_else(|| String::from_utf8_lossy(font_name).to_string());
                        }
                        current_font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        text_matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        text_matrix.set(
                            get_number(&op.operands[0]).unwrap_or(1.0),
                            get_number(&op.operands[1]).unwrap_or(0.0),
                            get_number(&op.operands[2]).unwrap_or(0.0),
                            get_number(&op.operands[3]).unwrap_or(1.0),
                            get_number(&op.operands[4]).unwrap_or(0.0),
                            get_number(&op.operands[5]).unwrap_or(0.0),
                        );
                    }
                }
                "T*" => text_matrix.next_line(),
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        text_matrix.next_line();
                    }
                    if !in_text_block {
                        continue;
                    }
                    let encoding = fonts
                        .get(&current_font_name)
                        .and_then(|f| f.get_font_encoding(&self.doc).ok());
                    let decode = |bytes: &[u8]| match &encoding {
                        Some(enc) => LopdfDocument::decode_text(enc, bytes).unwrap_or_default(),
                        None => decode_text_simple(bytes),
                    };

                    let text = match op.operator.as_str() {
                        "TJ" => match op.operands.first() {
                            Some(Object::Array(arr)) => decode_tj_array(arr, decode),
                            _ => String::new(),
                        },
                        "\"" => match op.operands.get(2) {
                            Some(Object::String(bytes, _)) => decode(bytes),
                            _ => String::new(),
                        },
                        _ => match op.operands.first() {
                            Some(Object::String(bytes, _)) => decode(bytes),
                            _ => String::new(),
                        },
                    };

                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    let (x, y) = text_matrix.get_position();
                    let size = current_font_size * text_matrix.get_scale();
                    spans.push(make_span(text, &current_font, size, x, y, page, page_height));
                }
                _ => {}
            }
        }

        Ok(spans)
    }
}

impl LayoutSource for PdfLayout {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_spans(&self, page: usize) -> Result<Vec<TextSpan>> {
        let (_, page_id) = self.page_entry(page)?;
        let fonts = self.doc.get_page_fonts(page_id)?;
        let content = self.page_content(page_id)?;
        let height = self.page_height(page_id);
        self.parse_content_stream(&content, page, height, &fonts)
    }
}

impl PageTextSource for PdfLayout {
    fn page_text(&self, page: usize) -> Result<String> {
        let (page_num, _) = self.page_entry(page)?;
        Ok(self.doc.extract_text(&[page_num])?)
    }
}

/// Build a span from a baseline position in PDF (bottom-up) coordinates.
fn make_span(
    text: &str,
    font: &str,
    size: f32,
    x: f32,
    baseline: f32,
    page: usize,
    page_height: f32,
) -> TextSpan {
    let lower = font.to_lowercase();
    let mut flags = 0;
    if lower.contains("bold") || lower.contains("black") || lower.contains("heavy") {
        flags |= FLAG_BOLD;
    }
    if lower.contains("italic") || lower.contains("oblique") {
        flags |= FLAG_ITALIC;
    }

    // Approximate ascender/descender and average glyph width
    let top = baseline + size * 0.8;
    let bottom = baseline - size * 0.2;
    let width = text.chars().count() as f32 * size * 0.5;
    let bbox = BBox::new(x, page_height - top, x + width, page_height - bottom);

    TextSpan::new(text, font, size, flags, bbox, page)
}

/// Join a TJ array, turning large negative kerning into word spaces.
fn decode_tj_array(arr: &[Object], decode: impl Fn(&[u8]) -> String) -> String {
    // 200 thousandths of an em reads as a word gap for most fonts
    let space_threshold = 200.0;
    let mut combined = String::new();

    for item in arr {
        let adjustment = match item {
            Object::String(bytes, _) => {
                combined.push_str(&decode(bytes));
                continue;
            }
            Object::Integer(n) => -(*n as f32),
            Object::Real(n) => -*n,
            _ => continue,
        };
        if adjustment > space_threshold
            && !combined.is_empty()
            && !combined.ends_with(' ')
            && !combined.ends_with('\u{00A0}')
            && !combined.chars().last().is_some_and(is_spaceless_script_char)
        {
            combined.push(' ');
        }
    }

    combined
}

fn media_box_height(doc: &LopdfDocument, dict: &Dictionary) -> Option<f32> {
    let obj = dict.get(b"MediaBox").ok()?;
    let obj = match obj {
        Object::Reference(r) => doc.get_object(*r).ok()?,
        other => other,
    };
    let values: Vec<f32> = obj.as_array().ok()?.iter().filter_map(get_number).collect();
    match values.as_slice() {
        [_, y0, _, y1] => Some((y1 - y0).abs()),
        _ => None,
    }
}

/// Text matrix state for position tracking.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        // Default leading; TL is not tracked
        self.f -= 12.0 * self.d;
    }

    fn get_position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn get_scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Chinese and Japanese scripts do not separate words with spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
