//! Layout analysis: text blocks with bounding boxes.
//!
//! The content stream interpreter tracks just enough of the graphics and text
//! state (CTM, text matrices, font size, spacing, scaling, rise) to place each
//! shown string on the page. Glyph advances come from the font's `/Widths`
//! (or `/W` for composite fonts). Strings are then grouped into lines by
//! baseline, lines are split at wide horizontal gaps (column gutters), and the
//! resulting segments are stacked into blocks.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{Rect, TextBlock};

use super::objects::{dict_entry, number, page_resources, resolve, resolve_dict, PageBox};

/// Glyph width used when a font carries no metrics (1/1000 em).
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// Ascent and descent as fractions of the font size.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;

/// Form XObjects nested deeper than this are skipped.
const MAX_FORM_DEPTH: usize = 8;

/// TJ adjustments beyond this (1/1000 em) are treated as word spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Minimum horizontal gap that separates two segments on one baseline.
const MIN_GUTTER: f32 = 12.0;

/// An affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands[..6].iter().filter_map(number).collect();
        (n.len() == 6).then(|| Matrix {
            a: n[0],
            b: n[1],
            c: n[2],
            d: n[3],
            e: n[4],
            f: n[5],
        })
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Length of the transformed unit y vector.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Glyph advance widths for one font.
#[derive(Debug, Clone)]
struct FontMetrics {
    first_char: u32,
    widths: Vec<f32>,
    cid_widths: HashMap<u32, f32>,
    missing_width: f32,
    two_byte: bool,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            missing_width: DEFAULT_GLYPH_WIDTH,
            two_byte: false,
        }
    }
}

impl FontMetrics {
    fn from_font(doc: &LopdfDocument, font: &Dictionary) -> Self {
        let is_type0 = font.get(b"Subtype").and_then(Object::as_name).ok() == Some(&b"Type0"[..]);

        if is_type0 {
            return Self::from_composite(doc, font);
        }

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0)
            .max(0) as u32;
        let widths = font
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| resolve(doc, w).and_then(number).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();
        let missing_width = dict_entry(doc, font, b"FontDescriptor")
            .and_then(|fd| fd.get(b"MissingWidth").ok())
            .and_then(number)
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_GLYPH_WIDTH);

        Self {
            first_char,
            widths,
            missing_width,
            ..Self::default()
        }
    }

    fn from_composite(doc: &LopdfDocument, font: &Dictionary) -> Self {
        let descendant = font
            .get(b"DescendantFonts")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
            .and_then(|arr| arr.first())
            .and_then(|o| resolve_dict(doc, o));

        let mut metrics = Self {
            missing_width: 1000.0,
            two_byte: true,
            ..Self::default()
        };

        let Some(descendant) = descendant else {
            return metrics;
        };

        if let Some(dw) = descendant.get(b"DW").ok().and_then(number) {
            metrics.missing_width = dw;
        }

        let w = descendant
            .get(b"W")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok());
        if let Some(w) = w {
            metrics.cid_widths = parse_cid_widths(doc, w);
        }

        metrics
    }

    /// Split a shown string into character codes.
    fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| match c {
                    [hi, lo] => u32::from(*hi) << 8 | u32::from(*lo),
                    [b] => u32::from(*b),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }

    /// Advance width of a code in 1/1000 em.
    fn width(&self, code: u32) -> f32 {
        if self.two_byte {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.missing_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.missing_width)
    }
}

/// Parse a CIDFont `/W` array: `c [w1 w2 ...]` or `cfirst clast w`.
fn parse_cid_widths(doc: &LopdfDocument, w: &[Object]) -> HashMap<u32, f32> {
    let mut widths = HashMap::new();
    let mut i = 0;

    while i < w.len() {
        let Some(first) = resolve(doc, &w[i]).and_then(number) else {
            break;
        };
        let first = first.max(0.0) as u32;

        match w.get(i + 1).and_then(|o| resolve(doc, o)) {
            Some(Object::Array(list)) => {
                for (k, value) in list.iter().enumerate() {
                    let Some(code) = u32::try_from(k).ok().and_then(|k| first.checked_add(k)) else {
                        break;
                    };
                    if let Some(width) = resolve(doc, value).and_then(number) {
                        widths.insert(code, width);
                    }
                }
                i += 2;
            }
            Some(other) => {
                let last = number(other).unwrap_or(first as f32).max(0.0) as u32;
                let width = w.get(i + 2).and_then(|o| resolve(doc, o)).and_then(number);
                if let Some(width) = width {
                    // Cap absurd ranges from broken files.
                    for code in first..=last.min(first.saturating_add(0xFFFF)) {
                        widths.insert(code, width);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }

    widths
}

/// The subset of the graphics state that affects text placement.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    rise: f32,
    font: Vec<u8>,
    font_size: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
            font: Vec::new(),
            font_size: 12.0,
        }
    }
}

/// A positioned string in top-left page coordinates.
#[derive(Debug, Clone)]
struct Span {
    bbox: Rect,
    baseline: f32,
    size: f32,
    text: String,
}

/// A font as seen from one resource dictionary.
struct LoadedFont<'a> {
    dict: Option<&'a Dictionary>,
    metrics: FontMetrics,
}

/// Extracts text blocks from the pages of a lopdf document.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Extract text blocks of a page, in top-to-bottom reading order.
    pub fn extract_blocks(&self, page_id: ObjectId, page_box: &PageBox) -> Result<Vec<TextBlock>> {
        let spans = self.extract_spans(page_id, page_box)?;
        log::debug!("Page {:?}: {} text spans", page_id, spans.len());
        Ok(group_into_blocks(spans))
    }

    fn extract_spans(&self, page_id: ObjectId, page_box: &PageBox) -> Result<Vec<Span>> {
        let content = self.page_content(page_id)?;
        let resources = page_resources(self.doc, page_id);

        let mut spans = Vec::new();
        self.interpret(
            &content,
            resources,
            GraphicsState::default(),
            page_box,
            0,
            &mut spans,
        )?;
        Ok(spans)
    }

    /// Concatenated, decompressed content streams of a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        let streams: Vec<&Object> = match resolve(self.doc, contents) {
            Some(Object::Array(arr)) => arr.iter().collect(),
            Some(_) => vec![contents],
            None => return Err(Error::PdfParse("Invalid content stream".to_string())),
        };

        let mut content = Vec::new();
        for obj in streams {
            match resolve(self.doc, obj) {
                Some(Object::Stream(s)) => {
                    let data = s
                        .decompressed_content()
                        .unwrap_or_else(|_| s.content.clone());
                    content.extend_from_slice(&data);
                    content.push(b'\n');
                }
                _ => log::warn!("Skipping non-stream content entry on page {:?}", page_id),
            }
        }
        Ok(content)
    }

    fn load_font(&self, resources: Option<&'a Dictionary>, name: &[u8]) -> LoadedFont<'a> {
        let dict = resources
            .and_then(|res| dict_entry(self.doc, res, b"Font"))
            .and_then(|fonts| fonts.get(name).ok())
            .and_then(|obj| resolve_dict(self.doc, obj));
        let metrics = dict
            .map(|d| FontMetrics::from_font(self.doc, d))
            .unwrap_or_default();
        LoadedFont { dict, metrics }
    }

    fn decode_string(&self, font: &LoadedFont<'a>, bytes: &[u8]) -> String {
        let encoding = font.dict.and_then(|f| f.get_font_encoding(self.doc).ok());
        match encoding {
            Some(ref enc) => LopdfDocument::decode_text(enc, bytes)
                .unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }

    fn interpret(
        &self,
        content: &[u8],
        resources: Option<&'a Dictionary>,
        initial: GraphicsState,
        page_box: &PageBox,
        depth: usize,
        spans: &mut Vec<Span>,
    ) -> Result<()> {
        let content = Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut fonts: HashMap<Vec<u8>, LoadedFont<'a>> = HashMap::new();
        let mut state = initial;
        let mut saved: Vec<GraphicsState> = Vec::new();
        let mut tm = Matrix::IDENTITY;
        let mut tlm = Matrix::IDENTITY;

        for op in &content.operations {
            let operands = &op.operands;
            let num = |i: usize| operands.get(i).and_then(number);

            match op.operator.as_str() {
                "q" => saved.push(state.clone()),
                "Q" => {
                    if let Some(previous) = saved.pop() {
                        state = previous;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.ctm = m.then(&state.ctm);
                    }
                }
                "BT" => {
                    tm = Matrix::IDENTITY;
                    tlm = Matrix::IDENTITY;
                }
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        state.font = name.clone();
                    }
                    state.font_size = num(1).unwrap_or(state.font_size);
                }
                "Tc" => state.char_spacing = num(0).unwrap_or(0.0),
                "Tw" => state.word_spacing = num(0).unwrap_or(0.0),
                "Tz" => state.horizontal_scale = num(0).unwrap_or(100.0) / 100.0,
                "TL" => state.leading = num(0).unwrap_or(0.0),
                "Ts" => state.rise = num(0).unwrap_or(0.0),
                "Td" | "TD" => {
                    let tx = num(0).unwrap_or(0.0);
                    let ty = num(1).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    tlm = Matrix::translation(tx, ty).then(&tlm);
                    tm = tlm;
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        tlm = m;
                        tm = m;
                    }
                }
                "T*" => {
                    tlm = Matrix::translation(0.0, -state.leading).then(&tlm);
                    tm = tlm;
                }
                "Tj" | "'" | "\"" | "TJ" => {
                    let shown: &[Object] = match op.operator.as_str() {
                        "Tj" | "'" => operands.get(..1).unwrap_or(&[]),
                        "\"" => {
                            state.word_spacing = num(0).unwrap_or(state.word_spacing);
                            state.char_spacing = num(1).unwrap_or(state.char_spacing);
                            operands.get(2..3).unwrap_or(&[])
                        }
                        _ => match operands.first() {
                            Some(Object::Array(arr)) => arr.as_slice(),
                            _ => &[],
                        },
                    };
                    if op.operator == "'" || op.operator == "\"" {
                        tlm = Matrix::translation(0.0, -state.leading).then(&tlm);
                        tm = tlm;
                    }

                    let font = fonts
                        .entry(state.font.clone())
                        .or_insert_with(|| self.load_font(resources, &state.font));
                    if let Some(span) = self.show(shown, font, &state, &mut tm, page_box) {
                        spans.push(span);
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.draw_form(name, resources, &state, page_box, depth, spans)?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Lay out one text-showing operation and advance the text matrix.
    fn show(
        &self,
        shown: &[Object],
        font: &LoadedFont<'a>,
        state: &GraphicsState,
        tm: &mut Matrix,
        page_box: &PageBox,
    ) -> Option<Span> {
        let start = tm.then(&state.ctm);
        let size = state.font_size;
        let scale = state.horizontal_scale;
        let mut advance = 0.0_f32;
        let mut text = String::new();

        for item in shown {
            match item {
                Object::String(bytes, _) => {
                    for code in font.metrics.codes(bytes) {
                        let mut w = font.metrics.width(code) / 1000.0 * size + state.char_spacing;
                        if !font.metrics.two_byte && code == 32 {
                            w += state.word_spacing;
                        }
                        advance += w * scale;
                    }
                    text.push_str(&self.decode_string(font, bytes));
                }
                other => {
                    let Some(adjustment) = number(other) else {
                        continue;
                    };
                    advance -= adjustment / 1000.0 * size * scale;
                    if -adjustment > TJ_SPACE_THRESHOLD
                        && !text.is_empty()
                        && !text.ends_with(char::is_whitespace)
                    {
                        text.push(' ');
                    }
                }
            }
        }

        *tm = Matrix::translation(advance, 0.0).then(tm);

        let effective_size = size * start.vertical_scale();
        if text.trim().is_empty() || effective_size <= 0.0 {
            return None;
        }

        let low = state.rise - DESCENT * size;
        let high = state.rise + ASCENT * size;
        let corners = [
            start.apply(0.0, low),
            start.apply(advance, low),
            start.apply(0.0, high),
            start.apply(advance, high),
        ];

        let (mut x0, mut y0) = page_box.to_page(corners[0].0, corners[0].1);
        let (mut x1, mut y1) = (x0, y0);
        for (ux, uy) in &corners[1..] {
            let (x, y) = page_box.to_page(*ux, *uy);
            x0 = x0.min(x);
            x1 = x1.max(x);
            y0 = y0.min(y);
            y1 = y1.max(y);
        }

        let origin = start.apply(0.0, state.rise);
        let (_, baseline) = page_box.to_page(origin.0, origin.1);

        Some(Span {
            bbox: Rect::new(x0, y0, x1, y1),
            baseline,
            size: effective_size,
            text,
        })
    }

    fn draw_form(
        &self,
        name: &[u8],
        resources: Option<&'a Dictionary>,
        state: &GraphicsState,
        page_box: &PageBox,
        depth: usize,
        spans: &mut Vec<Span>,
    ) -> Result<()> {
        let Some(Object::Stream(stream)) = resources
            .and_then(|res| dict_entry(self.doc, res, b"XObject"))
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|obj| resolve(self.doc, obj))
        else {
            return Ok(());
        };

        let is_form = stream.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(&b"Form"[..]);
        if !is_form {
            return Ok(());
        }
        if depth >= MAX_FORM_DEPTH {
            log::warn!("Form XObjects nested too deeply, skipping /{}", String::from_utf8_lossy(name));
            return Ok(());
        }

        let form_matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|m| m.as_array().ok())
            .and_then(|arr| Matrix::from_operands(arr))
            .unwrap_or(Matrix::IDENTITY);
        let form_resources = dict_entry(self.doc, &stream.dict, b"Resources").or(resources);
        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let mut form_state = state.clone();
        form_state.ctm = form_matrix.then(&state.ctm);

        self.interpret(&data, form_resources, form_state, page_box, depth + 1, spans)
    }
}

/// A run of spans on one baseline with no wide gap between them.
#[derive(Debug, Clone)]
struct Segment {
    bbox: Rect,
    size: f32,
    text: String,
}

impl Segment {
    fn from_span(span: Span) -> Self {
        Self {
            bbox: span.bbox,
            size: span.size,
            text: span.text,
        }
    }

    fn append(&mut self, span: Span) {
        let gap = span.bbox.x0 - self.bbox.x1;
        let needs_space = gap > self.size.max(span.size) * 0.15
            && !self.text.ends_with(char::is_whitespace)
            && !span.text.starts_with(char::is_whitespace);
        if needs_space {
            self.text.push(' ');
        }
        self.text.push_str(&span.text);
        self.bbox = self.bbox.union(&span.bbox);
        self.size = self.size.max(span.size);
    }
}

struct BlockBuilder {
    bbox: Rect,
    last: Rect,
    size: f32,
    lines: Vec<String>,
}

impl BlockBuilder {
    fn accepts(&self, segment: &Segment) -> bool {
        let size = self.size.max(segment.size);
        let gap = segment.bbox.y0 - self.last.y1;
        gap <= size * 0.5
            && gap >= -size * 0.5
            && (self.size - segment.size).abs() <= 1.0
            && self.last.overlaps_horizontally(&segment.bbox)
    }
}

/// Group positioned spans into blocks.
fn group_into_blocks(mut spans: Vec<Span>) -> Vec<TextBlock> {
    spans.sort_by(|a, b| {
        a.baseline
            .total_cmp(&b.baseline)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    // Lines: spans whose baselines sit within 30% of the font size.
    let mut lines: Vec<(f32, f32, Vec<Span>)> = Vec::new();
    for span in spans {
        match lines.last_mut() {
            Some((baseline, size, members))
                if (span.baseline - *baseline).abs() <= size.max(span.size) * 0.3 =>
            {
                *size = size.max(span.size);
                members.push(span);
            }
            _ => lines.push((span.baseline, span.size, vec![span])),
        }
    }

    // Segments: split each line at gutters.
    let mut segments: Vec<Segment> = Vec::new();
    for (_, _, mut members) in lines {
        members.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
        let mut current: Option<Segment> = None;
        for span in members {
            current = Some(match current.take() {
                Some(mut segment) => {
                    let gap = span.bbox.x0 - segment.bbox.x1;
                    if gap >= MIN_GUTTER.max(segment.size) {
                        segments.push(segment);
                        Segment::from_span(span)
                    } else {
                        segment.append(span);
                        segment
                    }
                }
                None => Segment::from_span(span),
            });
        }
        segments.extend(current);
    }

    // Blocks: stack segments that sit directly under one another.
    let mut blocks: Vec<BlockBuilder> = Vec::new();
    for segment in segments {
        match blocks.iter_mut().rev().find(|b| b.accepts(&segment)) {
            Some(block) => {
                block.bbox = block.bbox.union(&segment.bbox);
                block.last = segment.bbox;
                block.size = block.size.max(segment.size);
                block.lines.push(segment.text);
            }
            None => blocks.push(BlockBuilder {
                bbox: segment.bbox,
                last: segment.bbox,
                size: segment.size,
                lines: vec![segment.text],
            }),
        }
    }

    blocks
        .into_iter()
        .map(|b| TextBlock::new(b.bbox, b.lines.join("\n")))
        .collect()
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(x0: f32, baseline: f32, width: f32, size: f32, text: &str) -> Span {
        Span {
            bbox: Rect::new(
                x0,
                baseline - ASCENT * size,
                x0 + width,
                baseline + DESCENT * size,
            ),
            baseline,
            size,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_matrix_then() {
        let scale = Matrix {
            a: 2.0,
            d: 2.0,
            ..Matrix::IDENTITY
        };
        let m = Matrix::translation(10.0, 5.0).then(&scale);
        assert_eq!(m.apply(0.0, 0.0), (20.0, 10.0));
        assert_eq!(m.apply(1.0, 1.0), (22.0, 12.0));
        assert_eq!(m.vertical_scale(), 2.0);
    }

    #[test]
    fn test_font_metrics_simple_widths() {
        let metrics = FontMetrics {
            first_char: 65,
            widths: vec![600.0, 0.0],
            missing_width: 250.0,
            ..FontMetrics::default()
        };
        assert_eq!(metrics.width(65), 600.0);
        // Zero and out-of-range widths fall back to MissingWidth.
        assert_eq!(metrics.width(66), 250.0);
        assert_eq!(metrics.width(10), 250.0);
        assert_eq!(metrics.codes(b"AB"), vec![65, 66]);
    }

    #[test]
    fn test_font_metrics_two_byte_codes() {
        let mut metrics = FontMetrics {
            two_byte: true,
            missing_width: 1000.0,
            ..FontMetrics::default()
        };
        metrics.cid_widths.insert(0x0102, 480.0);
        assert_eq!(metrics.codes(&[0x01, 0x02, 0x00, 0x05]), vec![0x0102, 0x0005]);
        assert_eq!(metrics.width(0x0102), 480.0);
        assert_eq!(metrics.width(0x0005), 1000.0);
    }

    #[test]
    fn test_parse_cid_widths() {
        let doc = LopdfDocument::with_version("1.5");
        let w = vec![
            Object::Integer(1),
            Object::Array(vec![Object::Integer(500), Object::Integer(600)]),
            Object::Integer(10),
            Object::Integer(12),
            Object::Integer(300),
        ];
        let widths = parse_cid_widths(&doc, &w);
        assert_eq!(widths.get(&1), Some(&500.0));
        assert_eq!(widths.get(&2), Some(&600.0));
        assert_eq!(widths.get(&11), Some(&300.0));
        assert_eq!(widths.len(), 5);
    }

    #[test]
    fn test_parse_cid_widths_stops_at_code_limit() {
        let doc = LopdfDocument::with_version("1.5");
        let w = vec![
            Object::Integer(i64::from(u32::MAX)),
            Object::Array(vec![
                Object::Integer(500),
                Object::Integer(600),
                Object::Integer(700),
            ]),
        ];
        let widths = parse_cid_widths(&doc, &w);
        assert_eq!(widths.len(), 1);
        assert_eq!(widths.get(&u32::MAX), Some(&500.0));
    }

    #[test]
    fn test_group_lines_into_one_block() {
        let spans = vec![
            span(72.0, 100.0, 200.0, 12.0, "first line"),
            span(72.0, 114.0, 180.0, 12.0, "second line"),
        ];
        let blocks = group_into_blocks(spans);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "first line\nsecond line");
        assert_eq!(blocks[0].bbox.x0, 72.0);
        assert_eq!(blocks[0].bbox.x1, 272.0);
    }

    #[test]
    fn test_paragraph_gap_starts_new_block() {
        let spans = vec![
            span(72.0, 100.0, 200.0, 12.0, "para one"),
            span(72.0, 140.0, 200.0, 12.0, "para two"),
        ];
        assert_eq!(group_into_blocks(spans).len(), 2);
    }

    #[test]
    fn test_gutter_splits_columns() {
        let spans = vec![
            span(72.0, 100.0, 200.0, 10.0, "left column"),
            span(300.0, 100.0, 200.0, 10.0, "right column"),
            span(72.0, 112.0, 200.0, 10.0, "left again"),
            span(300.0, 112.0, 200.0, 10.0, "right again"),
        ];
        let blocks = group_into_blocks(spans);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "left column\nleft again");
        assert_eq!(blocks[1].text, "right column\nright again");
    }

    #[test]
    fn test_adjacent_spans_join_with_space() {
        let spans = vec![
            span(72.0, 100.0, 30.0, 12.0, "Hello"),
            span(106.0, 100.0, 30.0, 12.0, "world"),
        ];
        let blocks = group_into_blocks(spans);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Hello world");
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"plain"), "plain");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41]), "A");
        assert_eq!(decode_text_simple(&[0xE9]), "\u{e9}");
    }
}
