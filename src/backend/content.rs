//! Content stream interpretation into positioned blocks.
//!
//! Walks the operators of a page content stream, tracking the graphics and
//! text matrices, and records every shown string as a [`TextSpan`] and every
//! painted image XObject as an image box. Spans are then grouped into lines
//! and lines into blocks, which become the page's [`Fragment`]s.
//!
//! Coordinates are produced in PDF user space (origin bottom-left, y up) and
//! flipped into page space (origin top-left, y down) by [`build_fragments`].

use std::collections::HashSet;

use lopdf::content::Operation;
use lopdf::Object;

use crate::model::{BBox, Fragment};

/// A run of text shown by a single text operator.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TextSpan {
    pub text: String,
    /// X position of the text origin
    pub x: f32,
    /// Baseline Y position (PDF space, y up)
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Effective font size in user space
    pub font_size: f32,
}

impl TextSpan {
    /// Approximate top of the glyphs (PDF space).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8 // Approximate ascender
    }

    /// Approximate bottom of the glyphs (PDF space).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2 // Approximate descender
    }
}

/// A painted item, in content stream order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PaintedItem {
    Text(TextSpan),
    /// Image placement as (x0, y0, x1, y1) in PDF space
    Image([f32; 4]),
}

/// The visible page rectangle: the crop box plus the page rotation.
///
/// Content is grouped in unrotated page space (origin at the top-left of the
/// box, y down) and only the finished fragment boxes are turned into the
/// displayed orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PageBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    /// Clockwise rotation in degrees: 0, 90, 180 or 270
    pub rotation: u16,
}

impl PageBox {
    /// US Letter, used when a page declares no media box.
    pub const LETTER: PageBox = PageBox {
        x0: 0.0,
        y0: 0.0,
        x1: 612.0,
        y1: 792.0,
        rotation: 0,
    };

    /// Build a box from corner coordinates in any order.
    pub fn from_corners(rect: [f32; 4], rotation: u16) -> Self {
        let [x0, y0, x1, y1] = rect;
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
            rotation,
        }
    }

    fn quarter_turn(&self) -> bool {
        self.rotation == 90 || self.rotation == 270
    }

    fn raw_width(&self) -> f32 {
        self.x1 - self.x0
    }

    fn raw_height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Displayed width.
    pub fn width(&self) -> f32 {
        if self.quarter_turn() {
            self.raw_height()
        } else {
            self.raw_width()
        }
    }

    /// Displayed height.
    pub fn height(&self) -> f32 {
        if self.quarter_turn() {
            self.raw_width()
        } else {
            self.raw_height()
        }
    }

    /// Convert a PDF-space rectangle into unrotated page space.
    fn to_page_space(self, left: f32, bottom: f32, right: f32, top: f32) -> BBox {
        BBox::new(
            left - self.x0,
            self.y1 - top,
            right - self.x0,
            self.y1 - bottom,
        )
    }

    /// Turn an unrotated page-space box into the displayed orientation.
    fn rotate(&self, b: BBox) -> BBox {
        let (w, h) = (self.raw_width(), self.raw_height());
        match self.rotation {
            90 => BBox::new(h - b.y1, b.x0, h - b.y0, b.x1),
            180 => BBox::new(w - b.x1, h - b.y1, w - b.x0, h - b.y0),
            270 => BBox::new(b.y0, w - b.x1, b.y1, w - b.x0),
            _ => b,
        }
    }
}

/// Affine transformation matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
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

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        Some(Self {
            a: get_number(&operands[0])?,
            b: get_number(&operands[1])?,
            c: get_number(&operands[2])?,
            d: get_number(&operands[3])?,
            e: get_number(&operands[4])?,
            f: get_number(&operands[5])?,
        })
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
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

    /// Length of the transformed unit vector along each axis.
    fn scale_x(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn scale_y(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text state inside a `BT`/`ET` object.
#[derive(Debug, Clone, Default)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
}

impl TextState {
    fn begin(&mut self) {
        self.matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, tx: f32) {
        self.matrix = Matrix::translation(tx, 0.0).then(&self.matrix);
    }
}

/// Interprets content stream operators of one page.
pub(crate) struct ContentInterpreter<'a> {
    decode: Box<dyn Fn(&[u8], &[u8]) -> String + 'a>,
    images: HashSet<Vec<u8>>,
}

impl<'a> ContentInterpreter<'a> {
    /// Create an interpreter.
    ///
    /// `decode` turns the raw bytes of a shown string into text given the
    /// current font resource name. `images` lists the XObject resource names
    /// that are images.
    pub fn new<F>(decode: F, images: HashSet<Vec<u8>>) -> Self
    where
        F: Fn(&[u8], &[u8]) -> String + 'a,
    {
        Self {
            decode: Box::new(decode),
            images,
        }
    }

    /// Run the operators and collect painted items in stream order.
    pub fn run(&self, operations: &[Operation]) -> Vec<PaintedItem> {
        let mut items = Vec::new();
        let mut ctm = Matrix::IDENTITY;
        let mut ctm_stack: Vec<Matrix> = Vec::new();
        let mut text = TextState {
            font_size: 12.0,
            ..Default::default()
        };
        let mut in_text_object = false;

        for op in operations {
            match op.operator.as_str() {
                "q" => ctm_stack.push(ctm),
                "Q" => {
                    if let Some(saved) = ctm_stack.pop() {
                        ctm = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        ctm = m.then(&ctm);
                    }
                }
                "BT" => {
                    in_text_object = true;
                    text.begin();
                }
                "ET" => in_text_object = false,
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(name) = &op.operands[0] {
                            text.font = name.clone();
                        }
                        text.font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        text.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            text.leading = -ty;
                        }
                        text.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        text.line_matrix = m;
                        text.matrix = m;
                    }
                }
                "T*" => text.next_line(),
                "Tj" if in_text_object => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        let shown = (self.decode)(&text.font, bytes);
                        self.show(&mut items, &mut text, &ctm, shown, 0.0);
                    }
                }
                "TJ" if in_text_object => {
                    if let Some(Object::Array(parts)) = op.operands.first() {
                        let (shown, adjustment) = self.combine_tj(&text, parts);
                        self.show(&mut items, &mut text, &ctm, shown, adjustment);
                    }
                }
                "'" | "\"" if in_text_object => {
                    text.next_line();
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                        let shown = (self.decode)(&text.font, bytes);
                        self.show(&mut items, &mut text, &ctm, shown, 0.0);
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        if self.images.contains(name) {
                            items.push(PaintedItem::Image(unit_square_bounds(&ctm)));
                        }
                    }
                }
                _ => {}
            }
        }

        items
    }

    /// Concatenate the strings of a `TJ` array.
    ///
    /// Large negative adjustments (in 1/1000 text space units) are word gaps
    /// and become spaces outside spaceless scripts. Returns the text and the
    /// summed adjustment in text space units.
    fn combine_tj(&self, text: &TextState, parts: &[Object]) -> (String, f32) {
        // 200 units = 0.2 * font_size
        let space_threshold = 200.0;
        let mut combined = String::new();
        let mut adjustment = 0.0;

        for part in parts {
            match part {
                Object::String(bytes, _) => combined.push_str(&(self.decode)(&text.font, bytes)),
                other => {
                    if let Some(n) = get_number(other) {
                        adjustment -= n / 1000.0 * text.font_size;
                        if -n > space_threshold
                            && !combined.is_empty()
                            && !combined.ends_with(' ')
                            && !combined.ends_with('\u{00A0}')
                            && !combined.chars().last().is_some_and(is_spaceless_script_char)
                        {
                            combined.push(' ');
                        }
                    }
                }
            }
        }

        (combined, adjustment)
    }

    fn show(
        &self,
        items: &mut Vec<PaintedItem>,
        text: &mut TextState,
        ctm: &Matrix,
        shown: String,
        adjustment: f32,
    ) {
        let advance = estimate_advance(&shown, text.font_size) + adjustment;

        if !shown.trim().is_empty() {
            let render = text.matrix.then(ctm);
            let (x, y) = render.apply(0.0, 0.0);
            items.push(PaintedItem::Text(TextSpan {
                width: advance.max(0.0) * render.scale_x(),
                font_size: text.font_size * render.scale_y(),
                text: shown,
                x,
                y,
            }));
        }

        text.advance(advance);
    }
}

/// Bounds of the unit square under `ctm`, which is where images are painted.
fn unit_square_bounds(ctm: &Matrix) -> [f32; 4] {
    let corners = [
        ctm.apply(0.0, 0.0),
        ctm.apply(1.0, 0.0),
        ctm.apply(0.0, 1.0),
        ctm.apply(1.0, 1.0),
    ];
    let mut bounds = [f32::MAX, f32::MAX, f32::MIN, f32::MIN];
    for (x, y) in corners {
        bounds[0] = bounds[0].min(x);
        bounds[1] = bounds[1].min(y);
        bounds[2] = bounds[2].max(x);
        bounds[3] = bounds[3].max(y);
    }
    bounds
}

/// Text space advance of a string, without font metrics.
///
/// Spaceless-script glyphs are treated as full-width, everything else as
/// half an em.
fn estimate_advance(text: &str, font_size: f32) -> f32 {
    text.chars()
        .map(|c| {
            if is_spaceless_script_char(c) {
                font_size
            } else {
                font_size * 0.5
            }
        })
        .sum()
}

/// A line of spans sharing a baseline, in page space.
#[derive(Debug, Clone)]
struct Line {
    bbox: BBox,
    baseline: f32,
    font_size: f32,
    text: String,
    last_char: Option<char>,
}

impl Line {
    fn new(span: &TextSpan, page_box: PageBox) -> Self {
        Self {
            bbox: span_bbox(span, page_box),
            baseline: span.y,
            font_size: span.font_size,
            text: span.text.clone(),
            last_char: span.text.chars().last(),
        }
    }

    /// Whether `span` continues this line.
    fn accepts(&self, span: &TextSpan, page_box: PageBox) -> bool {
        let tolerance = self.font_size.max(span.font_size) * 0.3;
        if (span.y - self.baseline).abs() > tolerance {
            return false;
        }
        let x = span.x - page_box.x0;
        // Moving backwards or jumping across a gutter starts a new line.
        x >= self.bbox.x0 && x - self.bbox.x1 <= self.font_size.max(span.font_size) * 2.0
    }

    fn push(&mut self, span: &TextSpan, page_box: PageBox) {
        let bbox = span_bbox(span, page_box);
        let gap = bbox.x0 - self.bbox.x1;
        let first = span.text.chars().next();
        let spaceless = self.last_char.is_some_and(is_spaceless_script_char)
            && first.is_some_and(is_spaceless_script_char);
        if gap > span.font_size * 0.1
            && !spaceless
            && !self.text.ends_with(char::is_whitespace)
            && !span.text.starts_with(char::is_whitespace)
        {
            self.text.push(' ');
        }
        self.text.push_str(&span.text);
        self.bbox = self.bbox.union(&bbox);
        self.last_char = span.text.chars().last().or(self.last_char);
    }
}

fn span_bbox(span: &TextSpan, page_box: PageBox) -> BBox {
    page_box.to_page_space(span.x, span.bottom(), span.x + span.width, span.top())
}

/// A block under construction: consecutive lines of one paragraph.
#[derive(Debug, Clone)]
struct Block {
    bbox: BBox,
    lines: Vec<String>,
    line_height: f32,
}

impl Block {
    fn new(line: Line) -> Self {
        Self {
            bbox: line.bbox,
            line_height: line.bbox.height(),
            lines: vec![line.text],
        }
    }

    /// Whether `line` sits right below this block and overlaps it horizontally.
    fn accepts(&self, line: &Line) -> bool {
        let gap = line.bbox.y0 - self.bbox.y1;
        let overlaps = line.bbox.x0 < self.bbox.x1 && line.bbox.x1 > self.bbox.x0;
        overlaps && gap > -self.line_height * 0.5 && gap <= self.line_height * 0.8
    }

    fn push(&mut self, line: Line) {
        self.bbox = self.bbox.union(&line.bbox);
        self.line_height = line.bbox.height();
        self.lines.push(line.text);
    }

    fn into_fragment(self, sequence_id: u32) -> Fragment {
        let mut text = self.lines.join("\n");
        text.push('\n');
        Fragment::text(self.bbox, text, sequence_id)
    }
}

/// Group painted items into block-level fragments in page space.
///
/// Text spans are merged into lines, lines into blocks. Images become
/// non-text fragments. Sequence ids follow the order in which blocks were
/// closed, which is content stream order.
pub(crate) fn build_fragments(items: &[PaintedItem], page_box: PageBox) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut block: Option<Block> = None;
    let mut line: Option<Line> = None;

    fn close_line(line: &mut Option<Line>, block: &mut Option<Block>, out: &mut Vec<Fragment>) {
        let Some(finished) = line.take() else {
            return;
        };
        if block.as_ref().is_some_and(|b| b.accepts(&finished)) {
            if let Some(b) = block.as_mut() {
                b.push(finished);
            }
        } else {
            close_block(block, out);
            *block = Some(Block::new(finished));
        }
    }

    fn close_block(block: &mut Option<Block>, out: &mut Vec<Fragment>) {
        if let Some(finished) = block.take() {
            let id = out.len() as u32;
            out.push(finished.into_fragment(id));
        }
    }

    for item in items {
        match item {
            PaintedItem::Text(span) => {
                if line.as_ref().is_some_and(|l| l.accepts(span, page_box)) {
                    if let Some(current) = line.as_mut() {
                        current.push(span, page_box);
                    }
                } else {
                    close_line(&mut line, &mut block, &mut fragments);
                    line = Some(Line::new(span, page_box));
                }
            }
            PaintedItem::Image([x0, y0, x1, y1]) => {
                close_line(&mut line, &mut block, &mut fragments);
                close_block(&mut block, &mut fragments);
                let id = fragments.len() as u32;
                fragments.push(Fragment::non_text(
                    page_box.to_page_space(*x0, *y0, *x1, *y1),
                    id,
                ));
            }
        }
    }

    close_line(&mut line, &mut block, &mut fragments);
    close_block(&mut block, &mut fragments);

    for fragment in &mut fragments {
        fragment.bbox = page_box.rotate(fragment.bbox);
    }
    fragments
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs
    (0x4E00..=0x9FFF).contains(&code)
    // CJK Unified Ideographs Extension A
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana
    || (0x3040..=0x309F).contains(&code)
    // Katakana
    || (0x30A0..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
    // Halfwidth and Fullwidth Forms
    || (0xFF00..=0xFFEF).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
