//! Per-page content stream builder
//!
//! Appends PDF content operators to a page buffer and tracks what the
//! page references (fonts, XObjects, ExtGStates, shadings) so the page's
//! resource dictionary can be assembled at save time. Graphics and text
//! state nesting is counted; an unbalanced page is a programmer error
//! and trips a panic at finalize.

use std::collections::BTreeSet;
use std::fmt::Write;

use pdf_writer::format_number;

use crate::color::Color;
use crate::error::PdfError;

/// How a constructed path is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintMode {
    Fill,
    Stroke,
    FillStroke,
    /// Construct only; the path stays current for clipping.
    None,
}

/// Path construction element, in user-space points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathPoint {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    /// Cubic Bézier: two control points, then the end point.
    CurveTo(f64, f64, f64, f64, f64, f64),
}

/// One glyph ready for emission, advances in font design units.
#[derive(Debug, Clone, Copy)]
pub struct GlyphOp {
    pub gid: u16,
    pub x_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    /// Glyph covers a single-space cluster; word spacing applies after it.
    pub is_space: bool,
}

/// Bézier circle-approximation constant: 4/3 · tan(π/8).
const BEZIER_CIRCLE_KAPPA: f64 = 0.5522847498;

/// Per-page operator buffer plus referenced-resource bookkeeping.
#[derive(Debug, Default)]
pub struct ContentStream {
    buffer: String,
    gs_depth: u32,
    fonts: BTreeSet<String>,
    images: BTreeSet<String>,
    shadings: BTreeSet<String>,
    graphics_states: BTreeSet<String>,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    fn op(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = self.buffer.write_fmt(args);
        self.buffer.push('\n');
    }

    fn push_number(&mut self, value: f64) {
        self.buffer.push_str(&format_number(value));
        self.buffer.push(' ');
    }

    /// `q`
    pub fn save_gs(&mut self) {
        self.gs_depth += 1;
        self.op(format_args!("q"));
    }

    /// `Q`; fails when nothing is saved, leaving the stream untouched.
    pub fn restore_gs(&mut self) -> Result<(), PdfError> {
        if self.gs_depth == 0 {
            return Err(PdfError::RenderError(
                "restore_gs without matching save_gs".to_string(),
            ));
        }
        self.gs_depth -= 1;
        self.op(format_args!("Q"));
        Ok(())
    }

    /// `w`; the default width of 1 is never emitted.
    pub fn set_stroke_width(&mut self, width: f64) {
        if width != 1.0 {
            self.op(format_args!("{} w", format_number(width)));
        }
    }

    pub fn set_fill_color(&mut self, color: Color) {
        match color {
            Color::Rgb(r, g, b) => self.op(format_args!(
                "{} {} {} rg",
                format_number(r),
                format_number(g),
                format_number(b)
            )),
            Color::Cmyk(c, m, y, k) => self.op(format_args!(
                "{} {} {} {} k",
                format_number(c),
                format_number(m),
                format_number(y),
                format_number(k)
            )),
        }
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        match color {
            Color::Rgb(r, g, b) => self.op(format_args!(
                "{} {} {} RG",
                format_number(r),
                format_number(g),
                format_number(b)
            )),
            Color::Cmyk(c, m, y, k) => self.op(format_args!(
                "{} {} {} {} K",
                format_number(c),
                format_number(m),
                format_number(y),
                format_number(k)
            )),
        }
    }

    /// `/name gs`; the name must resolve through the page's ExtGState
    /// resources.
    pub fn set_opacity(&mut self, name: &str) {
        self.graphics_states.insert(name.to_string());
        self.op(format_args!("/{} gs", name));
    }

    /// `re` plus the paint operator.
    pub fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64, mode: PaintMode) {
        self.op(format_args!(
            "{} {} {} {} re",
            format_number(x),
            format_number(y),
            format_number(width),
            format_number(height)
        ));
        self.paint(mode);
    }

    /// Path construction (`m`/`l`/`c`), optional `h`, then paint.
    pub fn draw_path(&mut self, points: &[PathPoint], close: bool, mode: PaintMode) {
        for point in points {
            match *point {
                PathPoint::MoveTo(x, y) => {
                    self.op(format_args!("{} {} m", format_number(x), format_number(y)))
                }
                PathPoint::LineTo(x, y) => {
                    self.op(format_args!("{} {} l", format_number(x), format_number(y)))
                }
                PathPoint::CurveTo(x1, y1, x2, y2, x3, y3) => self.op(format_args!(
                    "{} {} {} {} {} {} c",
                    format_number(x1),
                    format_number(y1),
                    format_number(x2),
                    format_number(y2),
                    format_number(x3),
                    format_number(y3)
                )),
            }
        }
        if close {
            self.op(format_args!("h"));
        }
        self.paint(mode);
    }

    /// `W n`: intersect the clipping region with the current path.
    pub fn clip_current_path(&mut self) {
        self.op(format_args!("W n"));
    }

    fn paint(&mut self, mode: PaintMode) {
        match mode {
            PaintMode::Fill => self.op(format_args!("f")),
            PaintMode::Stroke => self.op(format_args!("S")),
            PaintMode::FillStroke => self.op(format_args!("B")),
            PaintMode::None => {}
        }
    }

    /// Places the unit-square image XObject into the given rectangle.
    pub fn draw_image(&mut self, name: &str, x: f64, y: f64, width: f64, height: f64) {
        self.images.insert(name.to_string());
        self.op(format_args!(
            "q {} 0 0 {} {} {} cm /{} Do Q",
            format_number(width),
            format_number(height),
            format_number(x),
            format_number(y),
            name
        ));
    }

    /// `/name sh`: paints the shading across the current clip.
    pub fn draw_shading(&mut self, name: &str) {
        self.shadings.insert(name.to_string());
        self.op(format_args!("/{} sh", name));
    }

    /// Literal-string text for builtin Type1 fonts.
    pub fn draw_text_literal(
        &mut self,
        text: &str,
        font_name: &str,
        size: f64,
        x: f64,
        y: f64,
        color: Option<Color>,
    ) {
        self.fonts.insert(font_name.to_string());
        self.op(format_args!("q"));
        self.op(format_args!("BT"));
        self.op(format_args!("/{} {} Tf", font_name, format_number(size)));
        if let Some(color) = color {
            self.set_fill_color(color);
        }
        self.op(format_args!("{} {} Td", format_number(x), format_number(y)));
        self.buffer.push('(');
        for byte in encode_win_ansi(text) {
            match byte {
                b'\\' | b'(' | b')' => {
                    self.buffer.push('\\');
                    self.buffer.push(byte as char);
                }
                // Printable ASCII goes through as-is; everything else as
                // an octal escape so the buffer stays ASCII.
                0x20..=0x7E => self.buffer.push(byte as char),
                other => {
                    let _ = write!(self.buffer, "\\{:03o}", other);
                }
            }
        }
        self.buffer.push_str(") Tj\n");
        self.op(format_args!("ET"));
        self.op(format_args!("Q"));
    }

    /// Shaped glyphs at explicit pen positions.
    ///
    /// Glyphs arrive in visual order with the run's left edge at `x`; the
    /// pen advances rightward regardless of `rtl` (direction was resolved
    /// when the line was composed). Word spacing lands after space-cluster
    /// glyphs, letter spacing after every glyph.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_shaped_run(
        &mut self,
        glyphs: &[GlyphOp],
        font_name: &str,
        size: f64,
        units_per_em: u16,
        x: f64,
        y: f64,
        _rtl: bool,
        word_spacing: f64,
        letter_spacing: f64,
        color: Option<Color>,
    ) {
        self.fonts.insert(font_name.to_string());
        let scale = size / units_per_em as f64;

        self.op(format_args!("q"));
        self.op(format_args!("BT"));
        self.op(format_args!("/{} {} Tf", font_name, format_number(size)));
        if let Some(color) = color {
            self.set_fill_color(color);
        }

        let mut pen = x;
        for glyph in glyphs {
            let tx = pen + glyph.x_offset as f64 * scale;
            let ty = y + glyph.y_offset as f64 * scale;
            self.buffer.push_str("1 0 0 1 ");
            self.push_number(tx);
            self.push_number(ty);
            let _ = write!(self.buffer, "Tm <{:04X}> Tj", glyph.gid);
            self.buffer.push('\n');

            pen += glyph.x_advance as f64 * scale + letter_spacing;
            if glyph.is_space {
                pen += word_spacing;
            }
        }

        self.op(format_args!("ET"));
        self.op(format_args!("Q"));
    }

    pub fn fonts(&self) -> &BTreeSet<String> {
        &self.fonts
    }

    pub fn images(&self) -> &BTreeSet<String> {
        &self.images
    }

    pub fn shadings(&self) -> &BTreeSet<String> {
        &self.shadings
    }

    pub fn graphics_states(&self) -> &BTreeSet<String> {
        &self.graphics_states
    }

    /// The final operator bytes.
    ///
    /// # Panics
    ///
    /// Panics when `q`/`Q` do not balance; that is a bug in the caller,
    /// not a runtime condition.
    pub fn finalize(self) -> Vec<u8> {
        assert!(
            self.gs_depth == 0,
            "unbalanced graphics state: {} save(s) never restored",
            self.gs_depth
        );
        self.buffer.into_bytes()
    }

    #[cfg(test)]
    pub(crate) fn contents(&self) -> &str {
        &self.buffer
    }
}

/// Rounded-rectangle outline with per-corner radii
/// `[top-left, top-right, bottom-right, bottom-left]`, each corner a
/// quarter-circle Bézier.
pub fn rounded_rect_points(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    radii: [f64; 4],
) -> Vec<PathPoint> {
    let clamp = |r: f64| r.max(0.0).min(width / 2.0).min(height / 2.0);
    let [tl, tr, br, bl] = [clamp(radii[0]), clamp(radii[1]), clamp(radii[2]), clamp(radii[3])];
    let k = BEZIER_CIRCLE_KAPPA;
    let (top, right) = (y + height, x + width);

    vec![
        PathPoint::MoveTo(x + bl, y),
        PathPoint::LineTo(right - br, y),
        PathPoint::CurveTo(right - br + k * br, y, right, y + br - k * br, right, y + br),
        PathPoint::LineTo(right, top - tr),
        PathPoint::CurveTo(right, top - tr + k * tr, right - tr + k * tr, top, right - tr, top),
        PathPoint::LineTo(x + tl, top),
        PathPoint::CurveTo(x + tl - k * tl, top, x, top - tl + k * tl, x, top - tl),
        PathPoint::LineTo(x, y + bl),
        PathPoint::CurveTo(x, y + bl - k * bl, x + bl - k * bl, y, x + bl, y),
    ]
}

/// Windows-1252-ish byte encoding for builtin-font literal strings;
/// anything outside Latin-1 renders as `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| {
            let code = ch as u32;
            if code <= 0xFF {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}
