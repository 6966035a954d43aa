//! Text styling surface
//!
//! [`TextStyle`] is what callers hand to `Document::text`: font key,
//! size, wrap width, alignment, colors, spacing, decorations, and
//! sub/superscript positioning. Conversion into layout options and the
//! decoration geometry helpers live here; the drawing loop itself is in
//! `document.rs`.

use text_layout::{Align, ComposedLine, TextOptions};

/// Vertical position of the text relative to the normal baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptPosition {
    #[default]
    Normal,
    Subscript,
    Superscript,
}

/// Style of one `Document::text` call.
#[derive(Debug, Clone)]
pub struct TextStyle {
    /// Configured font key; the document default when `None`.
    pub font: Option<String>,
    /// Font size in points.
    pub size: f64,
    /// Base-direction hint for lines with no strong character.
    pub rtl: Option<bool>,
    /// Wrap width; no wrapping when `None`.
    pub width: Option<f64>,
    pub align: Align,
    /// Fill color string (`#RRGGBB`, named, `cmyk(...)`).
    pub color: Option<String>,
    pub word_spacing: f64,
    pub letter_spacing: f64,
    pub underline: bool,
    pub strikethrough: bool,
    pub script: ScriptPosition,
    /// Decoration color; falls back to the text color.
    pub line_color: Option<String>,
    /// Baseline step; `size * 1.4` when `None`.
    pub line_height: Option<f64>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: None,
            size: 12.0,
            rtl: None,
            width: None,
            align: Align::Left,
            color: None,
            word_spacing: 0.0,
            letter_spacing: 0.0,
            underline: false,
            strikethrough: false,
            script: ScriptPosition::Normal,
            line_color: None,
            line_height: None,
        }
    }
}

/// Sub/superscript scaling, from the conventional OS/2 ratios: 60% size,
/// 0.075 em drop for subscripts, 0.35 em rise for superscripts.
pub(crate) fn script_adjust(size: f64, script: ScriptPosition) -> (f64, f64) {
    match script {
        ScriptPosition::Normal => (size, 0.0),
        ScriptPosition::Subscript => (size * 0.6, -size * 0.075),
        ScriptPosition::Superscript => (size * 0.6, size * 0.35),
    }
}

/// The layout request equivalent to a style (with the size already
/// script-adjusted).
pub(crate) fn layout_options(style: &TextStyle, size: f64) -> TextOptions {
    TextOptions {
        size,
        width: style.width.filter(|width| {
            if *width <= 0.0 {
                tracing::warn!(width, "non-positive wrap width ignored");
                false
            } else {
                true
            }
        }),
        align: style.align,
        rtl: style.rtl,
        word_spacing: style.word_spacing,
        letter_spacing: style.letter_spacing,
        line_height: style.line_height,
    }
}

/// Horizontal extent `[left, right]` of a composed line, from its
/// positioned runs.
pub(crate) fn line_extent(line: &ComposedLine, size: f64, letter_spacing: f64) -> Option<(f64, f64)> {
    let mut left = f64::INFINITY;
    let mut right = f64::NEG_INFINITY;
    for positioned in &line.runs {
        let width = positioned
            .run
            .advance_width(size, letter_spacing, positioned.word_spacing);
        left = left.min(positioned.x);
        right = right.max(positioned.x + width);
    }
    (right > left).then_some((left, right))
}

/// Offset of a decoration rule below/above the baseline.
pub(crate) const UNDERLINE_OFFSET_RATIO: f64 = 0.1;
pub(crate) const STRIKETHROUGH_OFFSET_RATIO: f64 = 0.3;
pub(crate) const DECORATION_LINE_WIDTH: f64 = 0.5;
