//! The pipeline core: fallback resolution, shaping, and measurement
//!
//! A [`TextPipeline`] borrows the configured shapers in fallback order
//! and turns logical strings into [`ShapedRun`]s. Cluster bookkeeping
//! lives on the run: ToUnicode pairs, space-cluster detection for word
//! spacing, and advance measurement all derive from the shaper's cluster
//! values.

use font_toolkit::{Direction, ShapedGlyph, Shaper};

use crate::error::LayoutError;
use crate::segment::{is_strong_rtl, segment_with};

/// A segmentation result: one font, one direction, logical text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// Configured font key.
    pub font: String,
    pub text: String,
    pub rtl: bool,
}

/// A run after shaping: glyphs in visual order plus enough context to
/// measure and to record ToUnicode pairs.
#[derive(Debug, Clone)]
pub struct ShapedRun {
    pub font: String,
    pub text: String,
    pub rtl: bool,
    pub units_per_em: u16,
    pub glyphs: Vec<ShapedGlyph>,
}

impl ShapedRun {
    /// Byte range of the cluster a glyph belongs to.
    fn cluster_end(&self, cluster: u32) -> usize {
        self.glyphs
            .iter()
            .map(|glyph| glyph.cluster)
            .filter(|&other| other > cluster)
            .min()
            .map(|next| next as usize)
            .unwrap_or(self.text.len())
    }

    /// The source text covered by the cluster of glyph `index`.
    pub fn cluster_text(&self, index: usize) -> &str {
        let cluster = self.glyphs[index].cluster;
        &self.text[cluster as usize..self.cluster_end(cluster)]
    }

    /// Whether glyph `index` renders a single-space cluster; such glyphs
    /// receive word spacing after their advance.
    pub fn is_space_cluster(&self, index: usize) -> bool {
        self.cluster_text(index) == " "
    }

    /// Number of glyphs carrying word spacing.
    pub fn space_cluster_count(&self) -> usize {
        (0..self.glyphs.len())
            .filter(|&index| self.is_space_cluster(index))
            .count()
    }

    /// `(glyph id, cluster text)` pairs for ToUnicode accumulation.
    ///
    /// The first glyph of each cluster carries the full logical substring
    /// the cluster covers; any further glyphs of the same cluster carry
    /// an empty string.
    pub fn cluster_pairs(&self) -> Vec<(u16, String)> {
        let mut seen: Vec<u32> = Vec::new();
        self.glyphs
            .iter()
            .enumerate()
            .map(|(index, glyph)| {
                let text = if seen.contains(&glyph.cluster) {
                    String::new()
                } else {
                    seen.push(glyph.cluster);
                    self.cluster_text(index).to_string()
                };
                (glyph.glyph_id as u16, text)
            })
            .collect()
    }

    /// Advance of the whole run in user units at the given size,
    /// including letter spacing after every glyph and word spacing after
    /// space clusters.
    pub fn advance_width(&self, size: f64, letter_spacing: f64, word_spacing: f64) -> f64 {
        let scale = size / self.units_per_em as f64;
        let mut width = 0.0;
        for (index, glyph) in self.glyphs.iter().enumerate() {
            width += glyph.x_advance as f64 * scale + letter_spacing;
            if self.is_space_cluster(index) {
                width += word_spacing;
            }
        }
        width
    }
}

/// Borrowed view over the configured fonts, in fallback order.
pub struct TextPipeline<'a> {
    fonts: Vec<(String, &'a dyn Shaper)>,
    default_index: usize,
}

impl<'a> TextPipeline<'a> {
    /// Builds a pipeline over `fonts` (fallback order) with
    /// `default_font` as the last resort.
    pub fn new(
        fonts: Vec<(String, &'a dyn Shaper)>,
        default_font: &str,
    ) -> Result<Self, LayoutError> {
        if fonts.is_empty() {
            return Err(LayoutError::NoFonts);
        }
        let default_index = fonts
            .iter()
            .position(|(key, _)| key == default_font)
            .ok_or_else(|| LayoutError::FontNotConfigured(default_font.to_string()))?;
        Ok(Self {
            fonts,
            default_index,
        })
    }

    pub fn default_font(&self) -> &str {
        &self.fonts[self.default_index].0
    }

    /// First font in fallback order that covers `ch`; the default font
    /// takes anything nobody covers (and renders `.notdef`).
    fn select_font(&self, ch: char) -> usize {
        if self.fonts[self.default_index].1.glyph_id(ch) > 0 {
            return self.default_index;
        }
        for (index, (_, shaper)) in self.fonts.iter().enumerate() {
            if shaper.glyph_id(ch) > 0 {
                return index;
            }
        }
        tracing::debug!(codepoint = %ch.escape_unicode(), "no configured font covers code point");
        self.default_index
    }

    /// Splits `text` into `(font, substring, direction)` runs.
    pub fn segment(&self, text: &str) -> Vec<TextRun> {
        segment_with(text, self.default_index, |ch| self.select_font(ch))
            .into_iter()
            .map(|raw| TextRun {
                font: self.fonts[raw.font_index].0.clone(),
                text: raw.text,
                rtl: raw.rtl,
            })
            .collect()
    }

    /// Shapes one segmented run.
    pub fn shape_run(&self, run: &TextRun) -> ShapedRun {
        let (_, shaper) = self
            .fonts
            .iter()
            .find(|(key, _)| *key == run.font)
            .unwrap_or(&self.fonts[self.default_index]);
        let direction = if run.rtl {
            Direction::RightToLeft
        } else {
            Direction::LeftToRight
        };
        ShapedRun {
            font: run.font.clone(),
            text: run.text.clone(),
            rtl: run.rtl,
            units_per_em: shaper.units_per_em(),
            glyphs: shaper.shape(&run.text, direction),
        }
    }

    /// Segments and shapes a whole string.
    pub fn shape(&self, text: &str) -> Vec<ShapedRun> {
        self.segment(text)
            .iter()
            .map(|run| self.shape_run(run))
            .collect()
    }

    /// Measured width of a free string: per-run advances plus letter
    /// spacing, no word-spacing extras.
    pub fn measure(&self, text: &str, size: f64, letter_spacing: f64) -> f64 {
        self.shape(text)
            .iter()
            .map(|run| run.advance_width(size, letter_spacing, 0.0))
            .sum()
    }

    /// Base direction of a line: the direction of the first run with a
    /// non-space character, else the caller's hint.
    pub fn base_direction(&self, text: &str, rtl_hint: Option<bool>) -> bool {
        text.chars()
            .find(|ch| !ch.is_whitespace() && !crate::segment::is_neutral(*ch))
            .map(is_strong_rtl)
            .or(rtl_hint)
            .unwrap_or(false)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    /// Scripted shaper: covers an explicit character set, fixed advance
    /// per glyph, reverses glyph order for RTL like a real shaper.
    pub struct MockShaper {
        pub covered: fn(char) -> bool,
        pub advance: i32,
        pub space_advance: i32,
    }

    impl MockShaper {
        pub fn latin() -> Self {
            MockShaper {
                covered: |ch| ch.is_ascii_graphic() || ch == ' ',
                advance: 600,
                space_advance: 300,
            }
        }

        pub fn arabic() -> Self {
            MockShaper {
                covered: |ch| crate::segment::is_strong_rtl(ch) || ch == ' ',
                advance: 500,
                space_advance: 300,
            }
        }
    }

    impl Shaper for MockShaper {
        fn glyph_id(&self, codepoint: char) -> u32 {
            if (self.covered)(codepoint) {
                codepoint as u32
            } else {
                0
            }
        }

        fn shape(&self, text: &str, direction: Direction) -> Vec<ShapedGlyph> {
            let mut glyphs: Vec<ShapedGlyph> = text
                .char_indices()
                .map(|(at, ch)| ShapedGlyph {
                    glyph_id: self.glyph_id(ch),
                    x_advance: if ch == ' ' { self.space_advance } else { self.advance },
                    y_advance: 0,
                    x_offset: 0,
                    y_offset: 0,
                    cluster: at as u32,
                })
                .collect();
            if direction == Direction::RightToLeft {
                glyphs.reverse();
            }
            glyphs
        }

        fn units_per_em(&self) -> u16 {
            1000
        }
    }
}
