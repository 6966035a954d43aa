//! Line composition: alignment, justification, and the BiDi cursor walk
//!
//! Runs are walked in logical order. With a left-to-right base the cursor
//! moves right; with a right-to-left base it starts at the line's right
//! edge and each run's left edge is placed by subtracting the run width.
//! Every run still renders in its own direction - a digit run inside
//! Arabic text stays left-to-right locally, only the inter-run cursor
//! moves the other way.

use crate::linebreak::wrap_text;
use crate::pipeline::{ShapedRun, TextPipeline};

/// Horizontal alignment of a laid-out block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
    /// Stretch word gaps so each full line spans the available width; the
    /// last line reverts to start alignment.
    Justify,
}

/// Layout request for one block of text.
#[derive(Debug, Clone)]
pub struct TextOptions {
    /// Font size in points.
    pub size: f64,
    /// Wrap width; `None` lays the text out as a single line.
    pub width: Option<f64>,
    pub align: Align,
    /// Base-direction hint for lines without any strong character.
    pub rtl: Option<bool>,
    /// Extra advance after every space cluster.
    pub word_spacing: f64,
    /// Extra advance after every glyph.
    pub letter_spacing: f64,
    /// Baseline step between lines; defaults to `size * 1.4`.
    pub line_height: Option<f64>,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 12.0,
            width: None,
            align: Align::Left,
            rtl: None,
            word_spacing: 0.0,
            letter_spacing: 0.0,
            line_height: None,
        }
    }
}

/// A shaped run with its resolved position on the line.
#[derive(Debug, Clone)]
pub struct PositionedRun {
    pub run: ShapedRun,
    /// Left edge of the run, relative to the line origin.
    pub x: f64,
    /// Word spacing in effect for this run (style plus justification).
    pub word_spacing: f64,
}

/// One composed line.
#[derive(Debug, Clone)]
pub struct ComposedLine {
    pub runs: Vec<PositionedRun>,
    pub text: String,
    /// Width actually occupied, including justification stretch.
    pub width: f64,
    pub rtl_base: bool,
}

/// A fully laid-out block.
#[derive(Debug, Clone)]
pub struct TextLayout {
    pub lines: Vec<ComposedLine>,
    pub line_height: f64,
}

impl TextPipeline<'_> {
    /// Lays out a block: wraps (when a width is given), aligns,
    /// justifies, and composes each line.
    pub fn layout(&self, text: &str, options: &TextOptions) -> TextLayout {
        let lines: Vec<String> = match options.width {
            Some(width) if width > 0.0 => wrap_text(
                |candidate| self.measure(candidate, options.size, options.letter_spacing),
                text,
                width,
            ),
            _ => vec![text.to_string()],
        };

        let last = lines.len() - 1;
        let composed = lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| self.compose_line(&line, options, index == last))
            .collect();

        TextLayout {
            lines: composed,
            line_height: options.line_height.unwrap_or(options.size * 1.4),
        }
    }

    /// Composes one line of text into positioned runs.
    pub fn compose_line(
        &self,
        line: &str,
        options: &TextOptions,
        is_last: bool,
    ) -> ComposedLine {
        let runs: Vec<ShapedRun> = self.shape(line);
        let rtl_base = self.base_direction(line, options.rtl);

        // Measure with the style's word spacing only; justification
        // stretch comes on top.
        let measured: f64 = runs
            .iter()
            .map(|run| {
                run.advance_width(options.size, options.letter_spacing, options.word_spacing)
            })
            .sum();
        let space_count: usize = runs.iter().map(ShapedRun::space_cluster_count).sum();

        let (align, justify_extra) = match options.align {
            Align::Justify => {
                let available = options.width.unwrap_or(measured);
                if is_last || space_count == 0 || available <= measured {
                    // The last line of a justified paragraph reverts to
                    // start alignment.
                    let start = if rtl_base { Align::Right } else { Align::Left };
                    (start, 0.0)
                } else {
                    (Align::Justify, (available - measured) / space_count as f64)
                }
            }
            other => (other, 0.0),
        };
        let word_spacing = options.word_spacing + justify_extra;

        let widths: Vec<f64> = runs
            .iter()
            .map(|run| run.advance_width(options.size, options.letter_spacing, word_spacing))
            .collect();
        let total: f64 = widths.iter().sum();
        let available = options.width.unwrap_or(total);

        let offset = match align {
            Align::Left | Align::Justify => 0.0,
            Align::Right => available - total,
            Align::Center => (available - total) / 2.0,
        };

        let mut positioned = Vec::with_capacity(runs.len());
        if rtl_base {
            // Logical walk, right-to-left cursor.
            let mut cursor = offset + total;
            for (run, width) in runs.into_iter().zip(&widths) {
                cursor -= width;
                positioned.push(PositionedRun {
                    run,
                    x: cursor,
                    word_spacing,
                });
            }
        } else {
            let mut cursor = offset;
            for (run, width) in runs.into_iter().zip(&widths) {
                positioned.push(PositionedRun {
                    run,
                    x: cursor,
                    word_spacing,
                });
                cursor += width;
            }
        }

        ComposedLine {
            runs: positioned,
            text: line.to_string(),
            width: total,
            rtl_base,
        }
    }
}
