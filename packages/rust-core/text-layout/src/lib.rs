//! Multi-script text layout for PDF composition.
//!
//! Turns a logical user string into positioned, shaped glyph runs:
//!
//! 1. **Segmentation** (`segment`) - splits text into runs wherever the
//!    resolved direction or the covering font changes. Strong
//!    right-to-left scripts (Arabic and friends, Hebrew, Syriac, Thaana)
//!    go right-to-left; digits are always left-to-right; whitespace and a
//!    small neutral set inherit the open run instead of fragmenting it.
//! 2. **Fallback** - each code point takes the first configured font
//!    whose face covers it, else the default font renders `.notdef`.
//! 3. **Shaping** - every run goes through the `font-toolkit` shaper
//!    bridge and comes back as visual-order glyphs.
//! 4. **Line breaking** (`linebreak`) - greedy, word-based, no mid-word
//!    breaks.
//! 5. **Composition** (`compose`) - alignment, justification, and the
//!    per-line BiDi cursor walk that places runs visually.
//!
//! # BiDi scope
//!
//! This is deliberately not UAX #9. There are no embedding levels,
//! isolates, overrides, bracket pairing, or mirroring: classification is
//! strong-LTR / strong-RTL / inheriting-neutral, and line composition
//! walks runs logically while moving a cursor in the base direction.
//! That covers mixed Arabic/Latin/digit text the way the surrounding
//! tooling expects; documents needing full bidirectional control are out
//! of scope.

mod compose;
mod error;
mod linebreak;
mod pipeline;
mod segment;

pub use compose::{Align, ComposedLine, PositionedRun, TextLayout, TextOptions};
pub use error::LayoutError;
pub use linebreak::wrap_text;
pub use pipeline::{ShapedRun, TextPipeline, TextRun};
pub use segment::{is_ltr_digit, is_neutral, is_strong_rtl};
