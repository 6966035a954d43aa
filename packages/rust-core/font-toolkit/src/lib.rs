//! Font processing for PDF composition.
//!
//! Everything between raw TrueType bytes and a PDF-embeddable composite
//! font lives here:
//!
//! - **Shaping** (`shaper`) - turns logical text into positioned glyphs
//!   through a trait-backed bridge; the production implementation wraps
//!   `rustybuzz`, tests can script their own.
//! - **Metrics** (`truetype`) - glyph widths and face metrics read from
//!   the `head`, `hhea`, `hmtx`, `OS/2`, and `post` tables via
//!   `ttf-parser`, scaled to PDF's 1000-unit text space.
//! - **Embedding** (`embedding`) - writes the Type 0 / CIDFontType2 /
//!   FontDescriptor / FontFile2 object cluster with `/Identity-H`
//!   encoding, and the ToUnicode CMap that maps emitted glyph ids back to
//!   the text they came from.
//!
//! # Glyph ids are the character codes
//!
//! Content streams written against these fonts encode 2-byte big-endian
//! glyph ids directly (`/Identity-H` + `/CIDToGIDMap /Identity`), so text
//! extraction depends entirely on the ToUnicode CMap. The CMap is built
//! from `(glyph id, source text)` pairs recorded while text is laid out,
//! and attached to the Type 0 font at save time.

pub mod embedding;
pub mod shaper;
pub mod truetype;

pub use embedding::{attach_to_unicode, embed_truetype_font, EmbedError, EmbeddedFont};
pub use shaper::{Direction, RustybuzzShaper, ShapedGlyph, Shaper, ShaperError};
