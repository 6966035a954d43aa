//! ABOUTME: Constants for PDF font embedding
//! ABOUTME: FontDescriptor flags, StemV bounds, and width defaults

/// FontDescriptor `Flags`: symbolic font (glyphs outside Standard Latin).
/// Composite fonts with Identity encoding always declare this.
pub const FONT_FLAGS_SYMBOLIC: i64 = 32;

/// Default StemV value when measurement fails
pub const DEFAULT_STEM_V: i64 = 80;

/// Minimum allowed StemV value
pub const STEM_V_MIN: i64 = 50;

/// Maximum allowed StemV value
pub const STEM_V_MAX: i64 = 200;

/// Default glyph width when a glyph id has no hmtx entry
pub const DEFAULT_GLYPH_WIDTH: u16 = 1000;
