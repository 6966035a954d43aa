//! Complex text shaping bridge
//!
//! The layout pipeline needs three things from a shaper: whether a face
//! covers a code point, the shaped glyphs for a `(text, direction)` pair
//! in visual order, and the face's design-unit scale. [`Shaper`] is that
//! seam; [`RustybuzzShaper`] is the production implementation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShaperError {
    #[error("failed to parse font: {0}")]
    InvalidFont(String),
}

/// Text direction of a shaping run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

/// One positioned glyph out of the shaper.
///
/// Advances and offsets are in font design units. `cluster` is the byte
/// offset into the input string of the first character this glyph covers;
/// glyphs sharing a cluster value render one source cluster together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapedGlyph {
    /// Glyph id; 0 means the face has no glyph for the source character.
    pub glyph_id: u32,
    pub x_advance: i32,
    pub y_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub cluster: u32,
}

/// Shaping interface consumed by the text pipeline.
///
/// Output must be in **visual** order for the requested direction: an RTL
/// run comes back with the glyph for the logically-last character first.
pub trait Shaper {
    /// Glyph id for a code point, 0 when the face lacks coverage.
    fn glyph_id(&self, codepoint: char) -> u32;

    /// Shapes `text` as a single run of the given direction.
    fn shape(&self, text: &str, direction: Direction) -> Vec<ShapedGlyph>;

    /// Design units per em, for scaling advances to text space.
    fn units_per_em(&self) -> u16;
}

/// Production shaper over `rustybuzz`.
///
/// Owns the font bytes and re-parses the face per call; faces borrow the
/// byte buffer, and shaping cost dwarfs the table-directory parse.
pub struct RustybuzzShaper {
    data: Vec<u8>,
    units_per_em: u16,
}

impl RustybuzzShaper {
    /// Validates the font and opens a shaper over it.
    pub fn open(data: Vec<u8>) -> Result<Self, ShaperError> {
        let face = rustybuzz::Face::from_slice(&data, 0)
            .ok_or_else(|| ShaperError::InvalidFont("unreadable table directory".to_string()))?;
        let units_per_em = face.units_per_em() as u16;
        Ok(Self {
            data,
            units_per_em,
        })
    }

    fn face(&self) -> rustybuzz::Face<'_> {
        rustybuzz::Face::from_slice(&self.data, 0).expect("font bytes were validated at open")
    }
}

impl Shaper for RustybuzzShaper {
    fn glyph_id(&self, codepoint: char) -> u32 {
        self.face()
            .glyph_index(codepoint)
            .map(|gid| gid.0 as u32)
            .unwrap_or(0)
    }

    fn shape(&self, text: &str, direction: Direction) -> Vec<ShapedGlyph> {
        let face = self.face();
        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.set_direction(match direction {
            Direction::LeftToRight => rustybuzz::Direction::LeftToRight,
            Direction::RightToLeft => rustybuzz::Direction::RightToLeft,
        });

        let output = rustybuzz::shape(&face, &[], buffer);
        output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, position)| ShapedGlyph {
                glyph_id: info.glyph_id,
                x_advance: position.x_advance,
                y_advance: position.y_advance,
                x_offset: position.x_offset,
                y_offset: position.y_offset,
                cluster: info.cluster,
            })
            .collect()
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }
}
