//! TrueType table reading
//!
//! Pulls the metrics PDF font objects need out of a parsed face. Widths
//! are scaled to PDF's 1000-unit text space: the CIDFont `W` array is
//! specified in thousandths of text space, not in font design units, so a
//! 2048-upem font's 1138-unit advance becomes 555 here.

use ttf_parser::{Face, GlyphId};

/// Advance widths for every glyph, indexed by glyph id, scaled so that
/// 1000 units equal one em.
pub fn extract_glyph_widths(face: &Face) -> Vec<u16> {
    let num_glyphs = face.number_of_glyphs();
    let units_per_em = face.units_per_em() as u32;
    let mut widths = Vec::with_capacity(num_glyphs as usize);

    for glyph_id in 0..num_glyphs {
        let advance = face.glyph_hor_advance(GlyphId(glyph_id)).unwrap_or(0);
        let scaled = ((advance as u32 * 1000) / units_per_em) as u16;
        widths.push(scaled);
    }

    widths
}

/// Face-level metrics for the FontDescriptor, in 1000-unit text space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceMetrics {
    pub units_per_em: u16,
    pub ascent: i16,
    pub descent: i16,
    pub cap_height: i16,
    pub italic_angle: f32,
    pub bbox: [i16; 4],
}

/// Reads descriptor metrics from `head`, `hhea`, and `OS/2`.
///
/// A face without `OS/2` falls back to the ascender for the cap height,
/// the same substitution the descriptor consumers make.
pub fn extract_face_metrics(face: &Face) -> FaceMetrics {
    let scale = 1000.0 / face.units_per_em() as f32;
    let to_text_space = |value: i16| (value as f32 * scale).round() as i16;

    let bbox = face.global_bounding_box();
    let ascent = to_text_space(face.ascender());

    FaceMetrics {
        units_per_em: face.units_per_em() as u16,
        ascent,
        descent: to_text_space(face.descender()),
        cap_height: face.capital_height().map(to_text_space).unwrap_or(ascent),
        italic_angle: face.italic_angle(),
        bbox: [
            to_text_space(bbox.x_min),
            to_text_space(bbox.y_min),
            to_text_space(bbox.x_max),
            to_text_space(bbox.y_max),
        ],
    }
}
