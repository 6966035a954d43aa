//! ABOUTME: PDF object creation for font embedding
//! ABOUTME: FontFile2, FontDescriptor, and Type 0 font dictionaries

use pdf_writer::{dict, Object, ObjectId, ObjectWriter};
use ttf_parser::Face;

use super::constants::{DEFAULT_STEM_V, FONT_FLAGS_SYMBOLIC, STEM_V_MAX, STEM_V_MIN};
use super::EmbedError;
use crate::truetype::extract_face_metrics;

/// Creates the FontFile2 stream (the TrueType bytes, flate-compressed by
/// the writer; `Length1` records the uncompressed size).
pub fn create_font_file_stream(writer: &mut ObjectWriter, font_bytes: &[u8]) -> ObjectId {
    let stream_dict = dict! {
        "Length1" => font_bytes.len() as i64,
    };
    writer.add_stream(stream_dict, font_bytes.to_vec())
}

/// Creates the FontDescriptor dictionary from face metrics.
pub fn create_font_descriptor(
    writer: &mut ObjectWriter,
    font_name: &str,
    face: &Face,
    font_file_id: ObjectId,
) -> Result<ObjectId, EmbedError> {
    let metrics = extract_face_metrics(face);
    let stem_v = calculate_stem_v(face);

    let descriptor = dict! {
        "Type" => "FontDescriptor",
        "FontName" => Object::name(font_name),
        "Flags" => FONT_FLAGS_SYMBOLIC,
        "FontBBox" => vec![
            Object::Integer(metrics.bbox[0] as i64),
            Object::Integer(metrics.bbox[1] as i64),
            Object::Integer(metrics.bbox[2] as i64),
            Object::Integer(metrics.bbox[3] as i64),
        ],
        "ItalicAngle" => Object::Real(metrics.italic_angle as f64),
        "Ascent" => metrics.ascent as i64,
        "Descent" => metrics.descent as i64,
        "CapHeight" => metrics.cap_height as i64,
        "StemV" => stem_v,
        "FontFile2" => font_file_id,
    };

    Ok(writer.add_dict(descriptor))
}

/// Creates the top-level Type 0 composite font.
///
/// `ToUnicode` is attached later, once the document knows which glyphs
/// were actually drawn.
pub fn create_type0_font(
    writer: &mut ObjectWriter,
    font_name: &str,
    cid_font_id: ObjectId,
) -> ObjectId {
    let type0_font = dict! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::name(font_name),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
    };
    writer.add_dict(type0_font)
}

/// Estimates StemV from the width of a clear vertical stem.
///
/// Measures 'I' or 'l'; falls back to a conventional value when neither
/// has an outline (symbol-only faces).
fn calculate_stem_v(face: &Face) -> i64 {
    for probe in ['I', 'l'] {
        if let Some(glyph_id) = face.glyph_index(probe) {
            if let Some(bbox) = face.glyph_bounding_box(glyph_id) {
                let width = bbox.x_max - bbox.x_min;
                return (width as i64).clamp(STEM_V_MIN, STEM_V_MAX);
            }
        }
    }
    DEFAULT_STEM_V
}
