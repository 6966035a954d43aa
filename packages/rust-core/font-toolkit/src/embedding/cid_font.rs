//! ABOUTME: CIDFont (DescendantFont) creation for PDF embedding
//! ABOUTME: Builds the CIDFontType2 dictionary with an identity CID→GID map

use pdf_writer::{dict, Object, ObjectId, ObjectWriter};
use ttf_parser::Face;

use super::constants::DEFAULT_GLYPH_WIDTH;
use crate::truetype::extract_glyph_widths;

/// Creates the CIDFontType2 dictionary.
///
/// Character codes in the content stream are glyph ids (`/Identity-H` on
/// the parent, `/CIDToGIDMap /Identity` here), so the `W` array is simply
/// the per-glyph-id width table, grouped into consecutive same-width
/// ranges.
pub fn create_cid_font(
    writer: &mut ObjectWriter,
    font_name: &str,
    font_descriptor_id: ObjectId,
    face: &Face,
) -> ObjectId {
    let widths = extract_glyph_widths(face);
    let default_width = widths.first().copied().unwrap_or(DEFAULT_GLYPH_WIDTH) as i64;
    let w_array = build_width_array(&widths);

    let mut cid_font = dict! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => Object::name(font_name),
        "CIDSystemInfo" => dict! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0i64,
        },
        "FontDescriptor" => font_descriptor_id,
        "DW" => default_width,
        "CIDToGIDMap" => "Identity",
    };
    cid_font.set(
        "W",
        Object::Array(w_array.into_iter().map(Object::Integer).collect()),
    );

    writer.add_dict(cid_font)
}

/// Groups consecutive glyph ids with the same width into
/// `[start end width]` triples.
fn build_width_array(widths: &[u16]) -> Vec<i64> {
    let mut w_array = Vec::new();
    let mut index = 0;

    while index < widths.len() {
        let width = widths[index];
        let start = index;
        while index + 1 < widths.len() && widths[index + 1] == width {
            index += 1;
        }
        w_array.push(start as i64);
        w_array.push(index as i64);
        w_array.push(width as i64);
        index += 1;
    }

    w_array
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_width_array_groups_ranges() {
        let w = build_width_array(&[500, 600, 600, 600, 300]);
        assert_eq!(w, vec![0, 0, 500, 1, 3, 600, 4, 4, 300]);
    }

    #[test]
    fn test_build_width_array_single_glyph() {
        assert_eq!(build_width_array(&[250]), vec![0, 0, 250]);
    }

    #[test]
    fn test_build_width_array_empty() {
        assert!(build_width_array(&[]).is_empty());
    }

    #[test]
    fn test_cid_font_shape() {
        let font = pdf_test_utils::latin_font();
        let face = Face::parse(&font, 0).expect("fixture should parse");
        let mut writer = ObjectWriter::new([0u8; 16]);

        let cid_font_id = create_cid_font(&mut writer, "Test-Regular", ObjectId(2), &face);
        let cid_font = writer.dict_mut(cid_font_id).expect("stored");

        assert_eq!(
            cid_font.get("Subtype"),
            Some(&Object::Name("CIDFontType2".into()))
        );
        assert_eq!(
            cid_font.get("CIDToGIDMap"),
            Some(&Object::Name("Identity".into())),
            "glyph ids in the stream are the subset gids"
        );
        let system_info = cid_font
            .get("CIDSystemInfo")
            .and_then(Object::as_dict)
            .expect("CIDSystemInfo");
        assert_eq!(
            system_info.get("Registry"),
            Some(&Object::LiteralString(b"Adobe".to_vec()))
        );
        assert!(matches!(cid_font.get("W"), Some(Object::Array(_))));
    }
}
