//! ABOUTME: TrueType font embedding for PDF
//! ABOUTME: Embeds TrueType fonts as CIDFont (Type 0 composite) per ISO 32000

mod cid_font;
mod constants;
mod pdf_objects;
mod to_unicode;

use pdf_writer::{ObjectId, ObjectWriter};
use ttf_parser::Face;

pub use to_unicode::create_to_unicode_cmap;

/// Font embedding errors
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("failed to parse font: {0}")]
    ParseError(String),
}

/// References to the embedded object cluster of one font.
pub struct EmbeddedFont {
    /// The Type 0 font - what page resource dictionaries point at.
    pub font_ref: ObjectId,
    /// The CIDFontType2 descendant.
    pub cid_font_ref: ObjectId,
    /// The FontDescriptor.
    pub descriptor_ref: ObjectId,
    /// PostScript base name as written into `BaseFont`.
    pub base_name: String,
    /// Design units per em, for scaling shaped advances.
    pub units_per_em: u16,
}

/// Embeds a TrueType font as a Type 0 composite font.
///
/// The whole font file is embedded. Content streams address glyphs by id
/// (`/Identity-H`, `/CIDToGIDMap /Identity`), and the ToUnicode CMap is
/// attached later via [`attach_to_unicode`] once the document has
/// recorded which glyphs rendered which text.
///
/// # PDF structure created
/// ```text
/// Type 0 Font
///   |- BaseFont: /Name
///   |- Encoding: Identity-H
///   +- DescendantFonts: [CIDFontType2]
///       |- CIDSystemInfo: (Adobe, Identity, 0)
///       |- W: per-gid widths, CIDToGIDMap: /Identity
///       +- FontDescriptor
///           +- FontFile2: TrueType stream
/// ```
pub fn embed_truetype_font(
    writer: &mut ObjectWriter,
    font_bytes: &[u8],
    base_name: &str,
) -> Result<EmbeddedFont, EmbedError> {
    let face =
        Face::parse(font_bytes, 0).map_err(|e| EmbedError::ParseError(format!("{:?}", e)))?;

    let font_file_id = pdf_objects::create_font_file_stream(writer, font_bytes);
    let descriptor_ref =
        pdf_objects::create_font_descriptor(writer, base_name, &face, font_file_id)?;
    let cid_font_ref = cid_font::create_cid_font(writer, base_name, descriptor_ref, &face);
    let font_ref = pdf_objects::create_type0_font(writer, base_name, cid_font_ref);

    Ok(EmbeddedFont {
        font_ref,
        cid_font_ref,
        descriptor_ref,
        base_name: base_name.to_string(),
        units_per_em: face.units_per_em() as u16,
    })
}

/// Builds the ToUnicode CMap from recorded pairs and patches it into the
/// Type 0 font dictionary.
pub fn attach_to_unicode(
    writer: &mut ObjectWriter,
    font_ref: ObjectId,
    pairs: &[(u16, String)],
) {
    let cmap_ref = create_to_unicode_cmap(writer, pairs);
    if let Some(font_dict) = writer.dict_mut(font_ref) {
        font_dict.set("ToUnicode", cmap_ref);
    }
}
