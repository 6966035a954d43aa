//! ABOUTME: ToUnicode CMap generation for PDF text extraction
//! ABOUTME: Maps emitted glyph ids back to the source text they rendered

use std::fmt::Write as FmtWrite;

use pdf_writer::{Dictionary, ObjectId, ObjectWriter};

/// Creates the ToUnicode CMap stream from recorded `(glyph id, text)`
/// pairs.
///
/// Pairs arrive in drawing order and may repeat; the first recording of a
/// glyph id wins. The mapped value is the UTF-16BE encoding of the whole
/// cluster text, so ligature-style many-to-one clusters extract intact.
pub fn create_to_unicode_cmap(
    writer: &mut ObjectWriter,
    pairs: &[(u16, String)],
) -> ObjectId {
    let cmap_content = generate_cmap_content(pairs);
    writer.add_stream(Dictionary::new(), cmap_content.into_bytes())
}

/// Generates CMap content as a PostScript string.
fn generate_cmap_content(pairs: &[(u16, String)]) -> String {
    let mut seen: Vec<(u16, &str)> = Vec::with_capacity(pairs.len());
    for (gid, text) in pairs {
        if text.is_empty() || seen.iter().any(|(known, _)| known == gid) {
            continue;
        }
        seen.push((*gid, text));
    }
    seen.sort_by_key(|(gid, _)| *gid);

    let mut cmap = String::with_capacity(260 + seen.len() * 20);
    cmap.push_str(CMAP_HEADER);

    if !seen.is_empty() {
        let _ = writeln!(&mut cmap, "{} beginbfchar", seen.len());
        for (gid, text) in &seen {
            let _ = writeln!(&mut cmap, "<{:04X}> <{}>", gid, utf16_be_hex(text));
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str(CMAP_FOOTER);
    cmap
}

/// UTF-16BE hex of a string; code points above U+FFFF expand to surrogate
/// pairs.
fn utf16_be_hex(text: &str) -> String {
    let mut hex = String::with_capacity(text.len() * 4);
    for unit in text.encode_utf16() {
        let _ = write!(&mut hex, "{:04X}", unit);
    }
    hex
}

/// ToUnicode CMap header (PostScript)
const CMAP_HEADER: &str = "/CIDInit /ProcSet findresource begin\n\
12 dict begin\n\
begincmap\n\
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
/CMapName /Identity-H def\n\
1 begincodespacerange\n\
<0000> <FFFF>\n\
endcodespacerange\n";

/// ToUnicode CMap footer (PostScript)
const CMAP_FOOTER: &str = "endcmap\n\
CMapName currentdict /CMap defineresource pop\n\
end end";
