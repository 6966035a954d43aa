//! Builtin Helvetica support
//!
//! When no TrueType font is configured (or a face cannot shape), text
//! falls back to the builtin `/Helvetica` Type1 font with literal-string
//! emission. Widths come from the Adobe Font Metrics for Helvetica so
//! measurement and wrapping stay accurate on this path too.

use pdf_writer::{dict, ObjectId, ObjectWriter};

/// Advance width of one character in thousandths of an em, per the
/// Helvetica AFM. Characters outside the table use a middling default.
pub fn helvetica_width(ch: char) -> u32 {
    match ch {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' => 278,
        '"' => 355,
        '#' | '$' | '?' | '_' | '0'..='9' => 556,
        '%' => 889,
        '&' => 667,
        '\'' => 191,
        '(' | ')' => 333,
        '*' => 389,
        '+' | '<' | '=' | '>' | '~' => 584,
        '-' => 333,
        '@' => 1015,
        'A' | 'B' | 'E' | 'K' | 'S' | 'V' | 'X' | 'Y' => 667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722,
        'F' | 'T' | 'Z' => 611,
        'G' | 'O' | 'Q' => 778,
        'I' | '[' | '\\' | ']' => 278,
        'J' => 500,
        'L' => 556,
        'M' => 833,
        'P' => 667,
        'W' => 944,
        '^' => 469,
        '`' => 333,
        'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 556,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'f' | 't' => 278,
        'i' | 'j' | 'l' => 222,
        'm' => 833,
        'r' => 333,
        'w' => 722,
        '{' | '}' => 334,
        '|' => 260,
        _ => 556,
    }
}

/// Measured width of a string at `size`, in points.
pub fn measure_helvetica(text: &str, size: f64, letter_spacing: f64) -> f64 {
    let units: u32 = text.chars().map(helvetica_width).sum();
    units as f64 / 1000.0 * size + letter_spacing * text.chars().count() as f64
}

/// Stores the builtin `/Helvetica` Type1 font object.
///
/// No font program is embedded; every conforming reader supplies the
/// Standard 14 faces.
pub fn create_helvetica_font(writer: &mut ObjectWriter) -> ObjectId {
    writer.add_dict(dict! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    })
}
