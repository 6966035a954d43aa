//! Text rendering integration tests
//!
//! The end-to-end scenarios: builtin Helvetica text, embedded shaped
//! Arabic, mixed-direction lines with digits, justification, decorations,
//! and the ToUnicode mappings that make extraction return logical text.

use pdf_generator::{
    Align, Document, DocumentConfig, FontConfig, ScriptPosition, TextStyle,
};
use pdf_test_utils::{count, find, inflate, object_body, stream_body, trailer};

// ============================================================================
// Helpers
// ============================================================================

fn helvetica_config() -> DocumentConfig {
    DocumentConfig {
        compress_content_streams: false,
        deterministic: true,
        ..DocumentConfig::default()
    }
}

fn shaped_config() -> DocumentConfig {
    DocumentConfig {
        fonts: vec![
            FontConfig {
                key: "AR".to_string(),
                base_name: "TestArabic".to_string(),
                data: pdf_test_utils::arabic_font(),
            },
            FontConfig {
                key: "EN".to_string(),
                base_name: "TestLatin".to_string(),
                data: pdf_test_utils::latin_font(),
            },
        ],
        default_font: Some("AR".to_string()),
        compress_content_streams: false,
        deterministic: true,
        ..DocumentConfig::default()
    }
}

fn object_count(pdf: &[u8]) -> u32 {
    let trailer = trailer(pdf).expect("trailer present");
    String::from_utf8_lossy(trailer)
        .split("/Size ")
        .nth(1)
        .and_then(|tail| tail.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .expect("trailer Size")
}

fn page_content(pdf: &[u8]) -> String {
    for id in 1..object_count(pdf) {
        let Some(object) = object_body(pdf, id) else {
            continue;
        };
        if find(object, b"/Filter").is_some() {
            continue;
        }
        if let Some(body) = stream_body(object) {
            if !body.is_empty() {
                return String::from_utf8_lossy(body).into_owned();
            }
        }
    }
    panic!("no uncompressed content stream found");
}

/// The inflated ToUnicode CMap of the Type0 font with the given base name.
fn to_unicode_cmap(pdf: &[u8], base_name: &str) -> String {
    let needle = format!("/BaseFont /{}", base_name);
    let mut rest = pdf;
    let mut offset = 0;
    let type0_at = loop {
        let at = find(rest, needle.as_bytes()).expect("Type0 font present");
        let window = &rest[at..(at + 400).min(rest.len())];
        if find(window, b"/Subtype /Type0").is_some() {
            break offset + at;
        }
        offset += at + needle.len();
        rest = &rest[at + needle.len()..];
    };

    let tail = &pdf[type0_at..];
    let to_unicode_at =
        find(tail, b"/ToUnicode ").expect("ToUnicode attached") + b"/ToUnicode ".len();
    let id: u32 = String::from_utf8_lossy(&tail[to_unicode_at..(to_unicode_at + 12).min(tail.len())])
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .expect("ToUnicode reference id");

    let object = object_body(pdf, id).expect("ToUnicode object");
    let body = stream_body(object).expect("ToUnicode stream");
    String::from_utf8_lossy(&inflate(body)).into_owned()
}

/// All `1 0 0 1 x y Tm` positions, in emission order.
fn glyph_positions(content: &str) -> Vec<(f64, f64)> {
    content
        .lines()
        .filter_map(|line| {
            let rest = line.strip_prefix("1 0 0 1 ")?;
            let mut parts = rest.split_whitespace();
            let x: f64 = parts.next()?.parse().ok()?;
            let y: f64 = parts.next()?.parse().ok()?;
            (parts.next() == Some("Tm")).then_some((x, y))
        })
        .collect()
}

// ============================================================================
// Builtin Helvetica path
// ============================================================================

#[test]
fn test_ascii_hello_over_helvetica() {
    let mut document = Document::new(helvetica_config()).expect("document builds");
    document.add_page(595.0, 842.0);
    document
        .text("Hello", 72.0, 800.0, &TextStyle { size: 12.0, ..TextStyle::default() })
        .expect("text draws");
    let pdf = document.save().expect("save succeeds");

    assert!(find(&pdf, b"/BaseFont /Helvetica").is_some());
    assert!(find(&pdf, b"/Subtype /Type1").is_some());
    let content = page_content(&pdf);
    assert!(content.contains("(Hello) Tj"));
    assert!(content.contains("/F0 12 Tf"));
    assert!(content.contains("72 800 Td"));
}

#[test]
fn test_helvetica_wrapping_and_right_alignment() {
    let mut document = Document::new(helvetica_config()).expect("document builds");
    document.add_page(595.0, 842.0);
    // "wide words here" at 12pt: measured per the AFM table, wraps at 50pt.
    document
        .text(
            "wide words here",
            100.0,
            700.0,
            &TextStyle {
                size: 12.0,
                width: Some(50.0),
                align: Align::Right,
                ..TextStyle::default()
            },
        )
        .expect("text draws");
    let pdf = document.save().expect("save succeeds");
    let content = page_content(&pdf);

    assert!(content.matches(" Tj\n").count() >= 2, "text wrapped into lines");
    // Lines step down by 1.4 em.
    assert!(content.contains("700 Td") || content.contains(" 700 Td"));
    assert!(content.contains("683.2 Td\n") || content.contains(" 683.2 Td"));
}

#[test]
fn test_subscript_and_superscript_adjust_size_and_baseline() {
    let mut document = Document::new(helvetica_config()).expect("document builds");
    document.add_page(200.0, 200.0);
    document
        .text(
            "2",
            50.0,
            100.0,
            &TextStyle {
                size: 10.0,
                script: ScriptPosition::Subscript,
                ..TextStyle::default()
            },
        )
        .expect("subscript draws");
    document
        .text(
            "n",
            60.0,
            100.0,
            &TextStyle {
                size: 10.0,
                script: ScriptPosition::Superscript,
                ..TextStyle::default()
            },
        )
        .expect("superscript draws");
    let pdf = document.save().expect("save succeeds");
    let content = page_content(&pdf);

    assert!(content.contains("/F0 6 Tf"), "script text renders at 60% size");
    assert!(content.contains("50 99.25 Td"), "subscript drops 0.075 em");
    assert!(content.contains("60 103.5 Td"), "superscript rises 0.35 em");
}

#[test]
fn test_underline_and_strikethrough_rules() {
    let mut document = Document::new(helvetica_config()).expect("document builds");
    document.add_page(300.0, 300.0);
    document
        .text(
            "ruled",
            20.0,
            100.0,
            &TextStyle {
                size: 10.0,
                underline: true,
                strikethrough: true,
                line_color: Some("red".to_string()),
                ..TextStyle::default()
            },
        )
        .expect("text draws");
    let pdf = document.save().expect("save succeeds");
    let content = page_content(&pdf);

    assert!(content.contains("1 0 0 RG"), "rule color is the line color");
    assert!(content.contains("0.5 w"));
    assert!(content.contains("20 99 m"), "underline 0.1 em below baseline");
    assert!(content.contains("20 103 m"), "strikethrough 0.3 em above baseline");
    assert_eq!(content.matches("S\n").count(), 2);
}

// ============================================================================
// Shaped text
// ============================================================================

#[test]
fn test_single_arabic_word_embeds_type0_and_hex_gids() {
    let mut document = Document::new(shaped_config()).expect("document builds");
    document.add_page(595.0, 842.0);
    document
        .text(
            "\u{0645}\u{0631}\u{062D}\u{0628}\u{0627}", // مرحبا
            72.0,
            720.0,
            &TextStyle { size: 40.0, rtl: Some(true), ..TextStyle::default() },
        )
        .expect("text draws");
    let pdf = document.save().expect("save succeeds");

    assert!(find(&pdf, b"/Subtype /Type0").is_some());
    assert!(find(&pdf, b"/Subtype /CIDFontType2").is_some());
    assert!(find(&pdf, b"/Encoding /Identity-H").is_some());
    assert!(find(&pdf, b"/CIDToGIDMap /Identity").is_some());
    assert!(find(&pdf, b"/FontFile2").is_some());

    // Fixture glyph ids are code-point-ordered: م=8 ر=5 ح=4 ب=3 ا=2,
    // emitted in visual order (reversed).
    let content = page_content(&pdf);
    for gid in [2u16, 3, 4, 5, 8] {
        let token = format!("<{:04X}> Tj", gid);
        assert!(content.contains(&token), "missing glyph token {}", token);
    }
    let first_alef = content.find("<0002> Tj").expect("alef token");
    let meem = content.find("<0008> Tj").expect("meem token");
    assert!(
        first_alef < meem,
        "visual order leads with the logically-last letter"
    );
}

#[test]
fn test_arabic_to_unicode_maps_gids_back_to_letters() {
    let mut document = Document::new(shaped_config()).expect("document builds");
    document.add_page(595.0, 842.0);
    document
        .text(
            "\u{0645}\u{0631}\u{062D}\u{0628}\u{0627}",
            72.0,
            720.0,
            &TextStyle { size: 40.0, ..TextStyle::default() },
        )
        .expect("text draws");
    let pdf = document.save().expect("save succeeds");

    let cmap = to_unicode_cmap(&pdf, "TestArabic");
    assert!(cmap.contains("/CMapName /Identity-H def"));
    assert!(cmap.contains("<0000> <FFFF>"));
    assert!(cmap.contains("5 beginbfchar"));
    for (gid, codepoint) in [(2u16, 0x0627u32), (3, 0x0628), (4, 0x062D), (5, 0x0631), (8, 0x0645)]
    {
        let line = format!("<{:04X}> <{:04X}>", gid, codepoint);
        assert!(cmap.contains(&line), "missing mapping {}", line);
    }
}

#[test]
fn test_mixed_rtl_line_with_digits() {
    let mut document = Document::new(shaped_config()).expect("document builds");
    document.add_page(595.0, 842.0);
    document
        .text(
            "\u{067E}\u{0695}\u{06C6}\u{0698}\u{06D5}\u{06CC} 36", // پڕۆژەی 36
            400.0,
            400.0,
            &TextStyle {
                size: 14.0,
                width: Some(200.0),
                align: Align::Right,
                ..TextStyle::default()
            },
        )
        .expect("text draws");
    let pdf = document.save().expect("save succeeds");
    let content = page_content(&pdf);

    // Both fonts are on the page: Arabic as F1, digits through F2.
    assert!(content.contains("/F1 14 Tf"));
    assert!(content.contains("/F2 14 Tf"));

    let positions = glyph_positions(&content);
    assert_eq!(positions.len(), 9, "six letters, space, two digits");
    let max_x = positions.iter().map(|&(x, _)| x).fold(f64::MIN, f64::max);
    let min_x = positions.iter().map(|&(x, _)| x).fold(f64::MAX, f64::min);

    // Right-aligned into [400, 600]: the rightmost glyph is an Arabic
    // letter ending at 600, the leftmost is the first digit.
    assert!((max_x - 593.0).abs() < 0.5, "rightmost glyph at {}", max_x);
    assert!((min_x - 537.0).abs() < 0.5, "leftmost glyph at {}", min_x);

    // Digit glyph ids ('3'=0x14, '6'=0x17 in the Latin fixture) appear in
    // LTR order: 3 left of 6.
    let three = content.find("<0014> Tj").expect("digit 3 token");
    let six = content.find("<0017> Tj").expect("digit 6 token");
    assert!(three < six);

    // Digits extract as digits from the Latin font's CMap.
    let cmap = to_unicode_cmap(&pdf, "TestLatin");
    assert!(cmap.contains("<0014> <0033>"));
    assert!(cmap.contains("<0017> <0036>"));
}

#[test]
fn test_justified_line_spans_available_width() {
    let mut document = Document::new(shaped_config()).expect("document builds");
    document.add_page(595.0, 842.0);
    document
        .text(
            "one two three four five six",
            10.0,
            700.0,
            &TextStyle {
                font: Some("EN".to_string()),
                size: 12.0,
                width: Some(100.0),
                align: Align::Justify,
                ..TextStyle::default()
            },
        )
        .expect("text draws");
    let pdf = document.save().expect("save succeeds");
    let content = page_content(&pdf);

    let positions = glyph_positions(&content);
    assert!(!positions.is_empty());
    let first_line_y = positions[0].1;
    let line_one: Vec<f64> = positions
        .iter()
        .filter(|&&(_, y)| (y - first_line_y).abs() < 0.01)
        .map(|&(x, _)| x)
        .collect();
    let rightmost = line_one.iter().fold(f64::MIN, |acc, &x| acc.max(x));
    // Last glyph is a 7.2pt letter whose right edge hits x + width.
    assert!(
        (rightmost + 7.2 - 110.0).abs() < 0.5,
        "justified right edge at {}",
        rightmost + 7.2
    );

    let last_line_y = positions.last().expect("glyphs exist").1;
    assert!(last_line_y < first_line_y, "paragraph wrapped");
}

#[test]
fn test_word_spacing_applies_after_space_clusters() {
    let build = |word_spacing: f64| {
        let mut document = Document::new(shaped_config()).expect("document builds");
        document.add_page(595.0, 842.0);
        document
            .text(
                "a b",
                0.0,
                100.0,
                &TextStyle {
                    font: Some("EN".to_string()),
                    size: 10.0,
                    word_spacing,
                    ..TextStyle::default()
                },
            )
            .expect("text draws");
        let pdf = document.save().expect("save succeeds");
        glyph_positions(&page_content(&pdf))
    };

    let plain = build(0.0);
    let spaced = build(5.0);
    // Only the glyph after the space moves.
    assert_eq!(plain[0].0, spaced[0].0);
    assert_eq!(plain[1].0, spaced[1].0);
    assert!((spaced[2].0 - plain[2].0 - 5.0).abs() < 1e-6);
}

#[test]
fn test_letter_spacing_applies_after_every_glyph() {
    let build = |letter_spacing: f64| {
        let mut document = Document::new(shaped_config()).expect("document builds");
        document.add_page(595.0, 842.0);
        document
            .text(
                "abc",
                0.0,
                100.0,
                &TextStyle {
                    font: Some("EN".to_string()),
                    size: 10.0,
                    letter_spacing,
                    ..TextStyle::default()
                },
            )
            .expect("text draws");
        let pdf = document.save().expect("save succeeds");
        glyph_positions(&page_content(&pdf))
    };

    let plain = build(0.0);
    let spaced = build(2.0);
    assert!((spaced[1].0 - plain[1].0 - 2.0).abs() < 1e-6);
    assert!((spaced[2].0 - plain[2].0 - 4.0).abs() < 1e-6);
}

#[test]
fn test_space_clusters_record_into_to_unicode() {
    let mut document = Document::new(shaped_config()).expect("document builds");
    document.add_page(595.0, 842.0);
    document
        .text(
            "\u{0633}\u{0644}\u{0627}\u{0645} \u{0645}", // سلام م
            100.0,
            500.0,
            &TextStyle { size: 12.0, ..TextStyle::default() },
        )
        .expect("text draws");
    let pdf = document.save().expect("save succeeds");

    let cmap = to_unicode_cmap(&pdf, "TestArabic");
    // Space is glyph 1 in the fixture and must extract as a space.
    assert!(cmap.contains("<0001> <0020>"));
}

#[test]
fn test_fonts_without_text_get_no_cmap() {
    let mut document = Document::new(shaped_config()).expect("document builds");
    document.add_page(595.0, 842.0);
    document
        .text(
            "\u{0645}",
            10.0,
            10.0,
            &TextStyle { size: 12.0, ..TextStyle::default() },
        )
        .expect("text draws");
    let pdf = document.save().expect("save succeeds");

    // Only the Arabic font drew text, so exactly one ToUnicode exists.
    assert_eq!(count(&pdf, b"/ToUnicode"), 1);
}
