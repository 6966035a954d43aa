//! Synthetic TrueType fixtures
//!
//! Builds a minimal but conforming TrueType file from a list of
//! `(char, advance)` pairs: `head`, `hhea`, `maxp`, `hmtx`, a format 4
//! `cmap`, empty-outline `glyf`/`loca`, plus `OS/2` and `post` so metric
//! extraction has something to read. Glyph ids are assigned in ascending
//! code point order starting at 1 (0 stays `.notdef`).
//!
//! Outlines are intentionally empty: shaping and embedding only consume
//! the cmap and the horizontal metrics.

/// Builds a TrueType font containing the given characters.
///
/// # Arguments
///
/// * `units_per_em` - design units per em (1000 is typical)
/// * `ascender`/`descender` - hhea metrics in design units
/// * `glyphs` - `(character, advance width)` pairs; BMP code points only
pub fn build_font(
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    glyphs: &[(char, u16)],
) -> Vec<u8> {
    let mut entries: Vec<(u32, u16)> = glyphs
        .iter()
        .map(|&(ch, advance)| (ch as u32, advance))
        .collect();
    entries.sort_by_key(|&(code, _)| code);
    entries.dedup_by_key(|&mut (code, _)| code);
    assert!(
        entries.iter().all(|&(code, _)| code <= 0xFFFF),
        "format 4 cmap covers the BMP only"
    );

    let num_glyphs = entries.len() as u16 + 1;
    let max_advance = entries.iter().map(|&(_, a)| a).max().unwrap_or(0);

    let head = build_head(units_per_em);
    let hhea = build_hhea(ascender, descender, max_advance, num_glyphs);
    let maxp = build_maxp(num_glyphs);
    let hmtx = build_hmtx(&entries);
    let cmap = build_cmap(&entries);
    let loca = vec![0u8; (num_glyphs as usize + 1) * 2];
    let glyf = vec![0u8; 4];
    let os2 = build_os2(ascender, descender, &entries);
    let post = build_post();

    // Records sorted by tag, as the sfnt directory requires.
    let tables: [(&[u8; 4], &[u8]); 9] = [
        (b"OS/2", &os2),
        (b"cmap", &cmap),
        (b"glyf", &glyf),
        (b"head", &head),
        (b"hhea", &hhea),
        (b"hmtx", &hmtx),
        (b"loca", &loca),
        (b"maxp", &maxp),
        (b"post", &post),
    ];

    let num_tables = tables.len() as u16;
    let entry_selector = 15 - num_tables.leading_zeros() as u16;
    let search_range = 16 << entry_selector;
    let range_shift = num_tables * 16 - search_range;

    let mut out = Buf::new();
    out.u32(0x0001_0000);
    out.u16(num_tables);
    out.u16(search_range);
    out.u16(entry_selector);
    out.u16(range_shift);

    let mut offset = 12 + tables.len() * 16;
    for (tag, data) in &tables {
        out.bytes(&tag[..]);
        out.u32(table_checksum(data));
        out.u32(offset as u32);
        out.u32(data.len() as u32);
        offset += padded_len(data.len());
    }
    for (_, data) in &tables {
        out.bytes(data);
        out.pad_to_4();
    }
    out.0
}

/// A Latin fixture: the printable ASCII range, 600 units per glyph and 300
/// for the space, over a 1000-unit em.
pub fn latin_font() -> Vec<u8> {
    let mut glyphs: Vec<(char, u16)> = (b'!'..=b'~').map(|b| (b as char, 600)).collect();
    glyphs.push((' ', 300));
    build_font(1000, 800, -200, &glyphs)
}

/// An Arabic-script fixture covering the letters the test corpus uses
/// (Arabic plus the Sorani additions), 500 units each. No digits and no
/// Latin, so fallback decisions are observable.
pub fn arabic_font() -> Vec<u8> {
    let letters = [
        '\u{0627}', // ا
        '\u{0628}', // ب
        '\u{062D}', // ح
        '\u{0631}', // ر
        '\u{0633}', // س
        '\u{0644}', // ل
        '\u{0645}', // م
        '\u{067E}', // پ
        '\u{0695}', // ڕ
        '\u{0698}', // ژ
        '\u{06C6}', // ۆ
        '\u{06CC}', // ی
        '\u{06D5}', // ە
    ];
    let mut glyphs: Vec<(char, u16)> = letters.iter().map(|&ch| (ch, 500)).collect();
    glyphs.push((' ', 300));
    build_font(1000, 820, -180, &glyphs)
}

fn build_head(units_per_em: u16) -> Vec<u8> {
    let mut buf = Buf::new();
    buf.u32(0x0001_0000); // version
    buf.u32(0x0001_0000); // fontRevision
    buf.u32(0); // checkSumAdjustment, unverified by parsers
    buf.u32(0x5F0F_3CF5); // magicNumber
    buf.u16(0); // flags
    buf.u16(units_per_em);
    buf.bytes(&[0u8; 8]); // created
    buf.bytes(&[0u8; 8]); // modified
    buf.i16(0); // xMin
    buf.i16(0); // yMin
    buf.i16(0); // xMax
    buf.i16(0); // yMax
    buf.u16(0); // macStyle
    buf.u16(8); // lowestRecPPEM
    buf.i16(2); // fontDirectionHint
    buf.i16(0); // indexToLocFormat: short
    buf.i16(0); // glyphDataFormat
    buf.0
}

fn build_hhea(ascender: i16, descender: i16, max_advance: u16, num_glyphs: u16) -> Vec<u8> {
    let mut buf = Buf::new();
    buf.u32(0x0001_0000);
    buf.i16(ascender);
    buf.i16(descender);
    buf.i16(0); // lineGap
    buf.u16(max_advance);
    buf.i16(0); // minLeftSideBearing
    buf.i16(0); // minRightSideBearing
    buf.i16(0); // xMaxExtent
    buf.i16(1); // caretSlopeRise
    buf.i16(0); // caretSlopeRun
    buf.i16(0); // caretOffset
    buf.bytes(&[0u8; 8]); // reserved
    buf.i16(0); // metricDataFormat
    buf.u16(num_glyphs); // numberOfHMetrics
    buf.0
}

fn build_maxp(num_glyphs: u16) -> Vec<u8> {
    let mut buf = Buf::new();
    buf.u32(0x0001_0000);
    buf.u16(num_glyphs);
    buf.u16(0); // maxPoints
    buf.u16(0); // maxContours
    buf.u16(0); // maxCompositePoints
    buf.u16(0); // maxCompositeContours
    buf.u16(2); // maxZones
    buf.u16(0); // maxTwilightPoints
    buf.u16(0); // maxStorage
    buf.u16(0); // maxFunctionDefs
    buf.u16(0); // maxInstructionDefs
    buf.u16(0); // maxStackElements
    buf.u16(0); // maxSizeOfInstructions
    buf.u16(0); // maxComponentElements
    buf.u16(0); // maxComponentDepth
    buf.0
}

fn build_hmtx(entries: &[(u32, u16)]) -> Vec<u8> {
    let mut buf = Buf::new();
    buf.u16(500); // .notdef
    buf.i16(0);
    for &(_, advance) in entries {
        buf.u16(advance);
        buf.i16(0);
    }
    buf.0
}

fn build_cmap(entries: &[(u32, u16)]) -> Vec<u8> {
    // One segment per character plus the required 0xFFFF terminator.
    let seg_count = entries.len() as u16 + 1;
    let entry_selector = 15 - seg_count.leading_zeros() as u16;
    let search_range = 2 << entry_selector;
    let range_shift = seg_count * 2 - search_range;

    let mut buf = Buf::new();
    buf.u16(0); // table version
    buf.u16(1); // one encoding record
    buf.u16(3); // platform: Windows
    buf.u16(1); // encoding: Unicode BMP
    buf.u32(12); // subtable offset

    buf.u16(4); // format
    buf.u16(16 + 8 * seg_count); // length
    buf.u16(0); // language
    buf.u16(seg_count * 2);
    buf.u16(search_range);
    buf.u16(entry_selector);
    buf.u16(range_shift);

    for &(code, _) in entries {
        buf.u16(code as u16); // endCode
    }
    buf.u16(0xFFFF);
    buf.u16(0); // reservedPad
    for &(code, _) in entries {
        buf.u16(code as u16); // startCode
    }
    buf.u16(0xFFFF);
    for (index, &(code, _)) in entries.iter().enumerate() {
        let gid = index as u16 + 1;
        buf.u16(gid.wrapping_sub(code as u16)); // idDelta
    }
    buf.u16(1); // terminator maps 0xFFFF to 0
    for _ in 0..seg_count {
        buf.u16(0); // idRangeOffset
    }
    buf.0
}

fn build_os2(ascender: i16, descender: i16, entries: &[(u32, u16)]) -> Vec<u8> {
    let first = entries.first().map(|&(c, _)| c as u16).unwrap_or(0);
    let last = entries.last().map(|&(c, _)| c as u16).unwrap_or(0);

    let mut buf = Buf::new();
    buf.u16(2); // version
    buf.i16(500); // xAvgCharWidth
    buf.u16(400); // usWeightClass
    buf.u16(5); // usWidthClass
    buf.u16(0); // fsType
    buf.i16(650); // ySubscriptXSize
    buf.i16(600); // ySubscriptYSize
    buf.i16(0); // ySubscriptXOffset
    buf.i16(75); // ySubscriptYOffset
    buf.i16(650); // ySuperscriptXSize
    buf.i16(600); // ySuperscriptYSize
    buf.i16(0); // ySuperscriptXOffset
    buf.i16(350); // ySuperscriptYOffset
    buf.i16(50); // yStrikeoutSize
    buf.i16(300); // yStrikeoutPosition
    buf.i16(0); // sFamilyClass
    buf.bytes(&[0u8; 10]); // panose
    buf.bytes(&[0u8; 16]); // ulUnicodeRange 1-4
    buf.bytes(b"TEST"); // achVendID
    buf.u16(0x40); // fsSelection: REGULAR
    buf.u16(first);
    buf.u16(last);
    buf.i16(ascender); // sTypoAscender
    buf.i16(descender); // sTypoDescender
    buf.i16(0); // sTypoLineGap
    buf.u16(ascender.max(0) as u16); // usWinAscent
    buf.u16(descender.unsigned_abs()); // usWinDescent
    buf.bytes(&[0u8; 8]); // ulCodePageRange 1-2
    buf.i16(500); // sxHeight
    buf.i16(700); // sCapHeight
    buf.u16(0); // usDefaultChar
    buf.u16(32); // usBreakChar
    buf.u16(1); // usMaxContext
    buf.0
}

fn build_post() -> Vec<u8> {
    let mut buf = Buf::new();
    buf.u32(0x0003_0000); // version 3: no glyph names
    buf.u32(0); // italicAngle
    buf.i16(-100); // underlinePosition
    buf.i16(50); // underlineThickness
    buf.u32(0); // isFixedPitch
    buf.bytes(&[0u8; 16]); // memory hints
    buf.0
}

fn table_checksum(data: &[u8]) -> u32 {
    let mut sum = 0u32;
    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum = sum.wrapping_add(u32::from_be_bytes(word));
    }
    sum
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

struct Buf(Vec<u8>);

impl Buf {
    fn new() -> Self {
        Buf(Vec::new())
    }

    fn u16(&mut self, value: u16) {
        self.0.extend_from_slice(&value.to_be_bytes());
    }

    fn i16(&mut self, value: i16) {
        self.0.extend_from_slice(&value.to_be_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.0.extend_from_slice(&value.to_be_bytes());
    }

    fn bytes(&mut self, data: &[u8]) {
        self.0.extend_from_slice(data);
    }

    fn pad_to_4(&mut self) {
        while self.0.len() % 4 != 0 {
            self.0.push(0);
        }
    }
}
