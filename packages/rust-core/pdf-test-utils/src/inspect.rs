//! Byte-level PDF inspection for assertions
//!
//! Small, deliberately dumb helpers: they scan for the exact byte
//! sequences the writer emits (`N 0 obj\r\n`, `stream\r\n`, ...) rather
//! than parsing PDF properly. That is enough to let tests reach into an
//! emitted file and pull out the piece they want to assert on.

use std::io::Read;

use flate2::read::ZlibDecoder;

/// First position of `needle` in `haystack`.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Number of non-overlapping occurrences of `needle`.
pub fn count(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut total = 0;
    let mut rest = haystack;
    while let Some(at) = find(rest, needle) {
        total += 1;
        rest = &rest[at + needle.len()..];
    }
    total
}

/// The body of indirect object `id`: the bytes between `id 0 obj` and its
/// `endobj`, trimmed of the surrounding line breaks.
pub fn object_body(pdf: &[u8], id: u32) -> Option<&[u8]> {
    // The leading newline keeps "2 0 obj" from matching inside "12 0 obj".
    let header = format!("\n{} 0 obj\r\n", id);
    let start = find(pdf, header.as_bytes())? + header.len();
    let end = start + find(&pdf[start..], b"\r\nendobj")?;
    Some(&pdf[start..end])
}

/// The raw body of a stream object (as stored in the file, so still
/// compressed and/or encrypted).
pub fn stream_body(object: &[u8]) -> Option<&[u8]> {
    let start = find(object, b"stream\r\n")? + b"stream\r\n".len();
    let end = start + find(&object[start..], b"\r\nendstream")?;
    Some(&object[start..end])
}

/// Inflates a `FlateDecode` body.
pub fn inflate(data: &[u8]) -> Vec<u8> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .expect("test stream should be valid zlib");
    out
}

/// The trailer dictionary bytes, between `trailer` and `startxref`.
pub fn trailer(pdf: &[u8]) -> Option<&[u8]> {
    let start = find(pdf, b"trailer\r\n")? + b"trailer\r\n".len();
    let end = start + find(&pdf[start..], b"\r\nstartxref")?;
    Some(&pdf[start..end])
}
