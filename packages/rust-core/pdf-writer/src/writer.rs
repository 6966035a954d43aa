//! Indirect object storage and the single-pass file emitter
//!
//! Objects are collected in memory and written out once, in insertion
//! order, while byte offsets are recorded for the cross-reference table.
//! Stream bodies may be deferred: a page's `Contents` stream is allocated
//! when the page is created and filled only when the page is finalized.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::encryption::{EncryptionOptions, EncryptionState};
use crate::object::{Dictionary, Object, ObjectId};
use crate::dict;

/// Fixed header: version line plus a comment of four bytes above 0x80 so
/// transport layers treat the file as binary.
const HEADER: &[u8] = b"%PDF-1.7\r\n%\xE2\xE3\xCF\xD3\r\n";

enum Slot {
    /// Id handed out by [`ObjectWriter::alloc_id`], not stored yet.
    Reserved,
    Dict(Dictionary),
    Stream {
        dict: Dictionary,
        body: Option<Vec<u8>>,
        compress: bool,
    },
}

/// Allocates object ids, stores dictionary and stream objects, and emits
/// the complete file: header, body, xref, trailer.
///
/// Ids are assigned monotonically starting at 1. `build` panics if an id
/// was allocated but nothing was ever stored under it - that is a
/// programmer error, not a runtime condition.
pub struct ObjectWriter {
    slots: Vec<Slot>,
    file_id: [u8; 16],
    encryption: Option<EncryptionState>,
}

impl ObjectWriter {
    /// Creates an empty writer.
    ///
    /// `file_id` becomes the trailer `/ID` and, when encryption is enabled,
    /// an input to key derivation. The caller decides whether it is random
    /// or fixed (deterministic output for tests).
    pub fn new(file_id: [u8; 16]) -> Self {
        Self {
            slots: Vec::new(),
            file_id,
            encryption: None,
        }
    }

    pub fn file_id(&self) -> [u8; 16] {
        self.file_id
    }

    /// Reserves an object id to be filled in later with
    /// [`ObjectWriter::store_dict`] or a deferred stream.
    pub fn alloc_id(&mut self) -> ObjectId {
        self.slots.push(Slot::Reserved);
        ObjectId(self.slots.len() as u32)
    }

    /// Stores a dictionary object and returns its reference.
    pub fn add_dict(&mut self, dict: Dictionary) -> ObjectId {
        let id = self.alloc_id();
        self.store_dict(id, dict);
        id
    }

    /// Stores a dictionary under a previously allocated id.
    pub fn store_dict(&mut self, id: ObjectId, dict: Dictionary) {
        self.slots[id.0 as usize - 1] = Slot::Dict(dict);
    }

    /// Stores a stream object.
    ///
    /// A body whose dictionary has no `Filter` entry is deflated at emit
    /// time and tagged `/FlateDecode`; a pre-encoded body (the dictionary
    /// already names a filter, e.g. `/DCTDecode`) passes through untouched.
    pub fn add_stream(&mut self, dict: Dictionary, body: Vec<u8>) -> ObjectId {
        let compress = !dict.contains_key("Filter");
        let id = self.alloc_id();
        self.slots[id.0 as usize - 1] = Slot::Stream {
            dict,
            body: Some(body),
            compress,
        };
        id
    }

    /// Stores a stream object whose body must not be compressed even
    /// though its dictionary names no filter.
    pub fn add_stream_raw(&mut self, dict: Dictionary, body: Vec<u8>) -> ObjectId {
        let id = self.alloc_id();
        self.slots[id.0 as usize - 1] = Slot::Stream {
            dict,
            body: Some(body),
            compress: false,
        };
        id
    }

    /// Allocates a stream whose body arrives later via
    /// [`ObjectWriter::set_stream_content`].
    pub fn add_deferred_stream(&mut self, dict: Dictionary) -> ObjectId {
        let id = self.alloc_id();
        self.slots[id.0 as usize - 1] = Slot::Stream {
            dict,
            body: None,
            compress: false,
        };
        id
    }

    /// Provides the body of a deferred stream.
    pub fn set_stream_content(&mut self, id: ObjectId, body: Vec<u8>, compress: bool) {
        match &mut self.slots[id.0 as usize - 1] {
            Slot::Stream {
                body: slot_body,
                compress: slot_compress,
                ..
            } => {
                *slot_body = Some(body);
                *slot_compress = compress;
            }
            _ => panic!("object {} is not a stream", id.0),
        }
    }

    /// Mutable access to a stored dictionary (dict object or stream dict).
    ///
    /// Used to patch objects after creation, e.g. attaching a `ToUnicode`
    /// reference to a font once all pages are finalized.
    pub fn dict_mut(&mut self, id: ObjectId) -> Option<&mut Dictionary> {
        match self.slots.get_mut(id.0 as usize - 1) {
            Some(Slot::Dict(dict)) | Some(Slot::Stream { dict, .. }) => Some(dict),
            _ => None,
        }
    }

    /// Turns on encryption for every object stored from here on out (and
    /// every object already stored - transformation happens at emit time).
    ///
    /// The `/Encrypt` dictionary is stored immediately under its own id so
    /// the emit pass can skip it; it is never encrypted against itself.
    pub fn enable_encryption(&mut self, options: &EncryptionOptions) -> ObjectId {
        let id = self.alloc_id();
        let state = EncryptionState::new(options, self.file_id, id);
        self.store_dict(id, state.encrypt_dict());
        self.encryption = Some(state);
        id
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption.is_some()
    }

    /// Emits the complete file.
    ///
    /// # Panics
    ///
    /// Panics when an allocated id was never stored, or when a deferred
    /// stream was never given a body. Both are internal inconsistencies.
    pub fn build(mut self, root: ObjectId, info: Option<ObjectId>) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 * 1024);
        out.extend_from_slice(HEADER);

        let count = self.slots.len();
        let mut offsets = vec![0u64; count + 1];
        let mut encryption = self.encryption.take();

        for (index, slot) in self.slots.into_iter().enumerate() {
            let id = ObjectId(index as u32 + 1);
            offsets[index + 1] = out.len() as u64;
            push_fmt(&mut out, format_args!("{} 0 obj\r\n", id.0));

            match slot {
                Slot::Reserved => {
                    panic!("object {} was allocated but never stored", id.0)
                }
                Slot::Dict(mut dict) => {
                    if let Some(state) = encryption.as_mut() {
                        if state.encrypt_ref() != id {
                            encrypt_strings(&mut dict, state, id);
                        }
                    }
                    serialize_object(&mut out, &Object::Dictionary(dict));
                    out.extend_from_slice(b"\r\nendobj\r\n");
                }
                Slot::Stream {
                    mut dict,
                    body,
                    compress,
                } => {
                    let body = body.unwrap_or_else(|| {
                        panic!("stream content for object {} was never provided", id.0)
                    });
                    let mut data = if compress && !dict.contains_key("Filter") {
                        dict.set("Filter", "FlateDecode");
                        deflate(&body)
                    } else {
                        body
                    };
                    if let Some(state) = encryption.as_mut() {
                        encrypt_strings(&mut dict, state, id);
                        data = state.encrypt_stream(&data, id, 0);
                    }
                    dict.set("Length", data.len());
                    serialize_object(&mut out, &Object::Dictionary(dict));
                    out.extend_from_slice(b"\r\nstream\r\n");
                    out.extend_from_slice(&data);
                    out.extend_from_slice(b"\r\nendstream\r\nendobj\r\n");
                }
            }
        }

        let xref_start = out.len();
        push_fmt(&mut out, format_args!("xref\r\n0 {}\r\n", count + 1));
        out.extend_from_slice(b"0000000000 65535 f\r\n");
        for offset in &offsets[1..] {
            push_fmt(&mut out, format_args!("{:010} 00000 n\r\n", offset));
        }

        let mut trailer = dict! {
            "Size" => (count + 1) as i64,
            "Root" => root,
            "ID" => vec![
                Object::HexBytes(self.file_id.to_vec()),
                Object::HexBytes(self.file_id.to_vec()),
            ],
        };
        if let Some(info) = info {
            trailer.set("Info", info);
        }
        if let Some(state) = &encryption {
            trailer.set("Encrypt", state.encrypt_ref());
        }

        out.extend_from_slice(b"trailer\r\n");
        serialize_object(&mut out, &Object::Dictionary(trailer));
        push_fmt(
            &mut out,
            format_args!("\r\nstartxref\r\n{}\r\n%%EOF\r\n", xref_start),
        );
        out
    }
}

fn push_fmt(out: &mut Vec<u8>, args: std::fmt::Arguments<'_>) {
    // Writing to Vec<u8> in memory never fails
    out.write_fmt(args)
        .expect("writing to Vec<u8> should never fail");
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .expect("writing to ZlibEncoder over Vec<u8> should never fail");
    encoder
        .finish()
        .expect("finishing ZlibEncoder over Vec<u8> should never fail")
}

/// Serializes one value; containers recurse.
pub(crate) fn serialize_object(out: &mut Vec<u8>, object: &Object) {
    match object {
        Object::Null => out.extend_from_slice(b"null"),
        Object::Boolean(true) => out.extend_from_slice(b"true"),
        Object::Boolean(false) => out.extend_from_slice(b"false"),
        Object::Integer(value) => push_fmt(out, format_args!("{}", value)),
        Object::Real(value) => out.extend_from_slice(crate::format_number(*value).as_bytes()),
        Object::Name(name) => serialize_name(out, name),
        Object::LiteralString(bytes) => serialize_literal(out, bytes),
        Object::HexBytes(bytes) => {
            out.push(b'<');
            for byte in bytes {
                push_fmt(out, format_args!("{:02X}", byte));
            }
            out.push(b'>');
        }
        Object::Array(items) => {
            out.push(b'[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(b' ');
                }
                serialize_object(out, item);
            }
            out.push(b']');
        }
        Object::Dictionary(dict) => {
            out.extend_from_slice(b"<< ");
            for (key, value) in dict.iter() {
                serialize_name(out, key);
                out.push(b' ');
                serialize_object(out, value);
                out.push(b' ');
            }
            out.extend_from_slice(b">>");
        }
        Object::Reference(id) => push_fmt(out, format_args!("{} 0 R", id.0)),
    }
}

/// `/Name` with delimiter, whitespace, `#`, and non-printable bytes
/// escaped as `#XX`.
fn serialize_name(out: &mut Vec<u8>, name: &str) {
    out.push(b'/');
    for &byte in name.as_bytes() {
        let needs_escape = matches!(
            byte,
            b'#' | b' ' | b'\t' | b'\r' | b'\n' | b'(' | b')' | b'<' | b'>' | b'[' | b']'
                | b'{' | b'}' | b'/' | b'%'
        ) || !(0x21..=0x7E).contains(&byte);
        if needs_escape {
            push_fmt(out, format_args!("#{:02X}", byte));
        } else {
            out.push(byte);
        }
    }
}

/// `(text)` with backslash and both parentheses escaped.
fn serialize_literal(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(b'(');
    for &byte in bytes {
        if matches!(byte, b'\\' | b'(' | b')') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out.push(b')');
}

/// Encrypts every string found in a dictionary, recursing through arrays
/// and nested dictionaries. Hex strings are strings too.
fn encrypt_strings(dict: &mut Dictionary, state: &mut EncryptionState, id: ObjectId) {
    for (_, value) in dict.iter_mut() {
        encrypt_value(value, state, id);
    }
}

fn encrypt_value(value: &mut Object, state: &mut EncryptionState, id: ObjectId) {
    match value {
        Object::LiteralString(bytes) | Object::HexBytes(bytes) => {
            *bytes = state.encrypt_string(bytes, id, 0);
        }
        Object::Array(items) => {
            for item in items {
                encrypt_value(item, state, id);
            }
        }
        Object::Dictionary(dict) => encrypt_strings(dict, state, id),
        _ => {}
    }
}
