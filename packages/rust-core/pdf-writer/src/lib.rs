//! Low-level PDF 1.7 file structure.
//!
//! This crate takes care of the lowest layer of PDF syntax: indirect
//! objects, the cross-reference table, and the trailer. It knows nothing
//! about PDF *semantics* beyond the grammar of names, strings, arrays,
//! dictionaries, streams, and indirect references - pages, fonts, and
//! resources are assembled by higher-level crates and handed down here as
//! plain objects.
//!
//! # Overview
//!
//! - [`Object`] - tagged value covering every primitive the grammar allows
//! - [`Dictionary`] - key-sorted dictionary so emission is deterministic
//! - [`ObjectWriter`] - allocates ids, stores objects, and emits the final
//!   byte buffer in a single linear pass that records xref offsets
//! - [`encryption`] - the Standard Security Handler (revisions 3 and 4),
//!   applied per object during the emit pass
//!
//! # Usage
//!
//! ```
//! use pdf_writer::{dict, ObjectWriter};
//!
//! let mut writer = ObjectWriter::new([0u8; 16]);
//! let page = writer.add_dict(dict! { "Type" => "Page" });
//! let root = writer.add_dict(dict! {
//!     "Type" => "Catalog",
//!     "Pages" => page,
//! });
//! let bytes = writer.build(root, None);
//! assert!(bytes.starts_with(b"%PDF-1.7"));
//! ```
//!
//! Streams whose dictionary carries no `Filter` are deflate-compressed
//! before their `Length` is fixed; streams that arrive already encoded
//! (for example JPEG bodies destined for `/DCTDecode`) pass through
//! untouched.

pub mod encryption;
mod object;
mod writer;

pub use encryption::{EncryptionAlgorithm, EncryptionOptions, EncryptionState, Permissions};
pub use object::{format_number, Dictionary, Object, ObjectId};
pub use writer::ObjectWriter;
