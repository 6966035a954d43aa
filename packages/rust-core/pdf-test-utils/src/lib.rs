//! Shared test support for the PDF pipeline.
//!
//! Two things live here:
//!
//! - [`font_fixture`] - builds small, fully valid TrueType files in memory
//!   so font parsing, shaping, and embedding tests run hermetically
//!   without binary fixtures checked into the repository.
//! - [`inspect`] - byte-level helpers for pulling indirect objects, stream
//!   bodies, and the trailer out of emitted PDF files.
//!
//! This crate is test support only; nothing here ships in the library.

pub mod font_fixture;
pub mod inspect;

pub use font_fixture::{arabic_font, build_font, latin_font};
pub use inspect::{count, find, inflate, object_body, stream_body, trailer};
