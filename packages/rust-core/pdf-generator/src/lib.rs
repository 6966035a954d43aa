//! Multi-script PDF composition.
//!
//! This crate is the public surface of the PDF pipeline: it assembles
//! pages, text, vector graphics, images, gradients, links, and outlines
//! into a conforming PDF 1.7 byte buffer, optionally encrypted with the
//! Standard Security Handler.
//!
//! # Overview
//!
//! The `pdf-generator` crate handles:
//! - **Document assembly** - catalog, pages tree, Info dictionary, save
//!   orchestration over the low-level `pdf-writer` crate
//! - **Text rendering** - shaped, bidirectional text through
//!   `text-layout` and `font-toolkit`, with embedded TrueType fonts and
//!   ToUnicode CMaps so extraction returns logical order
//! - **Graphics** - rectangles (square or rounded), free paths, clipping,
//!   opacity, axial and radial gradients
//! - **Raster images** - PNG (with alpha soft masks) and JPEG placement,
//!   interned so repeated bytes embed once
//! - **Navigation** - URI links, internal page links, and the outline
//!   tree
//!
//! # Architecture
//!
//! The crate is organized into focused modules:
//!
//! - `document` - Document lifecycle and the drawing surface ([`Document`])
//! - `content_stream` - per-page operator builder ([`ContentStream`])
//! - `font_registry` - configured fonts, shapers, ToUnicode bookkeeping
//! - `resources` - image/shading/opacity interning ([`ResourceCache`])
//! - `bookmarks` / `annotations` - outline tree and link annotations
//! - `color` - `#RGB`/`#RRGGBB`/named/`cmyk()` parsing
//! - `standard_fonts` - builtin Helvetica fallback with AFM widths
//! - `config` - document configuration ([`DocumentConfig`])
//! - `error` - error type ([`PdfError`])
//!
//! # Usage
//!
//! ```
//! use pdf_generator::{Document, DocumentConfig, TextStyle};
//!
//! let mut document = Document::new(DocumentConfig::default()).unwrap();
//! document.add_page(595.0, 842.0);
//! document
//!     .text("Hello", 72.0, 800.0, &TextStyle { size: 12.0, ..TextStyle::default() })
//!     .unwrap();
//! let pdf_bytes = document.save().unwrap();
//! assert!(pdf_bytes.starts_with(b"%PDF-1.7"));
//! ```
//!
//! With no fonts configured, text renders through the builtin Helvetica.
//! Configuring TrueType fonts switches every text call onto the shaping
//! pipeline: per-code-point font fallback, right-to-left runs, digits
//! kept left-to-right, word wrapping, justification, and copy-paste that
//! reproduces the logical input.
//!
//! # Determinism
//!
//! `DocumentConfig::deterministic` pins the file identifier, omits
//! `CreationDate`, and derives AES IVs from a counter, making the output
//! a pure function of the call sequence. Test harnesses rely on this.

pub mod annotations;
pub mod bookmarks;
pub mod color;
pub mod config;
pub mod content_stream;
mod document;
pub mod error;
mod font_registry;
mod page_manager;
pub mod resources;
pub mod standard_fonts;
pub mod text;
mod timestamp;

pub use color::{parse_color, Color};
pub use config::{DocumentConfig, EncryptionSettings, FontConfig, Metadata};
pub use content_stream::{ContentStream, GlyphOp, PaintMode, PathPoint};
pub use document::{Document, PathStyle, RectStyle};
pub use error::PdfError;
pub use resources::{GradientKind, GradientStop, ResourceCache};
pub use text::{ScriptPosition, TextStyle};

// Alignment and permissions come from the layer that owns them.
pub use pdf_writer::Permissions;
pub use text_layout::Align;
