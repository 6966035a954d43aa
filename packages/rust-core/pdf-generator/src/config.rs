//! Document configuration types
//!
//! Everything a [`crate::Document`] needs up front: font files and their
//! fallback order, metadata for the Info dictionary, optional encryption,
//! and the determinism switch test harnesses rely on.

use serde::{Deserialize, Serialize};

use pdf_writer::Permissions;

/// One configured font: a caller-chosen key, the PostScript base name
/// written into the PDF, and the TrueType bytes to embed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    /// Key used to select this font from text styles (e.g. `"AR"`).
    pub key: String,
    /// PostScript base name (e.g. `"NotoNaskhArabic"`).
    pub base_name: String,
    /// Raw TrueType file.
    pub data: Vec<u8>,
}

/// Document metadata for the Info dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
}

/// Encryption request, validated when the document is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionSettings {
    pub user_password: String,
    pub owner_password: String,
    /// `"rc4"` (128-bit, revision 3) or `"aes"` (AES-128-CBC, revision 4).
    pub algorithm: String,
    /// Permission bits; everything granted when not narrowed.
    #[serde(skip)]
    pub permissions: Permissions,
}

impl Default for EncryptionSettings {
    fn default() -> Self {
        Self {
            user_password: String::new(),
            owner_password: String::new(),
            algorithm: "aes".to_string(),
            permissions: Permissions::default(),
        }
    }
}

/// Configuration for one document.
///
/// # Examples
///
/// ```
/// use pdf_generator::{DocumentConfig, Metadata};
///
/// let config = DocumentConfig {
///     metadata: Metadata {
///         title: Some("Report".to_string()),
///         ..Metadata::default()
///     },
///     ..DocumentConfig::default()
/// };
/// assert!(config.fonts.is_empty(), "fonts are optional; Helvetica covers ASCII");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Fonts to embed, in configuration order.
    pub fonts: Vec<FontConfig>,

    /// Fallback order for per-code-point font selection. Keys not listed
    /// keep their configuration order after the listed ones. An empty
    /// list means configuration order.
    #[serde(default)]
    pub fallback_order: Vec<String>,

    /// Default font key; the first configured font when `None`.
    #[serde(default)]
    pub default_font: Option<String>,

    /// Info dictionary entries.
    #[serde(default)]
    pub metadata: Metadata,

    /// Encrypt the document at rest.
    #[serde(default)]
    pub encryption: Option<EncryptionSettings>,

    /// Deflate page content streams.
    ///
    /// Font files and CMaps are always compressed; this switch only
    /// affects page content, where readability of the raw file matters
    /// for debugging.
    #[serde(default = "default_compress_content_streams")]
    pub compress_content_streams: bool,

    /// Byte-reproducible output: fixed file identifier, no
    /// `CreationDate`, counter-derived AES IVs. Two documents driven by
    /// the same calls emit identical bytes.
    #[serde(default)]
    pub deterministic: bool,
}

fn default_compress_content_streams() -> bool {
    true
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            fonts: Vec::new(),
            fallback_order: Vec::new(),
            default_font: None,
            metadata: Metadata::default(),
            encryption: None,
            compress_content_streams: true,
            deterministic: false,
        }
    }
}
