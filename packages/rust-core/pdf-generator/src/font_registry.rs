//! Font collection and registration
//!
//! Owns every configured font for a document: the opened shaper face,
//! the embedded PDF object cluster, the page-resource name, and the
//! growing `(glyph id, text)` pair list that becomes the font's
//! ToUnicode CMap at save time.

use font_toolkit::{attach_to_unicode, embed_truetype_font, EmbeddedFont, RustybuzzShaper, Shaper};
use pdf_writer::{ObjectId, ObjectWriter};

use crate::config::FontConfig;
use crate::error::PdfError;
use crate::standard_fonts::create_helvetica_font;

/// One registered font.
pub struct FontEntry {
    pub key: String,
    /// Page-resource name (`F1`, `F2`, ...).
    pub resource_name: String,
    pub shaper: RustybuzzShaper,
    pub embedded: EmbeddedFont,
    /// Append-only until save; first recording of a glyph id wins.
    pub pairs: Vec<(u16, String)>,
}

/// All fonts of one document plus the lazily-created builtin Helvetica.
pub struct FontRegistry {
    entries: Vec<FontEntry>,
    helvetica: Option<(String, ObjectId)>,
}

impl FontRegistry {
    /// Opens and embeds every configured font, in configuration order.
    pub fn register_fonts(
        writer: &mut ObjectWriter,
        configs: &[FontConfig],
    ) -> Result<Self, PdfError> {
        let mut entries = Vec::with_capacity(configs.len());
        for (index, config) in configs.iter().enumerate() {
            let shaper = RustybuzzShaper::open(config.data.clone())
                .map_err(|e| PdfError::FontError(format!("font '{}': {}", config.key, e)))?;
            let embedded = embed_truetype_font(writer, &config.data, &config.base_name)
                .map_err(|e| PdfError::FontError(format!("font '{}': {}", config.key, e)))?;
            entries.push(FontEntry {
                key: config.key.clone(),
                resource_name: format!("F{}", index + 1),
                shaper,
                embedded,
                pairs: Vec::new(),
            });
        }
        Ok(Self {
            entries,
            helvetica: None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&FontEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Appends ToUnicode pairs for a font.
    pub fn record_pairs(&mut self, key: &str, pairs: Vec<(u16, String)>) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == key) {
            entry.pairs.extend(pairs);
        }
    }

    /// `(key, shaper)` pairs for the text pipeline: fallback-order keys
    /// first, then the remaining fonts in configuration order.
    pub fn pipeline_fonts<'a>(&'a self, fallback_order: &[String]) -> Vec<(String, &'a dyn Shaper)> {
        let mut ordered: Vec<&FontEntry> = Vec::with_capacity(self.entries.len());
        for key in fallback_order {
            if let Some(entry) = self.entries.iter().find(|entry| &entry.key == key) {
                if !ordered.iter().any(|known| known.key == entry.key) {
                    ordered.push(entry);
                }
            }
        }
        for entry in &self.entries {
            if !ordered.iter().any(|known| known.key == entry.key) {
                ordered.push(entry);
            }
        }
        ordered
            .into_iter()
            .map(|entry| (entry.key.clone(), &entry.shaper as &dyn Shaper))
            .collect()
    }

    /// The builtin Helvetica, created on first use under the reserved
    /// resource name `F0`.
    pub fn helvetica(&mut self, writer: &mut ObjectWriter) -> (String, ObjectId) {
        if let Some(existing) = &self.helvetica {
            return existing.clone();
        }
        let created = ("F0".to_string(), create_helvetica_font(writer));
        self.helvetica = Some(created.clone());
        created
    }

    /// `(resource name, font object)` for every font a page may
    /// reference.
    pub fn resource_refs(&self) -> Vec<(String, ObjectId)> {
        let mut refs: Vec<(String, ObjectId)> = self
            .entries
            .iter()
            .map(|entry| (entry.resource_name.clone(), entry.embedded.font_ref))
            .collect();
        if let Some((name, id)) = &self.helvetica {
            refs.push((name.clone(), *id));
        }
        refs
    }

    /// Builds and attaches the ToUnicode CMap of every font that drew
    /// text.
    pub fn attach_to_unicode_cmaps(&self, writer: &mut ObjectWriter) {
        for entry in &self.entries {
            if !entry.pairs.is_empty() {
                attach_to_unicode(writer, entry.embedded.font_ref, &entry.pairs);
            }
        }
    }
}
