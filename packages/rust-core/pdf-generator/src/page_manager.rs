//! Page creation and tracking
//!
//! Each page allocates its dictionary id and its deferred `Contents`
//! stream up front, so internal links and outlines can reference any
//! page long before save time. The content buffer fills as the caller
//! draws; the stream body is set only when the document is finalized.

use pdf_writer::{Dictionary, ObjectId, ObjectWriter};

use crate::annotations::LinkAnnotation;
use crate::content_stream::ContentStream;
use crate::error::PdfError;

/// One page under construction.
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub content: ContentStream,
    /// The page dictionary id (stored at save).
    pub dict_ref: ObjectId,
    /// The deferred content stream object.
    pub contents_ref: ObjectId,
    pub annotations: Vec<LinkAnnotation>,
}

/// Owns the page list and the Pages tree root.
pub struct PageManager {
    pages: Vec<Page>,
    pages_root: ObjectId,
    current: Option<usize>,
}

impl PageManager {
    pub fn new(writer: &mut ObjectWriter) -> Self {
        Self {
            pages: Vec::new(),
            pages_root: writer.alloc_id(),
            current: None,
        }
    }

    pub fn pages_root(&self) -> ObjectId {
        self.pages_root
    }

    /// Appends a page and makes it current.
    pub fn add_page(&mut self, writer: &mut ObjectWriter, width: f64, height: f64) -> usize {
        let dict_ref = writer.alloc_id();
        let contents_ref = writer.add_deferred_stream(Dictionary::new());
        self.pages.push(Page {
            width,
            height,
            content: ContentStream::new(),
            dict_ref,
            contents_ref,
            annotations: Vec::new(),
        });
        let index = self.pages.len() - 1;
        self.current = Some(index);
        index
    }

    /// The page drawing operations target.
    pub fn current_mut(&mut self) -> Result<&mut Page, PdfError> {
        match self.current {
            Some(index) => Ok(&mut self.pages[index]),
            None => Err(PdfError::NoActivePage),
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Makes an existing page current again.
    pub fn select_page(&mut self, index: usize) -> Result<(), PdfError> {
        if index >= self.pages.len() {
            return Err(PdfError::RenderError(format!(
                "page {} does not exist",
                index
            )));
        }
        self.current = Some(index);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page dictionary ids in page order.
    pub fn page_refs(&self) -> Vec<ObjectId> {
        self.pages.iter().map(|page| page.dict_ref).collect()
    }

    /// Consumes the manager for the save pass.
    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_page_is_an_error() {
        let mut writer = ObjectWriter::new([0u8; 16]);
        let mut manager = PageManager::new(&mut writer);
        assert!(matches!(manager.current_mut(), Err(PdfError::NoActivePage)));
    }

    #[test]
    fn test_add_page_becomes_current() {
        let mut writer = ObjectWriter::new([0u8; 16]);
        let mut manager = PageManager::new(&mut writer);

        let first = manager.add_page(&mut writer, 595.0, 842.0);
        assert_eq!(first, 0);
        assert_eq!(manager.current_index(), Some(0));

        let second = manager.add_page(&mut writer, 595.0, 842.0);
        assert_eq!(second, 1);
        assert_eq!(manager.current_index(), Some(1));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_select_page_navigates_back() {
        let mut writer = ObjectWriter::new([0u8; 16]);
        let mut manager = PageManager::new(&mut writer);
        manager.add_page(&mut writer, 100.0, 100.0);
        manager.add_page(&mut writer, 100.0, 100.0);

        manager.select_page(0).expect("page 0 exists");
        assert_eq!(manager.current_index(), Some(0));
        assert!(manager.select_page(5).is_err());
    }

    #[test]
    fn test_page_refs_are_distinct_and_ordered() {
        let mut writer = ObjectWriter::new([0u8; 16]);
        let mut manager = PageManager::new(&mut writer);
        manager.add_page(&mut writer, 100.0, 100.0);
        manager.add_page(&mut writer, 100.0, 100.0);

        let refs = manager.page_refs();
        assert_eq!(refs.len(), 2);
        assert_ne!(refs[0], refs[1]);
        assert_ne!(refs[0], manager.pages_root());
    }
}
