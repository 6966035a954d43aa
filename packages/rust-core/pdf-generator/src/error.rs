use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Serialize, Deserialize)]
pub enum PdfError {
    #[error("font error: {0}")]
    FontError(String),

    #[error("no active page: call add_page before drawing")]
    NoActivePage,

    #[error("image error: {0}")]
    ImageError(String),

    #[error("encryption error: {0}")]
    EncryptionError(String),

    #[error("rendering error: {0}")]
    RenderError(String),

    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

impl PdfError {
    /// Get error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            PdfError::FontError(_) => "PDF_FONT_ERROR",
            PdfError::NoActivePage => "PDF_NO_ACTIVE_PAGE",
            PdfError::ImageError(_) => "PDF_IMAGE_ERROR",
            PdfError::EncryptionError(_) => "PDF_ENCRYPTION_ERROR",
            PdfError::RenderError(_) => "PDF_RENDER_ERROR",
            PdfError::ConfigError(_) => "PDF_CONFIG_ERROR",
        }
    }
}
