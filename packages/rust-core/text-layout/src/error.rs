use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("font '{0}' is not configured")]
    FontNotConfigured(String),

    #[error("no fonts configured for the text pipeline")]
    NoFonts,
}
