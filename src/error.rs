//! Error types for the certificate studio

use thiserror::Error;

/// Result type alias for studio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the certificate studio
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to initialize a renderer backend
    #[error("Renderer initialization failed: {0}")]
    InitializationError(String),

    /// A deployment asset (template, hero, font) failed to load or decode
    #[error("Asset failed to load: {0}")]
    AssetError(String),

    /// Failed to rasterize the certificate composite
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to encode the composite as PNG
    #[error("PNG encoding failed: {0}")]
    EncodeError(String),

    /// Failed to complete the export pipeline (saving included)
    #[error("Export failed: {0}")]
    ExportError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}
