//! Error types for mediabox.

use thiserror::Error;

/// Common error type for mediabox.
#[derive(Error, Debug)]
pub enum MediaboxError {
    /// I/O error from the upload directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The target of a mutation is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Remote fetch for an upload-from-URL failed.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Preview generation failed.
    #[error("thumbnail error: {0}")]
    Thumbnail(String),

    /// Archive creation failed.
    #[error("archive error: {0}")]
    Archive(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for MediaboxError {
    fn from(e: reqwest::Error) -> Self {
        MediaboxError::Fetch(e.to_string())
    }
}

impl From<image::ImageError> for MediaboxError {
    fn from(e: image::ImageError) -> Self {
        MediaboxError::Thumbnail(e.to_string())
    }
}

impl From<zip::result::ZipError> for MediaboxError {
    fn from(e: zip::result::ZipError) -> Self {
        MediaboxError::Archive(e.to_string())
    }
}

/// Result type alias for mediabox operations.
pub type Result<T> = std::result::Result<T, MediaboxError>;
