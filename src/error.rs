//! Error taxonomy for everything outside the pixel engines.
//!
//! The engines in [`crate::ops`] never fail on per-element input; the variants
//! here belong to the collaborators around them (validation, storage, decode).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TranspalentorError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("file size {size} bytes exceeds maximum limit of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("target color not specified for transparency processing")]
    ColorNotSpecified,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("image processing failed: {0}")]
    ImageProcessing(String),

    #[error("unsafe file path detected: {}", .0.display())]
    UnsafePath(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranspalentorError {
    /// Stable machine-readable code, suitable for a transport layer to forward.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::ColorNotSpecified => "COLOR_NOT_SPECIFIED",
            Self::InvalidParameter(_) | Self::Json(_) => "INVALID_PARAMETER",
            Self::ImageProcessing(_) | Self::Image(_) => "PROCESSING_ERROR",
            Self::UnsafePath(_) | Self::Io(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, TranspalentorError>;
