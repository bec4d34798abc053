//! Error taxonomy of the scanner

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// A template, mask or screenshot could not be read or decoded
    #[error("failed to load {path:?}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// Missing directories, empty template set or invalid settings
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Template and mask do not fit together
    #[error("match error: {0}")]
    Match(String),

    /// The OCR engine could not be run or reported a failure
    #[error("recognition error: {0}")]
    Recognition(String),

    #[error(transparent)]
    OpenCv(#[from] opencv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl ScanError {
    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the whole run has to stop rather than skipping one image
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::Configuration(_))
    }
}
