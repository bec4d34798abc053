//! Text recognition of matched buttons
//!
//! A button carries a word in its upper half and a code in its lower half.
//! Each half is cropped, padded, thickened and handed to a [`TextRecognizer`]
//! with its own character whitelist.
//!
//! [`TextRecognizer`]: crate::traits::TextRecognizer

pub mod engine;
pub mod region;

pub use engine::TesseractEngine;
pub use region::RegionExtractor;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";

/// Tesseract page segmentation mode for sparse text
pub const PSM_SPARSE_TEXT: u8 = 11;

/// Which characters to accept and how to segment the region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionProfile {
    pub whitelist: String,
    pub page_segmentation: u8,
}

impl RecognitionProfile {
    pub fn sparse(whitelist: impl Into<String>) -> Self {
        Self {
            whitelist: whitelist.into(),
            page_segmentation: PSM_SPARSE_TEXT,
        }
    }

    /// Upper half: uppercase letters only
    pub fn uppercase() -> Self {
        Self::sparse(UPPERCASE)
    }

    /// Lower half: uppercase letters and digits
    pub fn uppercase_digits() -> Self {
        Self::sparse(format!("{}{}", UPPERCASE, DIGITS))
    }
}

/// OCR configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub tesseract_binary: PathBuf,
    /// Tesseract language, engine default when unset
    pub language: Option<String>,
    pub upper: RecognitionProfile,
    pub lower: RecognitionProfile,
    /// Border width is the template height divided by this
    pub border_divisor: i32,
    /// Side of the square dilation kernel
    pub dilation_kernel: i32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_binary: PathBuf::from("tesseract"),
            language: None,
            upper: RecognitionProfile::uppercase(),
            lower: RecognitionProfile::uppercase_digits(),
            border_divisor: 4,
            dilation_kernel: 2,
        }
    }
}

/// Remove every whitespace character from recognized text
pub fn strip_whitespace(text: &str) -> String {
    text.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace(" SAVE \n\n"), "SAVE");
        assert_eq!(strip_whitespace("A 1\tB\r\n2\x0c"), "A1B2");
        assert_eq!(strip_whitespace("\n \n"), "");
    }

    #[test]
    fn test_default_profiles() {
        let config = OcrConfig::default();
        assert_eq!(config.upper.whitelist.len(), 26);
        assert_eq!(config.lower.whitelist.len(), 36);
        assert_eq!(config.lower.page_segmentation, PSM_SPARSE_TEXT);
    }
}
