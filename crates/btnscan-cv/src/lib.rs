//! Button scanning library
//!
//! Template matching with masked correlation, greedy peak suppression and
//! OCR of the matched regions, built on OpenCV.

pub mod bbox;
pub mod detection;
pub mod error;
pub mod ocr;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use bbox::{BBox, MatchCandidate};
pub use detection::{ScanConfig, ScanOutcome, ScreenImage, ScreenScanner};
pub use error::ScanError;
pub use ocr::{RecognitionProfile, RegionExtractor, TesseractEngine};
pub use template::{Template, TemplateLoader, TemplateMatcher};
pub use utils::nms::{CorrelationMap, Suppression};

// Error handling
pub type Result<T> = std::result::Result<T, ScanError>;

/// Seams between the scanner and its collaborators
pub mod traits {
    use super::*;
    use image::RgbImage;
    use opencv::core::Mat;

    /// Produces the correlation surface of a template over an image
    pub trait TemplateMatchable {
        fn correlate(&self, image: &Mat, template: &Template) -> Result<CorrelationMap>;
    }

    /// Reads text from a prepared RGB region
    ///
    /// Returning an empty string means no text was found and is not an error.
    pub trait TextRecognizer {
        fn recognize(&self, region: &RgbImage, profile: &RecognitionProfile) -> Result<String>;
    }

    impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
        fn recognize(&self, region: &RgbImage, profile: &RecognitionProfile) -> Result<String> {
            (**self).recognize(region, profile)
        }
    }

    impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
        fn recognize(&self, region: &RgbImage, profile: &RecognitionProfile) -> Result<String> {
            (**self).recognize(region, profile)
        }
    }
}
