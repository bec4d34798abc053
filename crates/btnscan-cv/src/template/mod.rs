//! Template matching module

pub mod loader;
pub mod matcher;

pub use loader::TemplateLoader;
pub use matcher::TemplateMatcher;

use crate::error::ScanError;
use crate::utils::ImageUtils;
use crate::Result;
use btnscan_core::Rgb;
use opencv::{core, core::Mat, prelude::*};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mask value of pixels that take part in matching
pub const MASK_ON: u8 = 255;

/// Button template with its matching mask
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub path: PathBuf,
    /// BGR view
    pub image: Mat,
    pub grayscale: Mat,
    /// 0 = ignored, 255 = compared; same size as `grayscale`
    pub mask: Mat,
    pub color: Rgb,
}

impl Template {
    /// Create a template from a BGR image with the default text-band mask
    pub fn new(name: String, image: Mat) -> Result<Self> {
        let grayscale = ImageUtils::to_grayscale(&image)?;
        let mask = default_mask(grayscale.rows() as usize, grayscale.cols() as usize)?;
        let template = Self {
            name,
            path: PathBuf::new(),
            image,
            grayscale,
            mask,
            color: (255, 255, 255),
        };
        template.validate_mask()?;
        Ok(template)
    }

    /// Replace the default mask with a user supplied one
    pub fn with_mask(mut self, mask: Mat) -> Result<Self> {
        self.mask = mask;
        self.validate_mask()?;
        Ok(self)
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn width(&self) -> i32 {
        self.grayscale.cols()
    }

    pub fn height(&self) -> i32 {
        self.grayscale.rows()
    }

    fn validate_mask(&self) -> Result<()> {
        let (rows, cols) = (self.mask.rows(), self.mask.cols());
        if rows != self.height() || cols != self.width() {
            return Err(ScanError::Match(format!(
                "mask of '{}' is {}x{}, template is {}x{}",
                self.name,
                cols,
                rows,
                self.width(),
                self.height()
            )));
        }
        if self.mask.channels() != 1 {
            return Err(ScanError::Match(format!(
                "mask of '{}' must have one channel, found {}",
                self.name,
                self.mask.channels()
            )));
        }
        if core::count_non_zero(&self.mask)? == 0 {
            return Err(ScanError::Match(format!(
                "mask of '{}' excludes every pixel",
                self.name
            )));
        }
        Ok(())
    }
}

/// Rows `[top, bottom)` and columns `[left, right)` blanked by the default mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBand {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl TextBand {
    pub fn area(&self) -> usize {
        self.bottom.saturating_sub(self.top) * self.right.saturating_sub(self.left)
    }
}

/// Upper and lower text bands of a `rows x cols` button.
///
/// Both are proportioned to a tenth of the smaller dimension.
pub fn default_mask_bands(rows: usize, cols: usize) -> [TextBand; 2] {
    let m = rows.min(cols) / 10;
    [
        TextBand {
            top: m,
            bottom: m * 4,
            left: m,
            right: m * 9,
        },
        TextBand {
            top: m * 6,
            bottom: m * 8,
            left: m,
            right: m * 9,
        },
    ]
}

/// Row-major default mask: 255 everywhere except the two text bands
pub fn default_mask_pixels(rows: usize, cols: usize) -> Vec<u8> {
    let mut pixels = vec![MASK_ON; rows * cols];
    for band in default_mask_bands(rows, cols) {
        for r in band.top..band.bottom {
            pixels[r * cols + band.left..r * cols + band.right].fill(0);
        }
    }
    pixels
}

pub fn default_mask(rows: usize, cols: usize) -> Result<Mat> {
    ImageUtils::gray_from_raw(rows, cols, &default_mask_pixels(rows, cols))
}

/// Template matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Scores must be strictly above this to count as a match
    pub threshold: f64,
    /// Extensions of template and screenshot images, case-sensitive
    pub image_extensions: Vec<String>,
    /// Extensions of alpha masks, case-sensitive
    pub mask_extensions: Vec<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            threshold: 0.48,
            image_extensions: ["jpg", "jpeg", "JPG", "JPEG"].map(String::from).to_vec(),
            mask_extensions: ["png", "PNG"].map(String::from).to_vec(),
        }
    }
}

impl TemplateConfig {
    pub fn is_image(&self, extension: &str) -> bool {
        has_extension(&self.image_extensions, extension)
    }

    pub fn is_mask(&self, extension: &str) -> bool {
        has_extension(&self.mask_extensions, extension)
    }
}

fn has_extension(list: &[String], extension: &str) -> bool {
    list.iter().any(|e| e.trim_start_matches('.') == extension)
}
