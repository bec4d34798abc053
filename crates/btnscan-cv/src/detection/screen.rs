//! Screenshots to be scanned

use crate::template::loader::file_stem;
use crate::utils::ImageUtils;
use crate::Result;
use opencv::{core::Mat, prelude::*};
use std::path::{Path, PathBuf};

/// Screenshot to be scanned
#[derive(Debug, Clone)]
pub struct ScreenImage {
    pub name: String,
    pub path: PathBuf,
    /// BGR view, also the source of OCR crops
    pub image: Mat,
    pub grayscale: Mat,
}

impl ScreenImage {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = file_stem(path).unwrap_or_else(|| path.to_string_lossy().to_string());
        let image = ImageUtils::load_color(path)?;
        Ok(Self::from_mat(name, image)?.with_path(path.to_path_buf()))
    }

    pub fn from_mat(name: String, image: Mat) -> Result<Self> {
        let grayscale = ImageUtils::to_grayscale(&image)?;
        Ok(Self {
            name,
            path: PathBuf::new(),
            image,
            grayscale,
        })
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    pub fn width(&self) -> i32 {
        self.image.cols()
    }

    pub fn height(&self) -> i32 {
        self.image.rows()
    }
}
