//! Image loading and conversion helpers around OpenCV

use crate::error::ScanError;
use crate::Result;
use image::RgbImage;
use opencv::{
    core::{self, Mat, Scalar, Size, Vector, CV_8UC1},
    imgcodecs::{self, IMREAD_COLOR, IMREAD_UNCHANGED},
    imgproc,
    prelude::*,
};
use std::path::Path;

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Load image as color Mat (BGR)
    pub fn load_color<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let path = path.as_ref();
        let mat = imgcodecs::imread(&path.to_string_lossy(), IMREAD_COLOR)
            .map_err(|e| ScanError::load(path, e.to_string()))?;

        // imread signals undecodable files with an empty Mat
        if mat.empty() {
            return Err(ScanError::load(path, "unreadable or unsupported image"));
        }
        Ok(mat)
    }

    /// Convert a BGR Mat to single channel grayscale
    pub fn to_grayscale(color: &Mat) -> Result<Mat> {
        let mut gray = Mat::default();
        imgproc::cvt_color_def(color, &mut gray, imgproc::COLOR_BGR2GRAY)?;
        Ok(gray)
    }

    /// Expand a grayscale Mat to three BGR channels
    pub fn to_color(gray: &Mat) -> Result<Mat> {
        let mut color = Mat::default();
        imgproc::cvt_color_def(gray, &mut color, imgproc::COLOR_GRAY2BGR)?;
        Ok(color)
    }

    /// Load the alpha channel of an image as a binary mask.
    ///
    /// Pixels that are not fully opaque become 0, the rest 255.
    pub fn load_alpha_mask<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let path = path.as_ref();
        let rgba = imgcodecs::imread(&path.to_string_lossy(), IMREAD_UNCHANGED)
            .map_err(|e| ScanError::load(path, e.to_string()))?;

        if rgba.empty() {
            return Err(ScanError::load(path, "unreadable or unsupported mask"));
        }
        if rgba.channels() != 4 {
            return Err(ScanError::load(
                path,
                format!("mask needs an alpha channel, found {} channel(s)", rgba.channels()),
            ));
        }

        let mut alpha = Mat::default();
        core::extract_channel(&rgba, &mut alpha, 3)?;

        Self::binarize_alpha(&alpha)
    }

    /// Map alpha values below full opacity to 0 and full opacity to 255
    pub fn binarize_alpha(alpha: &Mat) -> Result<Mat> {
        let mut mask = Mat::default();
        imgproc::threshold(alpha, &mut mask, 254.0, 255.0, imgproc::THRESH_BINARY)?;
        Ok(mask)
    }

    /// Build a single channel Mat from row-major bytes
    pub fn gray_from_raw(rows: usize, cols: usize, pixels: &[u8]) -> Result<Mat> {
        if pixels.len() != rows * cols {
            return Err(ScanError::Match(format!(
                "{}x{} image needs {} pixels, got {}",
                rows,
                cols,
                rows * cols,
                pixels.len()
            )));
        }
        let mut mat =
            Mat::new_rows_cols_with_default(rows as i32, cols as i32, CV_8UC1, Scalar::all(0.0))?;
        mat.data_bytes_mut()?.copy_from_slice(pixels);
        Ok(mat)
    }

    /// Convert a BGR Mat to an `image::RgbImage`
    pub fn mat_to_rgb(bgr: &Mat) -> Result<RgbImage> {
        let mut rgb = Mat::default();
        imgproc::cvt_color_def(bgr, &mut rgb, imgproc::COLOR_BGR2RGB)?;

        let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
        let bytes = rgb.data_bytes()?.to_vec();

        RgbImage::from_raw(width, height, bytes).ok_or_else(|| {
            ScanError::Match(format!("cannot view {}x{} Mat as RGB image", width, height))
        })
    }

    /// Scale factor that fits `width x height` into the preferred box,
    /// keeping the aspect ratio
    pub fn fit_scale(width: i32, height: i32, preferred_width: u32, preferred_height: u32) -> f64 {
        if width <= 0 || height <= 0 {
            return 1.0;
        }
        let scale_width = preferred_width as f64 / width as f64;
        let scale_height = preferred_height as f64 / height as f64;
        scale_width.min(scale_height)
    }

    /// Resize to fit the preferred box, keeping the aspect ratio
    pub fn resize_to_fit(image: &Mat, preferred_width: u32, preferred_height: u32) -> Result<Mat> {
        let scale = Self::fit_scale(image.cols(), image.rows(), preferred_width, preferred_height);
        let size = Size::new(
            ((image.cols() as f64 * scale).round() as i32).max(1),
            ((image.rows() as f64 * scale).round() as i32).max(1),
        );

        let mut resized = Mat::default();
        imgproc::resize(image, &mut resized, size, 0.0, 0.0, imgproc::INTER_AREA)?;
        Ok(resized)
    }

    /// Save Mat as image
    pub fn save_image<P: AsRef<Path>>(mat: &Mat, path: P) -> Result<()> {
        let path = path.as_ref();
        let written = imgcodecs::imwrite(&path.to_string_lossy(), mat, &Vector::new())?;
        if !written {
            return Err(ScanError::Io(std::io::Error::other(format!(
                "OpenCV could not write {:?}",
                path
            ))));
        }
        Ok(())
    }
}
