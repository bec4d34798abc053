//! Cropping and clean-up of matched regions before recognition

use super::{strip_whitespace, OcrConfig};
use crate::bbox::{BBox, MatchCandidate};
use crate::error::ScanError;
use crate::template::Template;
use crate::traits::TextRecognizer;
use crate::utils::ImageUtils;
use crate::Result;
use btnscan_core::TextPair;
use image::RgbImage;
use opencv::{
    core::{self, Mat, Scalar, CV_8UC1},
    imgproc,
    prelude::*,
};

/// Upper and lower half of a matched button, ready for recognition.
/// `None` for a half that lies outside the image.
#[derive(Debug, Clone)]
pub struct ButtonRegions {
    pub upper: Option<RgbImage>,
    pub lower: Option<RgbImage>,
}

pub struct RegionExtractor {
    config: OcrConfig,
    kernel: Mat,
}

impl RegionExtractor {
    pub fn new(config: OcrConfig) -> Result<Self> {
        if config.border_divisor <= 0 || config.dilation_kernel <= 0 {
            return Err(ScanError::Configuration(format!(
                "border divisor ({}) and dilation kernel ({}) must be positive",
                config.border_divisor, config.dilation_kernel
            )));
        }
        let kernel = Mat::new_rows_cols_with_default(
            config.dilation_kernel,
            config.dilation_kernel,
            CV_8UC1,
            Scalar::all(1.0),
        )?;
        Ok(Self { config, kernel })
    }

    /// Boxes of the upper and lower half, split at half the template height
    pub fn halves(candidate: &MatchCandidate, template: &Template, image_size: (i32, i32)) -> (BBox, BBox) {
        let (width, height) = (template.width(), template.height());
        let split = height / 2;
        let upper = BBox::new(candidate.col, candidate.row, width, split);
        let lower = BBox::new(candidate.col, candidate.row + split, width, height - split);
        (
            upper.clipped(image_size.0, image_size.1),
            lower.clipped(image_size.0, image_size.1),
        )
    }

    /// Crop both halves from the BGR image, pad them with white, dilate and
    /// convert to RGB
    pub fn regions(&self, image: &Mat, candidate: &MatchCandidate, template: &Template) -> Result<ButtonRegions> {
        let (upper, lower) = Self::halves(candidate, template, (image.cols(), image.rows()));
        let border = template.height() / self.config.border_divisor;
        Ok(ButtonRegions {
            upper: self.prepare(image, upper, border)?,
            lower: self.prepare(image, lower, border)?,
        })
    }

    fn prepare(&self, image: &Mat, area: BBox, border: i32) -> Result<Option<RgbImage>> {
        if area.area() == 0 {
            return Ok(None);
        }
        let crop = Mat::roi(image, area.to_rect())?.try_clone()?;

        let mut padded = Mat::default();
        core::copy_make_border(
            &crop,
            &mut padded,
            border,
            border,
            border,
            border,
            core::BORDER_CONSTANT,
            Scalar::all(255.0),
        )?;

        let mut dilated = Mat::default();
        imgproc::dilate_def(&padded, &mut dilated, &self.kernel)?;

        ImageUtils::mat_to_rgb(&dilated).map(Some)
    }

    /// Recognize the text of both halves of a match.
    ///
    /// A half with no readable text yields an empty string.
    pub fn read<R: TextRecognizer>(
        &self,
        image: &Mat,
        candidate: &MatchCandidate,
        template: &Template,
        recognizer: &R,
    ) -> Result<TextPair> {
        let regions = self.regions(image, candidate, template)?;

        let upper = match &regions.upper {
            Some(region) => strip_whitespace(&recognizer.recognize(region, &self.config.upper)?),
            None => String::new(),
        };
        let lower = match &regions.lower {
            Some(region) => strip_whitespace(&recognizer.recognize(region, &self.config.lower)?),
            None => String::new(),
        };

        Ok(TextPair { upper, lower })
    }
}
