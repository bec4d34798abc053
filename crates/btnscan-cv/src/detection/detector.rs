//! Scans one screenshot against every template

use super::config::ScanConfig;
use super::screen::ScreenImage;
use crate::bbox::{bgr_scalar, MatchCandidate};
use crate::ocr::RegionExtractor;
use crate::template::{Template, TemplateMatcher};
use crate::traits::TextRecognizer;
use crate::utils::ImageUtils;
use crate::Result;
use btnscan_core::ResultSheet;
use opencv::{
    core::{Mat, Point},
    highgui,
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};
use serde::Serialize;
use std::fs;
use std::time::Instant;

/// Scan statistics
#[derive(Debug, Clone, Serialize)]
pub struct ScanStats {
    pub templates: usize,
    pub matches: usize,
    pub processing_time_ms: u64,
}

/// Sheet of one screenshot plus statistics
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub sheet: ResultSheet,
    pub stats: ScanStats,
}

/// Matches templates, reads the matched buttons and fills a result sheet
pub struct ScreenScanner<R: TextRecognizer> {
    config: ScanConfig,
    matcher: TemplateMatcher,
    extractor: RegionExtractor,
    recognizer: R,
}

impl<R: TextRecognizer> ScreenScanner<R> {
    /// Create new scanner
    pub fn new(config: ScanConfig, recognizer: R) -> Result<Self> {
        config.validate()?;
        let matcher = TemplateMatcher::new(config.template_config.clone());
        let extractor = RegionExtractor::new(config.ocr.clone())?;

        Ok(Self {
            config,
            matcher,
            extractor,
            recognizer,
        })
    }

    /// Scan `image` for each template in order.
    ///
    /// Every template gets its column pair in the sheet, matched or not.
    pub fn scan(&self, image: &ScreenImage, templates: &[Template]) -> Result<ScanOutcome> {
        let start_time = Instant::now();
        let mut sheet = ResultSheet::new(&image.name, self.config.sheet.name_length);

        let mut canvas = if self.config.visualization.enabled() {
            Some(image.image.try_clone()?)
        } else {
            None
        };

        let all_matches = self.matcher.match_multiple(&image.grayscale, templates)?;
        let mut total = 0;

        for (template, matches) in templates.iter().zip(all_matches) {
            log::debug!("template: {}", template.name);
            let column = sheet.begin_template(&template.name);

            for candidate in &matches {
                let text = self
                    .extractor
                    .read(&image.image, candidate, template, &self.recognizer)?;
                log::debug!(
                    "  {} at ({}, {}) score {:.3}: '{}' / '{}'",
                    template.name,
                    candidate.col,
                    candidate.row,
                    candidate.score,
                    text.upper,
                    text.lower
                );
                column.push(text);

                if let Some(canvas) = canvas.as_mut() {
                    self.draw_match(canvas, candidate, template)?;
                }
            }
            total += matches.len();
        }

        if let Some(canvas) = canvas {
            self.present(image, &canvas)?;
        }

        let stats = ScanStats {
            templates: templates.len(),
            matches: total,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };
        log::info!(
            "{} ({}x{}): {} match(es) over {} template(s) in {}ms",
            image.name,
            image.width(),
            image.height(),
            stats.matches,
            stats.templates,
            stats.processing_time_ms
        );

        Ok(ScanOutcome { sheet, stats })
    }

    /// Outline a match in the template's colour and label it
    fn draw_match(&self, canvas: &mut Mat, candidate: &MatchCandidate, template: &Template) -> Result<()> {
        let color = bgr_scalar(template.color);
        imgproc::rectangle_points(
            canvas,
            Point::new(candidate.col, candidate.row),
            Point::new(
                candidate.col + template.width() + 1,
                candidate.row + template.height() + 1,
            ),
            color,
            self.config.visualization.line_thickness,
            LINE_8,
            0,
        )?;

        let label = format!("{} ({:.2})", template.name, candidate.score);
        imgproc::put_text(
            canvas,
            &label,
            Point::new(candidate.bbox.x, (candidate.bbox.y - 4).max(12)),
            FONT_HERSHEY_SIMPLEX,
            0.5,
            color,
            1,
            LINE_8,
            false,
        )?;
        Ok(())
    }

    /// Save and/or display the annotated image
    fn present(&self, image: &ScreenImage, canvas: &Mat) -> Result<()> {
        let vis = &self.config.visualization;

        if let Some(dir) = &vis.annotated_dir {
            fs::create_dir_all(dir)?;
            let output_path = dir.join(format!("{}.png", image.name));
            ImageUtils::save_image(canvas, &output_path)?;
            log::info!("Annotated image saved: {:?}", output_path);
        }

        if vis.verbose {
            let preview = ImageUtils::resize_to_fit(canvas, vis.preferred_width, vis.preferred_height)?;
            highgui::imshow(&image.name, &preview)?;
            highgui::wait_key(0)?;
            highgui::destroy_window(&image.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::ocr::RecognitionProfile;
    use image::RgbImage;
    use std::path::PathBuf;

    struct Silent;

    impl TextRecognizer for Silent {
        fn recognize(&self, _region: &RgbImage, _profile: &RecognitionProfile) -> Result<String> {
            Ok(String::new())
        }
    }

    struct Broken;

    impl TextRecognizer for Broken {
        fn recognize(&self, _region: &RgbImage, _profile: &RecognitionProfile) -> Result<String> {
            Err(ScanError::Recognition("engine crashed".into()))
        }
    }

    fn noise(len: usize) -> Vec<u8> {
        let mut seed = 0x1234_5679_u32;
        (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                (seed >> 24) as u8
            })
            .collect()
    }

    fn fixture() -> Result<(ScreenImage, Template)> {
        let patch = noise(20 * 30);
        let template = Template::new(
            "plain".to_string(),
            ImageUtils::to_color(&ImageUtils::gray_from_raw(20, 30, &patch)?)?,
        )?;

        let (rows, cols) = (60, 90);
        let mut pixels = vec![128u8; rows * cols];
        for r in 0..20 {
            let dst = (r + 20) * cols + 40;
            pixels[dst..dst + 30].copy_from_slice(&patch[r * 30..(r + 1) * 30]);
        }
        let image = ScreenImage::from_mat(
            "capture".to_string(),
            ImageUtils::to_color(&ImageUtils::gray_from_raw(rows, cols, &pixels)?)?,
        )?;
        Ok((image, template))
    }

    #[test]
    fn test_scanner_rejects_invalid_config() {
        let mut config = ScanConfig::default();
        config.template_config.threshold = 2.0;
        assert!(ScreenScanner::new(config, Silent).is_err());
    }

    #[test]
    fn test_empty_text_is_recorded_as_a_row() -> Result<()> {
        let (image, template) = fixture()?;
        let scanner = ScreenScanner::new(ScanConfig::default(), Silent)?;
        let outcome = scanner.scan(&image, &[template])?;

        let column = outcome.sheet.column("plain").expect("template column");
        assert_eq!(column.rows.len(), 1);
        assert!(column.rows[0].upper.is_empty() && column.rows[0].lower.is_empty());
        assert_eq!(outcome.stats.matches, 1);
        Ok(())
    }

    #[test]
    fn test_recognition_failure_fails_the_image() -> Result<()> {
        let (image, template) = fixture()?;
        let scanner = ScreenScanner::new(ScanConfig::default(), Broken)?;
        let err = scanner.scan(&image, &[template]).unwrap_err();
        assert!(matches!(err, ScanError::Recognition(_)));
        Ok(())
    }

    #[test]
    fn test_annotated_image_is_written() -> Result<()> {
        let (image, template) = fixture()?;
        let dir: PathBuf = std::env::temp_dir().join(format!("btnscan-annotated-{}", std::process::id()));
        let mut config = ScanConfig::default();
        config.visualization.annotated_dir = Some(dir.clone());

        ScreenScanner::new(config, Silent)?.scan(&image, &[template])?;
        assert!(dir.join("capture.png").is_file());

        fs::remove_dir_all(&dir).ok();
        Ok(())
    }
}
