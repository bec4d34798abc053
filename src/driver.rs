use crate::recorder::WorkbookRecorder;
use anyhow::{Context, Result};
use btnscan_core::ResultBook;
use btnscan_cv::template::loader::{file_extension, file_stem, sorted_files};
use btnscan_cv::traits::TextRecognizer;
use btnscan_cv::{ScanConfig, ScanOutcome, ScreenImage, ScreenScanner, Template, TemplateLoader};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Image that could not be scanned, with the reason
#[derive(Debug, Clone, Serialize)]
pub struct ImageFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub templates: usize,
    pub scanned: usize,
    pub matches: usize,
    pub failures: Vec<ImageFailure>,
    pub output: PathBuf,
}

impl RunReport {
    pub fn log_summary(&self) {
        log::info!(
            "Scanned {} image(s) with {} template(s): {} match(es)",
            self.scanned,
            self.templates,
            self.matches
        );
        if !self.failures.is_empty() {
            log::warn!("{} image(s) failed:", self.failures.len());
            for failure in &self.failures {
                log::warn!("  {:?}: {}", failure.path, failure.reason);
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write report: {:?}", path))
    }
}

/// Scan every image of the configured directory and write the workbook
pub fn run<R: TextRecognizer>(config: ScanConfig, recognizer: R) -> Result<RunReport> {
    let templates = TemplateLoader::new(config.template_config.clone())
        .add_template_dir(&config.template_dir)
        .with_palette(config.palette.clone())
        .load_all_templates()
        .context("Failed to load templates")?;

    let images = image_files(&config).context("Failed to list images")?;
    log::info!("Found {} image(s) in {:?}", images.len(), config.image_dir);

    let output = config.output_file.clone();
    let scanner = ScreenScanner::new(config, recognizer)?;

    let mut book = ResultBook::new();
    let mut report = RunReport {
        templates: templates.len(),
        scanned: 0,
        matches: 0,
        failures: Vec::new(),
        output: output.clone(),
    };

    for path in &images {
        log::info!("Scanning {:?}", path);
        match scan_one(&scanner, &templates, path) {
            Ok(outcome) => {
                report.scanned += 1;
                report.matches += outcome.stats.matches;
                book.push(outcome.sheet);
            }
            Err(e) if e.is_fatal() => {
                return Err(e).with_context(|| format!("Aborting at {:?}", path));
            }
            Err(e) => {
                log::error!("Failed to scan {:?}: {}", path, e);
                report.failures.push(ImageFailure {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    WorkbookRecorder::new().save(&book, &output)?;
    Ok(report)
}

fn scan_one<R: TextRecognizer>(
    scanner: &ScreenScanner<R>,
    templates: &[Template],
    path: &Path,
) -> btnscan_cv::Result<ScanOutcome> {
    let image = ScreenImage::load(path)?;
    scanner.scan(&image, templates)
}

/// Images of the configured directory, sorted by file name
pub fn image_files(config: &ScanConfig) -> Result<Vec<PathBuf>> {
    let files = sorted_files(&config.image_dir)?;
    Ok(files
        .into_iter()
        .filter(|path| {
            let accepted = file_extension(path)
                .is_some_and(|ext| config.template_config.is_image(&ext))
                && file_stem(path).is_some();
            if !accepted {
                log::debug!("Skipping {:?}", path);
            }
            accepted
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use btnscan_cv::utils::ImageUtils;
    use btnscan_cv::{RecognitionProfile, ScanError};
    use image::RgbImage;
    use std::fs;

    struct Fixed;

    impl TextRecognizer for Fixed {
        fn recognize(&self, _region: &RgbImage, _profile: &RecognitionProfile) -> btnscan_cv::Result<String> {
            Ok("OK".to_string())
        }
    }

    struct Unavailable;

    impl TextRecognizer for Unavailable {
        fn recognize(&self, _region: &RgbImage, _profile: &RecognitionProfile) -> btnscan_cv::Result<String> {
            Err(ScanError::Recognition("engine exited with status 1".to_string()))
        }
    }

    fn workspace(tag: &str) -> Result<PathBuf> {
        let root = std::env::temp_dir().join(format!("btnscan-driver-{}-{}", tag, std::process::id()));
        if root.exists() {
            fs::remove_dir_all(&root)?;
        }
        fs::create_dir_all(root.join("templates"))?;
        fs::create_dir_all(root.join("images"))?;
        Ok(root)
    }

    fn noise(len: usize) -> Vec<u8> {
        let mut seed = 0x2545_f491_u32;
        (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                (seed >> 24) as u8
            })
            .collect()
    }

    const TEMPLATE: (usize, usize) = (40, 60);
    const SCREEN: (usize, usize) = (120, 160);

    /// Grayscale template pixels and a screenshot holding one copy at (30, 50)
    fn pixels() -> (Vec<u8>, Vec<u8>) {
        let (h, w) = TEMPLATE;
        let patch = noise(h * w);
        let mut screen = vec![20u8; SCREEN.0 * SCREEN.1];
        for r in 0..h {
            let dst = (r + 30) * SCREEN.1 + 50;
            screen[dst..dst + w].copy_from_slice(&patch[r * w..(r + 1) * w]);
        }
        (patch, screen)
    }

    /// Lossless data under a `.jpg` name; readers sniff the content
    fn write_gray(path: &Path, rows: usize, cols: usize, data: &[u8]) -> Result<()> {
        let color = ImageUtils::to_color(&ImageUtils::gray_from_raw(rows, cols, data)?)?;
        let tmp = path.with_extension("tmp.png");
        ImageUtils::save_image(&color, &tmp)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn populate(root: &Path) -> Result<()> {
        let (patch, screen) = pixels();
        write_gray(&root.join("templates").join("ok.jpg"), TEMPLATE.0, TEMPLATE.1, &patch)?;
        write_gray(&root.join("images").join("shot_1.jpg"), SCREEN.0, SCREEN.1, &screen)?;
        Ok(())
    }

    fn config(root: &Path) -> ScanConfig {
        let mut config = ScanConfig::default();
        config.template_dir = root.join("templates");
        config.image_dir = root.join("images");
        config.output_file = root.join("out.xlsx");
        config.template_config.threshold = 0.5;
        config
    }

    #[test]
    fn test_image_files_are_filtered_and_sorted() -> Result<()> {
        let root = workspace("list")?;
        for name in ["b.jpg", "a.JPG", "notes.txt", "c.png"] {
            fs::write(root.join("images").join(name), b"")?;
        }
        let files = image_files(&config(&root))?;
        let names: Vec<_> = files.iter().filter_map(|p| p.file_name()).collect();
        assert_eq!(names, vec!["a.JPG", "b.jpg"]);
        fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[test]
    fn test_missing_image_dir_is_fatal() -> Result<()> {
        let root = workspace("missing")?;
        populate(&root)?;
        fs::remove_dir_all(root.join("images"))?;
        assert!(run(config(&root), Fixed).is_err());
        assert!(!root.join("out.xlsx").exists());
        fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[test]
    fn test_empty_template_dir_is_fatal() -> Result<()> {
        let root = workspace("no-templates")?;
        assert!(run(config(&root), Fixed).is_err());
        fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[test]
    fn test_unreadable_image_does_not_stop_the_run() -> Result<()> {
        let root = workspace("partial")?;
        populate(&root)?;
        fs::write(root.join("images").join("shot_2.jpg"), b"not an image")?;

        let report = run(config(&root), Fixed)?;
        assert_eq!(report.templates, 1);
        assert_eq!(report.scanned, 1);
        assert_eq!(report.matches, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("shot_2.jpg"));
        assert!(fs::read(root.join("out.xlsx"))?.starts_with(b"PK"));
        fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[test]
    fn test_recognition_failure_discards_the_image() -> Result<()> {
        let root = workspace("ocr")?;
        populate(&root)?;

        let report = run(config(&root), Unavailable)?;
        assert_eq!(report.scanned, 0);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("status 1"));
        assert!(root.join("out.xlsx").exists());
        fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[test]
    fn test_report_is_written_as_json() -> Result<()> {
        let root = workspace("report")?;
        let report = RunReport {
            templates: 2,
            scanned: 1,
            matches: 3,
            failures: vec![ImageFailure {
                path: PathBuf::from("bad.jpg"),
                reason: "unreadable".to_string(),
            }],
            output: root.join("out.xlsx"),
        };
        let path = root.join("report.json");
        report.save(&path)?;

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(value["matches"], 3);
        assert_eq!(value["failures"][0]["reason"], "unreadable");
        fs::remove_dir_all(&root)?;
        Ok(())
    }
}
