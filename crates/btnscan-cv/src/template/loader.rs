//! Template loading utilities

use super::{Template, TemplateConfig};
use crate::error::ScanError;
use crate::utils::image::ImageUtils;
use crate::Result;
use btnscan_core::Palette;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Loads button templates and their optional alpha masks from directories
pub struct TemplateLoader {
    template_dirs: Vec<PathBuf>,
    config: TemplateConfig,
    palette: Palette,
}

impl TemplateLoader {
    /// Create new template loader
    pub fn new(config: TemplateConfig) -> Self {
        Self {
            template_dirs: Vec::new(),
            config,
            palette: Palette::default(),
        }
    }

    /// Add template directory
    pub fn add_template_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.template_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    /// Palette used to colour templates in the preview
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Load all templates from the directories, in file name order.
    ///
    /// `<stem>.<mask ext>` next to `<stem>.<image ext>` replaces the default
    /// mask of that template. Fails if a directory is missing or nothing was
    /// loaded.
    pub fn load_all_templates(&self) -> Result<Vec<Template>> {
        let mut templates = Vec::new();

        for dir in &self.template_dirs {
            templates.extend(self.load_dir(dir)?);
        }

        if templates.is_empty() {
            return Err(ScanError::Configuration(format!(
                "no templates found in {:?} (accepted extensions: {:?})",
                self.template_dirs, self.config.image_extensions
            )));
        }

        let colors = self.palette.assign(templates.len());
        let templates = templates
            .into_iter()
            .zip(colors)
            .map(|(template, color)| template.with_color(color))
            .collect::<Vec<_>>();

        log::info!("Loaded {} template(s) from {:?}", templates.len(), self.template_dirs);
        Ok(templates)
    }

    fn load_dir(&self, dir: &Path) -> Result<Vec<Template>> {
        let mut image_files = Vec::new();
        let mut mask_files: HashMap<String, PathBuf> = HashMap::new();

        for path in sorted_files(dir)? {
            let (Some(stem), Some(ext)) = (file_stem(&path), file_extension(&path)) else {
                log::info!("Skipping {:?}: no file extension", path);
                continue;
            };

            if self.config.is_image(&ext) {
                image_files.push((stem, path));
            } else if self.config.is_mask(&ext) {
                if let Some(previous) = mask_files.insert(stem, path.clone()) {
                    log::warn!("Mask {:?} replaces {:?}", path, previous);
                }
            } else {
                log::info!("Skipping {:?}: not a template image or mask", path);
            }
        }

        let mut used_masks = HashSet::new();
        let mut templates = Vec::with_capacity(image_files.len());

        for (name, path) in image_files {
            let image = ImageUtils::load_color(&path)?;
            let mut template = Template::new(name.clone(), image)?.with_path(path.clone());

            if let Some(mask_path) = mask_files.get(&name) {
                let mask = ImageUtils::load_alpha_mask(mask_path)?;
                template = template.with_mask(mask)?;
                used_masks.insert(name.clone());
                log::debug!("Template '{}' uses mask {:?}", name, mask_path);
            }

            log::debug!(
                "Loaded template '{}' ({}x{}) from {:?}",
                name,
                template.width(),
                template.height(),
                path
            );
            templates.push(template);
        }

        for (stem, path) in &mask_files {
            if !used_masks.contains(stem) {
                log::warn!("Mask {:?} has no template named '{}'", path, stem);
            }
        }

        Ok(templates)
    }
}

/// Regular files of `dir`, sorted by file name
pub fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ScanError::Configuration(format!(
            "directory {:?} does not exist",
            dir
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}

pub fn file_extension(path: &Path) -> Option<String> {
    path.extension().map(|s| s.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::{
        core::{self, Mat, Scalar, CV_8UC4},
        prelude::*,
    };

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("btnscan-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Encoders are picked by lowercase extension, so write first and rename
    fn save_as(dir: &Path, file: &str, mat: &Mat) {
        let lower = dir.join(format!("tmp-{}", file.to_lowercase()));
        ImageUtils::save_image(mat, &lower).unwrap();
        fs::rename(&lower, dir.join(file)).unwrap();
    }

    fn write_template(dir: &Path, file: &str, rows: usize, cols: usize) {
        let pixels: Vec<u8> = (0..rows * cols).map(|i| (i * 7 % 251) as u8).collect();
        let gray = ImageUtils::gray_from_raw(rows, cols, &pixels).unwrap();
        save_as(dir, file, &ImageUtils::to_color(&gray).unwrap());
    }

    /// Mask whose first `opaque_rows` rows are fully opaque
    fn write_mask(dir: &Path, file: &str, rows: i32, cols: i32, opaque_rows: i32) {
        let mut rgba =
            Mat::new_rows_cols_with_default(rows, cols, CV_8UC4, Scalar::new(0.0, 0.0, 0.0, 0.0))
                .unwrap();
        let bytes = rgba.data_bytes_mut().unwrap();
        for r in 0..opaque_rows {
            for c in 0..cols {
                bytes[((r * cols + c) * 4 + 3) as usize] = 255;
            }
        }
        save_as(dir, file, &rgba);
    }

    #[test]
    fn test_load_templates_with_masks() -> Result<()> {
        let dir = scratch_dir("loader");
        write_template(&dir, "ok.jpg", 30, 60);
        write_template(&dir, "cancel.JPEG", 40, 80);
        write_mask(&dir, "ok.png", 30, 60, 10);
        write_mask(&dir, "orphan.PNG", 5, 5, 5);
        fs::write(dir.join("notes.txt"), "not an image").unwrap();
        write_template(&dir, "skipped.Jpg", 20, 20);

        let templates = TemplateLoader::new(TemplateConfig::default())
            .add_template_dir(&dir)
            .load_all_templates()?;

        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["cancel", "ok"]);

        let ok = &templates[1];
        assert_eq!((ok.width(), ok.height()), (60, 30));
        assert_eq!(core::count_non_zero(&ok.mask)?, 10 * 60);

        let palette = Palette::default();
        assert_eq!(templates[0].color, palette.colors[0]);
        assert_eq!(templates[1].color, palette.colors[3]);

        fs::remove_dir_all(&dir).ok();
        Ok(())
    }

    #[test]
    fn test_mismatched_mask_fails_loading() {
        let dir = scratch_dir("loader-mismatch");
        write_template(&dir, "ok.jpg", 30, 60);
        write_mask(&dir, "ok.png", 60, 30, 10);

        let result = TemplateLoader::new(TemplateConfig::default())
            .add_template_dir(&dir)
            .load_all_templates();
        assert!(matches!(result, Err(ScanError::Match(_))));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_mask_without_alpha_fails_loading() {
        let dir = scratch_dir("loader-no-alpha");
        write_template(&dir, "ok.jpg", 30, 60);
        // Three channel image under the mask name
        write_template(&dir, "ok.png", 30, 60);

        let result = TemplateLoader::new(TemplateConfig::default())
            .add_template_dir(&dir)
            .load_all_templates();
        assert!(matches!(result, Err(ScanError::Load { .. })), "got {:?}", result.err());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_or_empty_directory_is_configuration_error() {
        let missing = TemplateLoader::new(TemplateConfig::default())
            .add_template_dir("does/not/exist")
            .load_all_templates();
        assert!(matches!(missing, Err(ScanError::Configuration(_))));

        let dir = scratch_dir("loader-empty");
        let empty = TemplateLoader::new(TemplateConfig::default())
            .add_template_dir(&dir)
            .load_all_templates();
        assert!(matches!(empty, Err(ScanError::Configuration(_))));

        fs::remove_dir_all(&dir).ok();
    }
}
