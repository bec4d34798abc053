//! Scan configuration

use crate::error::ScanError;
use crate::ocr::OcrConfig;
use crate::template::TemplateConfig;
use crate::Result;
use btnscan_core::sheet::{DEFAULT_NAME_LENGTH, MAX_NAME_LENGTH};
use btnscan_core::Palette;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub template_dir: PathBuf,
    pub image_dir: PathBuf,
    pub output_file: PathBuf,
    pub template_config: TemplateConfig,
    pub ocr: OcrConfig,
    pub sheet: SheetConfig,
    pub visualization: VisualizationConfig,
    pub palette: Palette,
}

/// Result sheet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Characters of the image name kept as sheet name
    pub name_length: usize,
}

/// Visualization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    /// Show every annotated image in a window and wait for a key press
    pub verbose: bool,
    pub preferred_width: u32,
    pub preferred_height: u32,
    pub line_thickness: i32,
    /// Also write annotated images here
    pub annotated_dir: Option<PathBuf>,
}

impl VisualizationConfig {
    pub fn enabled(&self) -> bool {
        self.verbose || self.annotated_dir.is_some()
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            template_dir: "templates".into(),
            image_dir: "images".into(),
            output_file: "scan_result.xlsx".into(),
            template_config: TemplateConfig::default(),
            ocr: OcrConfig::default(),
            sheet: SheetConfig::default(),
            visualization: VisualizationConfig::default(),
            palette: Palette::default(),
        }
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            name_length: DEFAULT_NAME_LENGTH,
        }
    }
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            preferred_width: 900,
            preferred_height: 600,
            line_thickness: 2,
            annotated_dir: None,
        }
    }
}

impl ScanConfig {
    /// Load from a JSON file; missing keys keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ScanError::load(path, e.to_string()))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| ScanError::Configuration(format!("invalid configuration: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ScanError::Configuration(format!("cannot serialize configuration: {}", e)))
    }

    /// Reject settings the scanner cannot work with
    pub fn validate(&self) -> Result<()> {
        let threshold = self.template_config.threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ScanError::Configuration(format!(
                "threshold must lie in [0, 1], got {}",
                threshold
            )));
        }
        if self.template_config.image_extensions.is_empty() {
            return Err(ScanError::Configuration("no image extensions configured".into()));
        }
        if self.template_config.mask_extensions.is_empty() {
            return Err(ScanError::Configuration("no mask extensions configured".into()));
        }
        if self.palette.is_empty() {
            return Err(ScanError::Configuration("palette has no colours".into()));
        }
        if !(1..=MAX_NAME_LENGTH).contains(&self.sheet.name_length) {
            return Err(ScanError::Configuration(format!(
                "sheet name length must lie in [1, {}], got {}",
                MAX_NAME_LENGTH, self.sheet.name_length
            )));
        }
        let vis = &self.visualization;
        if vis.preferred_width == 0 || vis.preferred_height == 0 || vis.line_thickness <= 0 {
            return Err(ScanError::Configuration(
                "preview size and line thickness must be positive".into(),
            ));
        }
        if self.ocr.border_divisor <= 0 || self.ocr.dilation_kernel <= 0 {
            return Err(ScanError::Configuration(
                "OCR border divisor and dilation kernel must be positive".into(),
            ));
        }
        Ok(())
    }
}
