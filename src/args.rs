use anyhow::{Context, Result};
use btnscan_core::Palette;
use btnscan_cv::ScanConfig;
use clap::Parser;
use std::path::PathBuf;

/// Find button templates in screenshots and read their labels into a workbook
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory with template images (.jpg) and optional alpha masks (.png)
    #[arg(short, long)]
    pub templates: Option<PathBuf>,

    /// Directory with the screenshots to scan
    #[arg(short, long)]
    pub images: Option<PathBuf>,

    /// Workbook to write, overwritten if it exists
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Minimum correlation score of a match, exclusive
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Show each annotated screenshot and wait for a key press
    #[arg(short, long)]
    pub verbose: bool,

    /// Write annotated screenshots to this directory
    #[arg(long)]
    pub annotated_dir: Option<PathBuf>,

    /// Palette file with one R,G,B colour per line
    #[arg(long)]
    pub palette: Option<PathBuf>,

    /// Path of the tesseract executable
    #[arg(long)]
    pub tesseract: Option<PathBuf>,

    /// Tesseract language
    #[arg(long)]
    pub lang: Option<String>,

    /// Write a JSON run report (counts and failed images) to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub dump_config: bool,
}

impl Args {
    /// Defaults, then the configuration file, then command line flags
    pub fn to_config(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::load(path)
                .with_context(|| format!("Failed to load configuration: {:?}", path))?,
            None => ScanConfig::default(),
        };

        if let Some(dir) = &self.templates {
            config.template_dir = dir.clone();
        }
        if let Some(dir) = &self.images {
            config.image_dir = dir.clone();
        }
        if let Some(file) = &self.output {
            config.output_file = file.clone();
        }
        if let Some(threshold) = self.threshold {
            config.template_config.threshold = threshold;
        }
        if self.verbose {
            config.visualization.verbose = true;
        }
        if let Some(dir) = &self.annotated_dir {
            config.visualization.annotated_dir = Some(dir.clone());
        }
        if let Some(path) = &self.palette {
            config.palette = Palette::load(path)?;
        }
        if let Some(binary) = &self.tesseract {
            config.ocr.tesseract_binary = binary.clone();
        }
        if let Some(lang) = &self.lang {
            config.ocr.language = Some(lang.clone());
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}
