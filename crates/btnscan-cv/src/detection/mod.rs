//! High-level scanning module

pub mod config;
pub mod detector;
pub mod screen;

pub use config::{ScanConfig, SheetConfig, VisualizationConfig};
pub use detector::{ScanOutcome, ScanStats, ScreenScanner};
pub use screen::ScreenImage;
