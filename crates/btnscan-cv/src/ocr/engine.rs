//! Tesseract command line engine
//!
//! Regions are PNG-encoded and streamed to `tesseract stdin stdout`, so no
//! temporary files are needed and no native library is linked.

use super::{OcrConfig, RecognitionProfile};
use crate::error::ScanError;
use crate::traits::TextRecognizer;
use crate::Result;
use image::{ImageFormat, RgbImage};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: Option<String>,
}

impl TesseractEngine {
    pub fn new<P: AsRef<Path>>(binary: P) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
            language: None,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            binary: config.tesseract_binary.clone(),
            language: config.language.clone(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// First line of `tesseract --version`; fails if the engine cannot be run
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map_err(|e| {
                ScanError::Configuration(format!("cannot run OCR engine {:?}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            return Err(ScanError::Configuration(format!(
                "OCR engine {:?} exited with {}",
                self.binary, output.status
            )));
        }

        // Older releases print the banner on stderr
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    /// Command line arguments for one recognition
    pub fn args(&self, profile: &RecognitionProfile) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "--psm".to_string(),
            profile.page_segmentation.to_string(),
        ];
        if let Some(language) = &self.language {
            args.push("-l".to_string());
            args.push(language.clone());
        }
        args.push("-c".to_string());
        args.push(format!("tessedit_char_whitelist={}", profile.whitelist));
        args
    }
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&self, region: &RgbImage, profile: &RecognitionProfile) -> Result<String> {
        let mut png = Vec::new();
        region.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut child = Command::new(&self.binary)
            .args(self.args(profile))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ScanError::Recognition(format!("cannot start {:?}: {}", self.binary, e)))?;

        // The engine may exit before reading all of stdin; reap it either way
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(ScanError::Recognition(format!(
                "{:?} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        written.map_err(|e| {
            ScanError::Recognition(format!("cannot send region to {:?}: {}", self.binary, e))
        })?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::from_config(&OcrConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_for_sparse_uppercase() {
        let engine = TesseractEngine::new("tesseract");
        let args = engine.args(&RecognitionProfile::sparse("AB"));
        assert_eq!(
            args,
            vec!["stdin", "stdout", "--psm", "11", "-c", "tessedit_char_whitelist=AB"]
        );
    }

    #[test]
    fn test_args_with_language() {
        let engine = TesseractEngine::new("tesseract").with_language("eng");
        let args = engine.args(&RecognitionProfile::uppercase());
        assert_eq!(&args[4..6], &["-l".to_string(), "eng".to_string()]);
    }

    #[test]
    fn test_missing_binary() {
        let engine = TesseractEngine::new("/nonexistent/tesseract-binary");
        assert!(matches!(engine.version(), Err(ScanError::Configuration(_))));

        let region = RgbImage::new(4, 4);
        let err = engine
            .recognize(&region, &RecognitionProfile::uppercase())
            .unwrap_err();
        assert!(matches!(err, ScanError::Recognition(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_engine_is_a_recognition_error() {
        // Exits without reading stdin
        let engine = TesseractEngine::new("/bin/false");
        let region = RgbImage::new(256, 256);
        let err = engine
            .recognize(&region, &RecognitionProfile::uppercase())
            .unwrap_err();
        assert!(matches!(err, ScanError::Recognition(_)), "got {:?}", err);
    }
}
