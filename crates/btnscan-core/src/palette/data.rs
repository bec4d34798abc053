use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{Palette, Rgb};

impl Palette {
    /// Load a palette from a text file with one `R,G,B` colour per line.
    ///
    /// Blank lines and lines starting with `#` are ignored. Lines that do not
    /// have three components are skipped with a warning; components that are
    /// not valid `u8` values are an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Palette> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open palette: {:?}", path))?;
        let palette = Self::parse(BufReader::new(file))
            .with_context(|| format!("Failed to parse palette: {:?}", path))?;

        log::info!("Loaded {} colours from {:?}", palette.len(), path);
        Ok(palette)
    }

    pub fn parse<R: BufRead>(reader: R) -> Result<Palette> {
        let mut colors = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split(',').map(|s| s.trim()).collect();
            if parts.len() != 3 {
                log::warn!(
                    "Invalid colour at line {}: '{}' (expected R,G,B)",
                    line_num + 1,
                    line
                );
                continue;
            }

            colors.push(parse_rgb(&parts, line_num + 1)?);
        }

        Ok(Palette::new(colors))
    }
}

fn parse_rgb(parts: &[&str], line: usize) -> Result<Rgb> {
    let channel = |idx: usize, label: &str| {
        parts[idx]
            .parse::<u8>()
            .with_context(|| format!("Invalid {} value at line {}: '{}'", label, line, parts[idx]))
    };
    Ok((channel(0, "red")?, channel(1, "green")?, channel(2, "blue")?))
}
