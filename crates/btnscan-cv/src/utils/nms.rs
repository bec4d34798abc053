//! Greedy non-maximum suppression over a correlation surface
//!
//! The best remaining score is taken, a template-sized window centred on it
//! is zeroed, and the search repeats until the best score no longer clears
//! the threshold. The window is centred on the match location rather than
//! bounding the matched box, so neighbours closer than half a template in
//! either direction are never reported.

use crate::error::ScanError;
use crate::Result;

/// Score stored for cells the correlation engine could not evaluate
pub const INVALID_SCORE: f32 = f32::MIN;

/// Row-major score surface, one cell per template placement
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMap {
    rows: usize,
    cols: usize,
    scores: Vec<f32>,
}

impl CorrelationMap {
    /// Wrap raw scores. Non-finite values become [`INVALID_SCORE`].
    pub fn new(rows: usize, cols: usize, mut scores: Vec<f32>) -> Result<Self> {
        if scores.len() != rows * cols {
            return Err(ScanError::Match(format!(
                "correlation map of {}x{} needs {} scores, got {}",
                rows,
                cols,
                rows * cols,
                scores.len()
            )));
        }
        for score in scores.iter_mut().filter(|s| !s.is_finite()) {
            *score = INVALID_SCORE;
        }
        Ok(Self { rows, cols, scores })
    }

    /// Map without placements, e.g. for a template larger than the image
    pub fn empty() -> Self {
        Self {
            rows: 0,
            cols: 0,
            scores: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.scores[row * self.cols + col])
    }

    /// Highest score and its `(row, col)`.
    ///
    /// Ties go to the first cell in row-major order, like OpenCV's `minMaxLoc`.
    pub fn max_loc(&self) -> Option<(usize, usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, &score) in self.scores.iter().enumerate() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((idx, score)),
            }
        }
        best.map(|(idx, score)| (idx / self.cols, idx % self.cols, score))
    }

    /// Zero rows `[row - half_height, row + half_height]` and columns
    /// `[col - half_width, col + half_width]`, clipped to the map
    pub fn zero_window(&mut self, row: usize, col: usize, half_height: usize, half_width: usize) {
        if self.is_empty() {
            return;
        }
        let top = row.saturating_sub(half_height);
        let bottom = (row + half_height + 1).min(self.rows);
        let left = col.saturating_sub(half_width);
        let right = (col + half_width + 1).min(self.cols);

        for r in top..bottom {
            let start = r * self.cols;
            self.scores[start + left..start + right].fill(0.0);
        }
    }
}

/// Location picked by the suppression loop, in map coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub row: usize,
    pub col: usize,
    pub score: f32,
}

/// Iterator over accepted peaks, best first
///
/// Owns the map it consumes; the scratch surface never outlives the run.
#[derive(Debug)]
pub struct Suppression {
    map: CorrelationMap,
    half_height: usize,
    half_width: usize,
    threshold: f64,
    exhausted: bool,
}

impl Suppression {
    /// Suppress with a window of the template's size.
    ///
    /// Negative thresholds are raised to zero: zeroed cells must never
    /// qualify again or the loop would not terminate.
    pub fn new(map: CorrelationMap, template_height: usize, template_width: usize, threshold: f64) -> Self {
        Self {
            map,
            half_height: template_height / 2,
            half_width: template_width / 2,
            threshold: threshold.max(0.0),
            exhausted: false,
        }
    }
}

impl Iterator for Suppression {
    type Item = Peak;

    fn next(&mut self) -> Option<Peak> {
        if self.exhausted {
            return None;
        }

        let Some((row, col, score)) = self.map.max_loc() else {
            self.exhausted = true;
            return None;
        };

        self.map.zero_window(row, col, self.half_height, self.half_width);

        if f64::from(score) > self.threshold {
            Some(Peak { row, col, score })
        } else {
            self.exhausted = true;
            None
        }
    }
}

/// Collect every peak of `map` above `threshold`
pub fn suppress(
    map: CorrelationMap,
    template_height: usize,
    template_width: usize,
    threshold: f64,
) -> Vec<Peak> {
    Suppression::new(map, template_height, template_width, threshold).collect()
}
