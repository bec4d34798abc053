//! Bounding boxes and match candidates
//!
//! Geometry of accepted matches in image coordinates.

use btnscan_core::Rgb;
use opencv::core::{Rect, Scalar};
use serde::{Deserialize, Serialize};

/// Axis-aligned box in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Convert to OpenCV Rect
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    /// Clip to `[0, width) x [0, height)`
    pub fn clipped(&self, width: i32, height: i32) -> BBox {
        let x1 = self.x.clamp(0, width);
        let y1 = self.y.clamp(0, height);
        let x2 = (self.x + self.width).clamp(0, width);
        let y2 = (self.y + self.height).clamp(0, height);
        BBox::new(x1, y1, x2 - x1, y2 - y1)
    }
}

/// A template location accepted by the suppression loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Top row of the matched window
    pub row: i32,
    /// Left column of the matched window
    pub col: i32,
    pub score: f32,
    /// Template-sized window at (`col`, `row`), clipped to the image
    pub bbox: BBox,
}

impl MatchCandidate {
    pub fn new(
        row: i32,
        col: i32,
        score: f32,
        template_size: (i32, i32),
        image_size: (i32, i32),
    ) -> Self {
        let (width, height) = template_size;
        let bbox = BBox::new(col, row, width, height).clipped(image_size.0, image_size.1);
        Self { row, col, score, bbox }
    }
}

/// OpenCV colour scalar (BGR order) for an RGB colour
pub fn bgr_scalar(color: Rgb) -> Scalar {
    Scalar::new(color.2 as f64, color.1 as f64, color.0 as f64, 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_box_is_clipped_to_image() {
        let candidate = MatchCandidate::new(95, 90, 0.9, (20, 10), (100, 100));
        assert_eq!(candidate.bbox, BBox::new(90, 95, 10, 5));
    }

    #[test]
    fn test_bgr_scalar_swaps_channels() {
        let scalar = bgr_scalar((10, 20, 30));
        assert_eq!(scalar.0[0], 30.0);
        assert_eq!(scalar.0[2], 10.0);
    }
}
