pub mod data;

use serde::{Deserialize, Serialize};

/// Display colour as `(r, g, b)`.
pub type Rgb = (u8, u8, u8);

/// Colours used to tell templates apart in the annotated preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    pub colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colour for template `index` out of `count` templates.
    ///
    /// Templates are spread evenly over the palette while there are fewer
    /// templates than colours, and wrap around once they outnumber them.
    /// An empty palette falls back to white.
    pub fn color_for(&self, index: usize, count: usize) -> Rgb {
        if self.colors.is_empty() {
            return (255, 255, 255);
        }
        let stride = (self.colors.len() / count.max(1)).max(1);
        self.colors[(index * stride) % self.colors.len()]
    }

    /// Assign a colour to each of `count` templates, in order.
    pub fn assign(&self, count: usize) -> Vec<Rgb> {
        (0..count).map(|i| self.color_for(i, count)).collect()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(vec![
            (255, 0, 0),
            (255, 120, 0),
            (255, 220, 0),
            (0, 255, 0),
            (0, 180, 255),
            (180, 0, 255),
        ])
    }
}
