//! Domain types shared by the scanner: display palette and result sheets.

pub mod palette;
pub mod sheet;

pub use palette::{Palette, Rgb};
pub use sheet::{ResultBook, ResultSheet, TemplateColumn, TextPair};
