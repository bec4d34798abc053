//! In-memory result sheets, one per scanned image.
//!
//! Template `i` owns the 1-based column pair `2i + 1` (upper text) and
//! `2i + 2` (lower text). Row 1 holds the template name, matches follow from
//! row 2 downwards.

pub mod book;

pub use book::ResultBook;

use serde::{Deserialize, Serialize};

/// Default number of characters kept from an image name.
pub const DEFAULT_NAME_LENGTH: usize = 15;

/// Longest worksheet name spreadsheet applications accept.
pub const MAX_NAME_LENGTH: usize = 31;

/// Characters a worksheet name may not contain.
const FORBIDDEN_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Text recognized on the two halves of one matched button.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPair {
    pub upper: String,
    pub lower: String,
}

impl TextPair {
    pub fn new(upper: impl Into<String>, lower: impl Into<String>) -> Self {
        Self {
            upper: upper.into(),
            lower: lower.into(),
        }
    }
}

/// One template's column pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateColumn {
    pub header: String,
    pub rows: Vec<TextPair>,
}

impl TemplateColumn {
    pub fn push(&mut self, text: TextPair) {
        self.rows.push(text);
    }
}

/// A single cell of a sheet, addressed 1-based like a spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell<'a> {
    pub row: u32,
    pub column: u16,
    pub value: &'a str,
    pub is_header: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSheet {
    name: String,
    columns: Vec<TemplateColumn>,
}

impl ResultSheet {
    /// Create a sheet for an image, keeping at most `name_length` characters.
    pub fn new(image_name: &str, name_length: usize) -> Self {
        Self {
            name: sheet_name(image_name, name_length),
            columns: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    /// Start the column pair of the next template and return it.
    pub fn begin_template(&mut self, header: &str) -> &mut TemplateColumn {
        self.columns.push(TemplateColumn {
            header: header.to_string(),
            rows: Vec::new(),
        });
        let last = self.columns.len() - 1;
        &mut self.columns[last]
    }

    pub fn columns(&self) -> &[TemplateColumn] {
        &self.columns
    }

    /// Column of `header` by template name, if the template was processed.
    pub fn column(&self, header: &str) -> Option<&TemplateColumn> {
        self.columns.iter().find(|c| c.header == header)
    }

    /// 1-based title column of the template at `index`.
    pub fn title_column(index: usize) -> u16 {
        (index * 2 + 1) as u16
    }

    /// Total number of recorded matches over all templates.
    pub fn match_count(&self) -> usize {
        self.columns.iter().map(|c| c.rows.len()).sum()
    }

    /// Every written cell, headers first within each column pair.
    pub fn cells(&self) -> Vec<Cell<'_>> {
        let mut cells = Vec::new();
        for (index, column) in self.columns.iter().enumerate() {
            let title = Self::title_column(index);
            cells.push(Cell {
                row: 1,
                column: title,
                value: &column.header,
                is_header: true,
            });
            for (offset, text) in column.rows.iter().enumerate() {
                let row = offset as u32 + 2;
                cells.push(Cell {
                    row,
                    column: title,
                    value: &text.upper,
                    is_header: false,
                });
                cells.push(Cell {
                    row,
                    column: title + 1,
                    value: &text.lower,
                    is_header: false,
                });
            }
        }
        cells
    }
}

/// Derive a worksheet name from an image name.
///
/// Keeps the first `max_len` characters (never more than
/// [`MAX_NAME_LENGTH`]), replaces characters spreadsheets
/// reject with `_` and strips leading/trailing apostrophes.
pub fn sheet_name(image_name: &str, max_len: usize) -> String {
    let truncated: String = image_name
        .chars()
        .take(max_len.clamp(1, MAX_NAME_LENGTH))
        .map(|c| if FORBIDDEN_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = truncated.trim_matches('\'');
    if trimmed.is_empty() {
        "Sheet".to_string()
    } else {
        trimmed.to_string()
    }
}
