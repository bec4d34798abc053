use super::{ResultSheet, MAX_NAME_LENGTH};
use std::collections::HashSet;

/// Ordered collection of result sheets with unique names.
#[derive(Debug, Clone, Default)]
pub struct ResultBook {
    sheets: Vec<ResultSheet>,
    names: HashSet<String>,
}

impl ResultBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet, renaming it with a ` (n)` suffix if its name is taken.
    ///
    /// Names are compared case-insensitively, as spreadsheet applications do.
    /// The name is shortened as needed so the suffixed name still fits in
    /// [`MAX_NAME_LENGTH`] characters.
    pub fn push(&mut self, mut sheet: ResultSheet) {
        let base = sheet.name().to_string();
        let mut candidate = base.clone();
        let mut n = 2;
        while self.names.contains(&candidate.to_lowercase()) {
            let suffix = format!(" ({})", n);
            let keep = MAX_NAME_LENGTH.saturating_sub(suffix.chars().count());
            let stem: String = base.chars().take(keep).collect();
            candidate = format!("{}{}", stem, suffix);
            n += 1;
        }
        if candidate != base {
            log::warn!("Sheet name '{}' already used, renamed to '{}'", base, candidate);
            sheet.rename(candidate.clone());
        }
        self.names.insert(candidate.to_lowercase());
        self.sheets.push(sheet);
    }

    pub fn sheets(&self) -> &[ResultSheet] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultSheet> {
        self.sheets.iter()
    }
}
