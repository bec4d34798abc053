//! Writes result sheets into an xlsx workbook

use anyhow::{Context, Result};
use btnscan_core::{ResultBook, ResultSheet};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;

const COLUMN_WIDTH: f64 = 16.0;

pub struct WorkbookRecorder {
    header_format: Format,
}

impl WorkbookRecorder {
    pub fn new() -> Self {
        Self {
            header_format: Format::new().set_bold(),
        }
    }

    /// One worksheet per result sheet, in order
    pub fn build(&self, book: &ResultBook) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        for sheet in book.iter() {
            self.write_sheet(&mut workbook, sheet)?;
        }
        Ok(workbook)
    }

    fn write_sheet(&self, workbook: &mut Workbook, sheet: &ResultSheet) -> Result<(), XlsxError> {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name())?;

        for cell in sheet.cells() {
            // Sheet cells are 1-based, the writer is 0-based
            let (row, col) = (cell.row - 1, cell.column - 1);
            if cell.is_header {
                worksheet.write_string_with_format(row, col, cell.value, &self.header_format)?;
            } else {
                worksheet.write_string(row, col, cell.value)?;
            }
        }

        let used_columns = sheet.columns().len() as u16 * 2;
        for col in 0..used_columns {
            worksheet.set_column_width(col, COLUMN_WIDTH)?;
        }
        Ok(())
    }

    /// Write the workbook, replacing any existing file
    pub fn save(&self, book: &ResultBook, path: &Path) -> Result<()> {
        let mut workbook = self.build(book).context("Failed to build workbook")?;
        workbook
            .save(path)
            .with_context(|| format!("Failed to save workbook: {:?}", path))?;
        log::info!("Results saved to {:?}", path);
        Ok(())
    }
}

impl Default for WorkbookRecorder {
    fn default() -> Self {
        Self::new()
    }
}
