use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::error::Result;
use crate::table::{Cell, Table};

/// Excel's hard limit on worksheet name length.
pub const MAX_SHEET_NAME: usize = 31;

/// Truncate a raw sheet name to the Excel limit, on a char boundary.
pub fn sheet_name(raw: &str) -> String {
    raw.chars().take(MAX_SHEET_NAME).collect()
}

/// Ordered sheet-name → table mapping with collision-suffixed names.
#[derive(Debug, Default)]
pub struct SheetBook {
    sheets: Vec<(String, Table)>,
}

impl SheetBook {
    pub fn new() -> Self {
        SheetBook::default()
    }

    /// Add a sheet. Duplicate names get an incrementing `_N` suffix,
    /// re-truncated so the suffixed name still fits the limit.
    pub fn insert(&mut self, raw_name: &str, table: Table) {
        let base = sheet_name(raw_name);
        let mut name = base.clone();
        let mut counter = 0;
        while self.sheets.iter().any(|(n, _)| *n == name) {
            counter += 1;
            let suffix = format!("_{}", counter);
            let keep = MAX_SHEET_NAME.saturating_sub(suffix.len());
            let head: String = base.chars().take(keep).collect();
            name = format!("{}{}", head, suffix);
        }
        self.sheets.push((name, table));
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.sheets.iter().map(|(n, t)| (n.as_str(), t))
    }
}

/// Write the book to an `.xlsx` workbook, one worksheet per sheet.
///
/// Collaborator for the CLI; the pipeline itself never touches output files.
pub fn write_workbook(book: &SheetBook, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_fmt = Format::new().set_bold();

    for (name, table) in book.iter() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;

        for (col, column) in table.columns.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, column, &header_fmt)?;
        }
        for (r, row) in table.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (row_idx, col_idx) = ((r + 1) as u32, c as u16);
                match cell {
                    Cell::Text(s) => sheet.write_string(row_idx, col_idx, s)?,
                    Cell::Number(n) => sheet.write_number(row_idx, col_idx, *n)?,
                };
            }
        }
    }

    workbook.save(path)?;
    info!(path = %path.display(), sheets = book.len(), "workbook written");
    Ok(())
}
