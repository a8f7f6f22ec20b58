use crate::rules::{BOUNCE_RATE, PAGE_TITLE, ROUND_COLUMNS, TITLE_BRANDING_SUFFIX};
use crate::table::{Cell, Table};

/// Remove the site branding suffix from page titles. Tolerant of titles that
/// never carried it and of a missing title column; idempotent.
pub fn strip_title_suffix(table: &mut Table) {
    table.map_column(PAGE_TITLE, |cell| match cell.as_str() {
        Some(title) => Cell::text(
            title
                .strip_suffix(TITLE_BRANDING_SUFFIX)
                .unwrap_or(title)
                .trim_end(),
        ),
        None => cell.clone(),
    });
}

/// Move `front` columns to the front in the given order and drop the `drop`
/// list. A projection, not data loss: every column not named in either list
/// keeps its original relative order behind the front block. Names absent
/// from the table are ignored.
pub fn reorder_columns(table: &Table, front: &[&str], drop: &[&str]) -> Table {
    let mut indices: Vec<usize> = front
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();
    for (i, name) in table.columns.iter().enumerate() {
        if !indices.contains(&i) && !drop.contains(&name.as_str()) {
            indices.push(i);
        }
    }
    table.project(&indices)
}

/// Render the bounce-rate fraction as a `"12.34%"` string.
pub fn bounce_rate_percent(table: &mut Table) {
    table.map_column(BOUNCE_RATE, |cell| match cell.as_number() {
        Some(fraction) => Cell::text(format!("{:.2}%", fraction * 100.0)),
        None => cell.clone(),
    });
}

/// Round the per-session float metrics to two decimals.
pub fn round_float_columns(table: &mut Table) {
    for column in ROUND_COLUMNS {
        table.map_column(column, |cell| match cell.as_number() {
            Some(n) => Cell::Number((n * 100.0).round() / 100.0),
            None => cell.clone(),
        });
    }
}
