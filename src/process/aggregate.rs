use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::rules::{reduction_for, Reduce, SESSIONS};
use crate::table::{Cell, Table};

/// Running reduction state for one column of one group.
enum Acc {
    Sum(f64),
    Mean { total: f64, count: usize },
    First(Option<Cell>),
}

impl Acc {
    fn new(rule: Reduce) -> Self {
        match rule {
            Reduce::Sum => Acc::Sum(0.0),
            Reduce::Mean => Acc::Mean {
                total: 0.0,
                count: 0,
            },
            Reduce::First => Acc::First(None),
        }
    }

    fn feed(&mut self, cell: &Cell) {
        match self {
            // Non-numeric cells contribute nothing; a mean divides by the
            // numeric count only, so missing data never drags toward zero.
            Acc::Sum(total) => {
                if let Some(n) = cell.as_number() {
                    *total += n;
                }
            }
            Acc::Mean { total, count } => {
                if let Some(n) = cell.as_number() {
                    *total += n;
                    *count += 1;
                }
            }
            Acc::First(slot) => {
                if slot.is_none() && !cell.is_empty() {
                    *slot = Some(cell.clone());
                }
            }
        }
    }

    fn finish(self) -> Cell {
        match self {
            Acc::Sum(total) => Cell::Number(total),
            Acc::Mean { count: 0, .. } => Cell::Text(String::new()),
            Acc::Mean { total, count } => Cell::Number(total / count as f64),
            Acc::First(slot) => slot.unwrap_or_else(|| Cell::Text(String::new())),
        }
    }
}

/// Collapse a subset to one row per distinct (primary, secondary) key pair.
///
/// Rows with an empty primary key are dropped first. Groups appear in
/// first-occurrence order while reducing, then the output is sorted
/// descending by the sessions column, stable on ties.
#[tracing::instrument(level = "debug", skip(table), fields(rows = table.len()))]
pub fn aggregate(table: &Table, primary: &str, secondary: &str) -> Result<Table> {
    let p_idx = table.require_column(primary)?;
    let s_idx = table.require_column(secondary)?;
    let sessions_idx = table.require_column(SESSIONS)?;

    let rules: Vec<Reduce> = table.columns.iter().map(|c| reduction_for(c)).collect();

    // Insertion-order grouping: the map only points into the ordered list.
    let mut order: Vec<(String, String)> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<Vec<Acc>> = Vec::new();

    for row in &table.rows {
        let p = row[p_idx].to_string();
        if p.is_empty() {
            continue;
        }
        let s = row[s_idx].to_string();
        let key = (p, s);
        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                order.push(key.clone());
                index.insert(key, groups.len());
                groups.push(rules.iter().map(|&r| Acc::new(r)).collect());
                groups.len() - 1
            }
        };
        for (acc, cell) in groups[slot].iter_mut().zip(row) {
            acc.feed(cell);
        }
    }
    debug!(groups = order.len(), "reduced to groups");

    let mut out = Table::new(table.columns.clone());
    for accs in groups {
        out.push_row(accs.into_iter().map(Acc::finish).collect());
    }

    // Descending by sessions; sort_by is stable so ties keep group order.
    out.rows.sort_by(|a, b| {
        let av = a[sessions_idx].as_number().unwrap_or(f64::NEG_INFINITY);
        let bv = b[sessions_idx].as_number().unwrap_or(f64::NEG_INFINITY);
        bv.partial_cmp(&av).unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(out)
}
