use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::error::{ReportError, Result};
use crate::rules::HEADER_SENTINEL;
use crate::table::{Cell, Table};

/// Number of preamble lines GA puts before the header row.
const PREAMBLE_LINES: usize = 6;
/// Boilerplate rows (units/description) immediately after the header.
const BOILERPLATE_ROWS: usize = 1;
/// Preamble + header; anything shorter cannot be a report.
const MIN_LINES: usize = PREAMBLE_LINES + 1;

/// Parse one uploaded report into an all-text [`Table`].
///
/// The header row is found by scanning for a line whose first CSV field is
/// the path column name; GA exports occasionally grow or shrink the preamble,
/// so the scan is preferred over the documented fixed offset. When no
/// sentinel line exists the fixed offset (line 7) is used. The single
/// boilerplate row after the header is dropped. If the primary parse fails, a
/// direct parse-with-skip of the raw tail is attempted once before giving up.
#[tracing::instrument(level = "debug", skip(text))]
pub fn load_report(text: &str) -> Result<Table> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < MIN_LINES {
        return Err(ReportError::MalformedInput {
            reason: format!("expected at least {} lines, got {}", MIN_LINES, lines.len()),
        });
    }

    let header_idx = find_header_line(&lines).unwrap_or(PREAMBLE_LINES);
    debug!(header_idx, "header row located");

    match parse_lines(&lines, header_idx) {
        Ok(table) => Ok(table),
        Err(err) => {
            warn!(%err, "primary load failed, retrying with fixed-offset skip");
            parse_lines(&lines, PREAMBLE_LINES).map_err(|e| ReportError::MalformedInput {
                reason: format!("both load strategies failed: {}", e),
            })
        }
    }
}

/// Line whose first comma-separated field equals the sentinel column name.
fn find_header_line(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|line| {
        let first = line.split(',').next().unwrap_or("");
        first.trim().trim_matches('"') == HEADER_SENTINEL
    })
}

fn parse_lines(lines: &[&str], header_idx: usize) -> Result<Table> {
    if lines.len() <= header_idx {
        return Err(ReportError::MalformedInput {
            reason: format!("no header line at index {}", header_idx),
        });
    }

    // Header plus everything after the boilerplate row.
    let data_start = header_idx + 1 + BOILERPLATE_ROWS;
    let mut content = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    content.push_str(lines[header_idx]);
    content.push('\n');
    for line in lines.iter().skip(data_start) {
        content.push_str(line);
        content.push('\n');
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = rdr.records();
    let header = match records.next() {
        Some(rec) => rec?,
        None => {
            return Err(ReportError::MalformedInput {
                reason: "empty header row".into(),
            })
        }
    };
    let columns: Vec<String> = header.iter().map(|s| s.trim().to_string()).collect();
    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(ReportError::MalformedInput {
            reason: "header row has no column names".into(),
        });
    }

    let mut table = Table::new(columns);
    for (idx, result) in records.enumerate() {
        let record = result?;
        if record.len() != table.columns.len() {
            // GA appends grand-total rows with fewer fields; skip, keep going.
            debug!(
                record = idx,
                fields = record.len(),
                expected = table.columns.len(),
                "skipping record with mismatched field count"
            );
            continue;
        }
        table.push_row(record.iter().map(Cell::text).collect());
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# ----------------------------------------\n\
# All web site data\n\
# FAQ access report\n\
# 20240601-20240630\n\
# ----------------------------------------\n\
\n\
pagePathPlusQueryString,pageTitle,sessions\n\
Path + query,Title,Count of sessions\n\
/lowv/faq/12-3,FAQ page,5\n\
/lowv/faq/result?category=X,Search,3\n";

    #[test]
    fn loads_header_and_data_rows() {
        let t = load_report(SAMPLE).unwrap();
        assert_eq!(
            t.columns,
            vec!["pagePathPlusQueryString", "pageTitle", "sessions"]
        );
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows[0][0], Cell::text("/lowv/faq/12-3"));
        // boilerplate row after the header is gone
        assert!(t.rows.iter().all(|r| r[0].as_str() != Some("Path + query")));
    }

    #[test]
    fn column_count_matches_header_field_count() {
        let t = load_report(SAMPLE).unwrap();
        assert_eq!(t.columns.len(), 3);
        assert!(t.rows.iter().all(|r| r.len() == 3));
    }

    #[test]
    fn too_few_lines_is_malformed() {
        let err = load_report("a\nb\nc\n").unwrap_err();
        assert!(matches!(err, ReportError::MalformedInput { .. }));
    }

    #[test]
    fn sentinel_scan_tolerates_shifted_preamble() {
        // One extra preamble line; the fixed offset would point past the header.
        let shifted = format!("# extra\n{}", SAMPLE);
        let t = load_report(&shifted).unwrap();
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn fixed_offset_used_when_sentinel_absent() {
        let no_sentinel = "\
l1\nl2\nl3\nl4\nl5\nl6\n\
colA,colB\n\
units,units\n\
1,2\n";
        let t = load_report(no_sentinel).unwrap();
        assert_eq!(t.columns, vec!["colA", "colB"]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn short_record_is_skipped_not_fatal() {
        let sample = format!("{}grand total\n", SAMPLE);
        let t = load_report(&sample).unwrap();
        assert_eq!(t.len(), 2);
    }
}
