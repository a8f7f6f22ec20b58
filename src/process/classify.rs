use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::rules::{SubsetFilter, FAQ_DETAIL_PATTERN, PAGE_PATH, PAGE_REFERRER, PAGE_TITLE};
use crate::table::Table;

static FAQ_DETAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(FAQ_DETAIL_PATTERN).expect("FAQ detail pattern is valid"));

/// Apply one subset filter to the full table, returning the matching rows.
///
/// Filters are independent: every subset is cut from the full table, rows may
/// land in several subsets or in none. A missing filter column is a
/// `SchemaMismatch`; zero matching rows is the caller's warning, not an error.
pub fn filter_subset(table: &Table, filter: SubsetFilter) -> Result<Table> {
    match filter {
        SubsetFilter::FaqDetailPath => {
            let idx = table.require_column(PAGE_PATH)?;
            Ok(table.filter_rows(|row| {
                row[idx]
                    .as_str()
                    .is_some_and(|path| FAQ_DETAIL_RE.is_match(path))
            }))
        }
        SubsetFilter::PathPrefix(prefix) => {
            let idx = table.require_column(PAGE_PATH)?;
            Ok(table.filter_rows(|row| row[idx].as_str().is_some_and(|p| p.starts_with(prefix))))
        }
        SubsetFilter::ReferrerPrefix(prefix) => {
            let idx = table.require_column(PAGE_REFERRER)?;
            Ok(table.filter_rows(|row| row[idx].as_str().is_some_and(|r| r.starts_with(prefix))))
        }
        SubsetFilter::TitleNotStartingWith(phrase) => {
            let idx = table.require_column(PAGE_TITLE)?;
            Ok(table.filter_rows(|row| {
                row[idx].as_str().map_or(true, |t| !t.starts_with(phrase))
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::table::Cell;

    fn table_with_paths(paths: &[&str]) -> Table {
        let mut t = Table::new(vec![PAGE_PATH.into()]);
        for p in paths {
            t.push_row(vec![Cell::text(*p)]);
        }
        t
    }

    #[test]
    fn detail_filter_matches_pattern_exactly() {
        let t = table_with_paths(&[
            "/lowv/faq/12-3",
            "/lowv/faq/12-3?from=top",
            "/lowv/faq/12-",
            "/lowv/faq/result?category=X",
            "/lowv/faq/1205-33",
        ]);
        let s = filter_subset(&t, SubsetFilter::FaqDetailPath).unwrap();
        let paths: Vec<_> = s.rows.iter().map(|r| r[0].as_str().unwrap()).collect();
        assert_eq!(paths, vec!["/lowv/faq/12-3", "/lowv/faq/1205-33"]);
    }

    #[test]
    fn prefix_filter_keeps_matching_rows_only() {
        let t = table_with_paths(&["/lowv/faq/result?category=X", "/lowv/faq/12-3"]);
        let s = filter_subset(&t, SubsetFilter::PathPrefix("/lowv/faq/result?category=")).unwrap();
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn title_exclusion_keeps_non_matching_titles() {
        let mut t = Table::new(vec![PAGE_TITLE.into()]);
        t.push_row(vec![Cell::text("よくあるご質問：解約について")]);
        t.push_row(vec![Cell::text("トップページ")]);
        let s = filter_subset(&t, SubsetFilter::TitleNotStartingWith("よくあるご質問")).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.rows[0][0], Cell::text("トップページ"));
    }

    #[test]
    fn missing_filter_column_is_schema_mismatch() {
        let t = Table::new(vec!["sessions".into()]);
        let err = filter_subset(&t, SubsetFilter::FaqDetailPath).unwrap_err();
        assert!(matches!(err, ReportError::SchemaMismatch { column } if column == PAGE_PATH));
    }

    #[test]
    fn zero_matches_yields_empty_subset() {
        let t = table_with_paths(&["/other"]);
        let s = filter_subset(&t, SubsetFilter::FaqDetailPath).unwrap();
        assert!(s.is_empty());
    }
}
