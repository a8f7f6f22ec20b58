use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::rules::{CATEGORY, KEYWORD, PAGE_PATH};
use crate::table::{Cell, Table};

/// Base for parsing site-relative paths; only the query string is read back.
static DUMMY_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("https://localhost/").expect("dummy base URL is valid"));

static TRAILING_PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]page=\d+$").expect("page trim pattern is valid"));

/// First value of the named query parameter, or `""`.
///
/// Never fails: unparsable input, absent parameter and empty input all come
/// back as the empty string. Parameter order in the query is irrelevant.
pub fn query_param(url: &str, name: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => match DUMMY_BASE.join(url) {
            Ok(u) => u,
            Err(_) => return String::new(),
        },
    };
    parsed
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// Strip a trailing pagination parameter from a display string.
///
/// Display-oriented category/keyword names are cut from raw query text and
/// can carry `&page=2` (or `?page=2`) from result-page navigation. This trim
/// is deliberately separate from [`query_param`] extraction.
pub fn trim_page_param(s: &str) -> String {
    TRAILING_PAGE_RE.replace(s, "").into_owned()
}

/// Append `category` and `keyword` columns extracted from the path column.
///
/// Missing path column leaves the table untouched; per-row extraction
/// failures degrade to empty strings.
pub fn extract_param_columns(table: &mut Table) {
    let Some(idx) = table.column_index(PAGE_PATH) else {
        return;
    };
    let mut categories = Vec::with_capacity(table.len());
    let mut keywords = Vec::with_capacity(table.len());
    for row in &table.rows {
        let path = row[idx].as_str().unwrap_or("");
        categories.push(Cell::Text(trim_page_param(&query_param(path, CATEGORY))));
        keywords.push(Cell::Text(trim_page_param(&query_param(path, KEYWORD))));
    }
    table.push_column(CATEGORY, categories);
    table.push_column(KEYWORD, keywords);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_named_params_independent_of_order() {
        let url = "/lowv/faq/result?category=Billing&keyword=refund&page=2";
        assert_eq!(query_param(url, "category"), "Billing");
        assert_eq!(query_param(url, "keyword"), "refund");

        let reordered = "/lowv/faq/result?keyword=refund&page=2&category=Billing";
        assert_eq!(query_param(reordered, "category"), "Billing");
        assert_eq!(query_param(reordered, "keyword"), "refund");
    }

    #[test]
    fn absent_param_and_empty_input_give_empty_string() {
        assert_eq!(query_param("/lowv/faq/result?category=X", "keyword"), "");
        assert_eq!(query_param("", "category"), "");
        assert_eq!(query_param("/lowv/faq/12-3", "category"), "");
    }

    #[test]
    fn absolute_urls_parse_too() {
        assert_eq!(
            query_param("https://support.example.jp/lowv/faq/result?keyword=解約", "keyword"),
            "解約"
        );
    }

    #[test]
    fn first_value_wins_on_duplicates() {
        assert_eq!(query_param("/r?category=A&category=B", "category"), "A");
    }

    #[test]
    fn trim_strips_trailing_page_only() {
        assert_eq!(trim_page_param("Billing&page=2"), "Billing");
        assert_eq!(trim_page_param("refund?page=10"), "refund");
        assert_eq!(trim_page_param("page=2&Billing"), "page=2&Billing");
        assert_eq!(trim_page_param("Billing"), "Billing");
    }

    #[test]
    fn extract_appends_both_columns() {
        let mut t = Table::new(vec![PAGE_PATH.into()]);
        t.push_row(vec![Cell::text("/lowv/faq/result?category=X&keyword=Y")]);
        t.push_row(vec![Cell::text("/lowv/faq/result?category=Z&page=3")]);
        extract_param_columns(&mut t);
        assert_eq!(t.columns, vec![PAGE_PATH, CATEGORY, KEYWORD]);
        assert_eq!(t.rows[0][1], Cell::text("X"));
        assert_eq!(t.rows[0][2], Cell::text("Y"));
        assert_eq!(t.rows[1][1], Cell::text("Z"));
        assert_eq!(t.rows[1][2], Cell::text(""));
    }
}
