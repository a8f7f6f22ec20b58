//! External schema contract and per-report-kind processing rules.
//!
//! The GA export column names and the site-specific path/title literals are
//! fixed contract values, not configuration the pipeline invents. Each report
//! kind's subset list, column ordering and drop list is data here, so the
//! behavior differences between the upload variants stay visible and each is
//! testable on its own.

/// Dimension columns from the GA export.
pub const PAGE_PATH: &str = "pagePathPlusQueryString";
pub const PAGE_TITLE: &str = "pageTitle";
pub const PAGE_REFERRER: &str = "pageReferrer";

/// Metric columns from the GA export.
pub const IMPRESSIONS: &str = "impressions";
pub const SESSIONS: &str = "sessions";
pub const TOTAL_USERS: &str = "totalUsers";
pub const NEW_USERS: &str = "newUsers";
pub const VIEWS_PER_SESSION: &str = "screenPageViewsPerSession";
pub const BOUNCE_RATE: &str = "bounceRate";
pub const EXITS: &str = "exits";
pub const AVG_SESSION_DURATION: &str = "averageSessionDuration";

/// Columns the pipeline derives from the path query string.
pub const CATEGORY: &str = "category";
pub const KEYWORD: &str = "keyword";

/// FAQ detail pages: `/lowv/faq/<category id>-<article id>`, nothing else.
pub const FAQ_DETAIL_PATTERN: &str = r"^/lowv/faq/\d+-\d+$";
/// Search-result paths, matched on the still-encoded prefix.
pub const CATEGORY_RESULT_PREFIX: &str = "/lowv/faq/result?category=";
pub const KEYWORD_RESULT_PREFIX: &str = "/lowv/faq/result?keyword=";
/// Fully-qualified FAQ URL, for referrer-based classification.
pub const FAQ_SITE_URL_PREFIX: &str = "https://support.example.jp/lowv/faq/";
/// FAQ page titles start with this; generic pages do not.
pub const FAQ_TITLE_SENTINEL: &str = "よくあるご質問";
/// Site branding appended to every page title, stripped for display.
pub const TITLE_BRANDING_SUFFIX: &str = "｜お客様サポート";

/// The header row is recognized by this cell in the first field.
pub const HEADER_SENTINEL: &str = PAGE_PATH;

/// Which upload variant a file is, from its filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Report1,
    Report2,
    Report4,
    Unknown,
}

impl ReportKind {
    pub fn from_file_name(name: &str) -> Self {
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        if base.starts_with("report1") {
            ReportKind::Report1
        } else if base.starts_with("report2") {
            ReportKind::Report2
        } else if base.starts_with("report4") {
            ReportKind::Report4
        } else {
            ReportKind::Unknown
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReportKind::Report1 => "report1",
            ReportKind::Report2 => "report2",
            ReportKind::Report4 => "report4",
            ReportKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Row predicate for one subset. Each subset filters the full table
/// independently; the filters do not partition.
#[derive(Debug, Clone, Copy)]
pub enum SubsetFilter {
    /// Exact regex match of the path against [`FAQ_DETAIL_PATTERN`].
    FaqDetailPath,
    /// Literal prefix match on the (still-encoded) path column.
    PathPrefix(&'static str),
    /// Literal prefix match on the referrer column.
    ReferrerPrefix(&'static str),
    /// Keeps rows whose title does NOT start with the given phrase.
    TitleNotStartingWith(&'static str),
}

/// Grouping keys for an aggregated subset.
#[derive(Debug, Clone, Copy)]
pub struct AggregateKeys {
    pub primary: &'static str,
    pub secondary: &'static str,
}

/// One output subset of a report kind.
#[derive(Debug, Clone, Copy)]
pub struct SubsetRule {
    pub name: &'static str,
    pub filter: SubsetFilter,
    /// Extract `category`/`keyword` query params from the path into new columns.
    pub extract_params: bool,
    /// Group + reduce after extraction, keyed as given.
    pub aggregate: Option<AggregateKeys>,
    /// Columns moved to the front of the output, in this order.
    pub front_columns: &'static [&'static str],
    /// Columns removed from the output for this subset.
    pub drop_columns: &'static [&'static str],
}

static REPORT1_RULES: &[SubsetRule] = &[
    SubsetRule {
        name: "detail",
        filter: SubsetFilter::FaqDetailPath,
        extract_params: false,
        aggregate: None,
        front_columns: &[PAGE_PATH, PAGE_TITLE],
        drop_columns: &[],
    },
    SubsetRule {
        name: "category",
        filter: SubsetFilter::PathPrefix(CATEGORY_RESULT_PREFIX),
        extract_params: true,
        aggregate: Some(AggregateKeys {
            primary: CATEGORY,
            secondary: KEYWORD,
        }),
        front_columns: &[CATEGORY, KEYWORD, PAGE_PATH],
        drop_columns: &[],
    },
    SubsetRule {
        name: "keyword",
        filter: SubsetFilter::PathPrefix(KEYWORD_RESULT_PREFIX),
        extract_params: true,
        aggregate: Some(AggregateKeys {
            primary: KEYWORD,
            secondary: CATEGORY,
        }),
        front_columns: &[KEYWORD, CATEGORY, PAGE_PATH],
        drop_columns: &[],
    },
];

// report2 is the same upload re-exported with the referrer dimension, which
// the original drops from every sheet. The drop lists differ between the
// historical script variants; these are kept as data, not branches.
static REPORT2_RULES: &[SubsetRule] = &[
    SubsetRule {
        name: "detail",
        filter: SubsetFilter::FaqDetailPath,
        extract_params: false,
        aggregate: None,
        front_columns: &[PAGE_PATH, PAGE_TITLE],
        drop_columns: &[PAGE_REFERRER],
    },
    SubsetRule {
        name: "category",
        filter: SubsetFilter::PathPrefix(CATEGORY_RESULT_PREFIX),
        extract_params: true,
        aggregate: Some(AggregateKeys {
            primary: CATEGORY,
            secondary: KEYWORD,
        }),
        front_columns: &[CATEGORY, KEYWORD, PAGE_PATH],
        drop_columns: &[PAGE_REFERRER, IMPRESSIONS],
    },
    SubsetRule {
        name: "keyword",
        filter: SubsetFilter::PathPrefix(KEYWORD_RESULT_PREFIX),
        extract_params: true,
        aggregate: Some(AggregateKeys {
            primary: KEYWORD,
            secondary: CATEGORY,
        }),
        front_columns: &[KEYWORD, CATEGORY, PAGE_PATH],
        drop_columns: &[PAGE_REFERRER, IMPRESSIONS],
    },
];

static REPORT4_RULES: &[SubsetRule] = &[
    SubsetRule {
        name: "faq",
        filter: SubsetFilter::ReferrerPrefix(FAQ_SITE_URL_PREFIX),
        extract_params: false,
        aggregate: None,
        front_columns: &[PAGE_REFERRER, PAGE_PATH, PAGE_TITLE],
        drop_columns: &[],
    },
    SubsetRule {
        name: "pages",
        filter: SubsetFilter::TitleNotStartingWith(FAQ_TITLE_SENTINEL),
        extract_params: false,
        aggregate: None,
        front_columns: &[PAGE_TITLE, PAGE_PATH],
        drop_columns: &[],
    },
];

/// The subset rules for a kind. `Unknown` has none.
pub fn kind_rules(kind: ReportKind) -> &'static [SubsetRule] {
    match kind {
        ReportKind::Report1 => REPORT1_RULES,
        ReportKind::Report2 => REPORT2_RULES,
        ReportKind::Report4 => REPORT4_RULES,
        ReportKind::Unknown => &[],
    }
}

/// How a metric column is reduced when rows collapse into one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduce {
    Sum,
    Mean,
    /// First non-empty value wins; used for descriptive columns.
    First,
}

const SUM_COLUMNS: &[&str] = &[IMPRESSIONS, SESSIONS, TOTAL_USERS, NEW_USERS, EXITS];
const MEAN_COLUMNS: &[&str] = &[BOUNCE_RATE, VIEWS_PER_SESSION, AVG_SESSION_DURATION];

pub fn reduction_for(column: &str) -> Reduce {
    if SUM_COLUMNS.contains(&column) {
        Reduce::Sum
    } else if MEAN_COLUMNS.contains(&column) {
        Reduce::Mean
    } else {
        Reduce::First
    }
}

/// Float columns rounded to two decimals for display.
pub const ROUND_COLUMNS: &[&str] = &[VIEWS_PER_SESSION, AVG_SESSION_DURATION];
