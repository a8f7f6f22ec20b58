// src/process/mod.rs
pub mod aggregate;
pub mod classify;
pub mod decode;
pub mod format;
pub mod load;
pub mod params;

use tracing::{debug, info, warn};

use crate::error::{Result, Warning};
use crate::rules::{kind_rules, ReportKind, PAGE_PATH, PAGE_REFERRER};
use crate::table::Table;

/// Everything one successfully processed file produces: the labeled subsets
/// in rule order, plus any non-fatal warnings gathered along the way.
#[derive(Debug, Default)]
pub struct ReportOutput {
    pub kind: Option<ReportKind>,
    pub subsets: Vec<(String, Table)>,
    pub warnings: Vec<Warning>,
}

/// Run the full pipeline for one uploaded file.
///
/// Loader → decoder → per-rule classify → param extraction → aggregation →
/// formatting. Unknown report kinds yield an empty output with a warning.
/// Any fatal error discards every partial subset; nothing half-done escapes.
#[tracing::instrument(level = "info", skip(file_name, text), fields(file = %file_name))]
pub fn process_report(file_name: &str, text: &str) -> Result<ReportOutput> {
    let kind = ReportKind::from_file_name(file_name);
    if kind == ReportKind::Unknown {
        warn!("unrecognized report kind");
        return Ok(ReportOutput {
            kind: None,
            subsets: Vec::new(),
            warnings: vec![Warning::UnknownReportKind {
                file: file_name.to_string(),
            }],
        });
    }

    let mut table = load::load_report(text)?;
    info!(rows = table.len(), cols = table.columns.len(), %kind, "loaded");

    decode::decode_column(&mut table, PAGE_PATH);
    decode::decode_column(&mut table, PAGE_REFERRER);

    let mut output = ReportOutput {
        kind: Some(kind),
        subsets: Vec::new(),
        warnings: Vec::new(),
    };

    for rule in kind_rules(kind) {
        let mut subset = classify::filter_subset(&table, rule.filter)?;
        if subset.is_empty() {
            debug!(subset = rule.name, "no matching rows");
            output.warnings.push(Warning::EmptySubset {
                subset: rule.name.to_string(),
            });
            continue;
        }

        if rule.extract_params {
            params::extract_param_columns(&mut subset);
        }
        if let Some(keys) = rule.aggregate {
            subset = aggregate::aggregate(&subset, keys.primary, keys.secondary)?;
        }

        format::strip_title_suffix(&mut subset);
        format::bounce_rate_percent(&mut subset);
        format::round_float_columns(&mut subset);
        let subset = format::reorder_columns(&subset, rule.front_columns, rule.drop_columns);

        debug!(subset = rule.name, rows = subset.len(), "subset ready");
        output.subsets.push((rule.name.to_string(), subset));
    }

    Ok(output)
}

/// Outcome of one file inside a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub file: String,
    pub output: Option<ReportOutput>,
}

/// Everything a batch produced, successes and failures side by side.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub items: Vec<BatchItem>,
    pub warnings: Vec<Warning>,
}

/// Process several uploads strictly in order. One file's fatal error is
/// recorded as a warning and the rest of the batch still runs.
pub fn process_batch<'a, I>(files: I) -> BatchOutcome
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut outcome = BatchOutcome::default();
    for (file_name, text) in files {
        match process_report(file_name, text) {
            Ok(mut output) => {
                outcome.warnings.append(&mut output.warnings);
                outcome.items.push(BatchItem {
                    file: file_name.to_string(),
                    output: Some(output),
                });
            }
            Err(err) => {
                warn!(file = %file_name, %err, "file failed, continuing batch");
                outcome.warnings.push(Warning::FileFailed {
                    file: file_name.to_string(),
                    error: err.to_string(),
                });
                outcome.items.push(BatchItem {
                    file: file_name.to_string(),
                    output: None,
                });
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,faqreport::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const REPORT1: &str = "\
# ----------------------------------------\n\
# All web site data\n\
# FAQ access report\n\
# 20240601-20240630\n\
# ----------------------------------------\n\
\n\
pagePathPlusQueryString,pageTitle,sessions\n\
Path + query,Title,Count of sessions\n\
/lowv/faq/12-3,FAQ item｜お客様サポート,5\n\
/lowv/faq/result?category=X&keyword=Y,Search results,3\n";

    #[test]
    fn report1_splits_detail_and_category() {
        init_test_logging();
        let out = process_report("report1_june.csv", REPORT1).unwrap();
        assert_eq!(out.kind, Some(ReportKind::Report1));

        let detail = &out
            .subsets
            .iter()
            .find(|(n, _)| n == "detail")
            .expect("detail subset")
            .1;
        assert_eq!(detail.len(), 1);
        assert_eq!(detail.rows[0][0], Cell::text("/lowv/faq/12-3"));
        // branding suffix stripped by the formatter
        assert_eq!(detail.rows[0][1], Cell::text("FAQ item"));

        let category = &out
            .subsets
            .iter()
            .find(|(n, _)| n == "category")
            .expect("category subset")
            .1;
        assert_eq!(category.len(), 1);
        assert_eq!(category.rows[0][0], Cell::text("X"));
        assert_eq!(category.rows[0][1], Cell::text("Y"));

        // keyword prefix matched nothing: warning, no subset
        assert!(out.subsets.iter().all(|(n, _)| n != "keyword"));
        assert!(out
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::EmptySubset { subset } if subset == "keyword")));
    }

    #[test]
    fn encoded_category_paths_classify_after_decoding() {
        init_test_logging();
        // the category prefix only appears once the path is percent-decoded
        let report = REPORT1.replace(
            "/lowv/faq/result?category=X&keyword=Y",
            "/lowv/faq/result%3Fcategory%3D%E6%96%99%E9%87%91",
        );
        let out = process_report("report1.csv", &report).unwrap();
        let category = &out
            .subsets
            .iter()
            .find(|(n, _)| n == "category")
            .expect("category subset")
            .1;
        assert_eq!(category.rows[0][0], Cell::text("料金"));
    }

    #[test]
    fn unknown_kind_warns_and_produces_nothing() {
        init_test_logging();
        let out = process_report("mystery.csv", REPORT1).unwrap();
        assert_eq!(out.kind, None);
        assert!(out.subsets.is_empty());
        assert!(matches!(
            out.warnings.as_slice(),
            [Warning::UnknownReportKind { .. }]
        ));
    }

    #[test]
    fn batch_isolates_one_bad_file() {
        init_test_logging();
        let files = vec![
            ("report1_a.csv", REPORT1),
            ("report1_bad.csv", "too\nshort\n"),
            ("report1_c.csv", REPORT1),
        ];
        let outcome = process_batch(files);
        assert_eq!(outcome.items.len(), 3);
        assert!(outcome.items[0].output.is_some());
        assert!(outcome.items[1].output.is_none());
        assert!(outcome.items[2].output.is_some());
        let failed: Vec<_> = outcome
            .warnings
            .iter()
            .filter(|w| matches!(w, Warning::FileFailed { .. }))
            .collect();
        assert_eq!(failed.len(), 1);
    }
}
