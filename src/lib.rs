//! CSV-to-spreadsheet reshaping for GA-exported FAQ access reports.
//!
//! One synchronous pipeline per uploaded file: strip the export preamble,
//! percent-decode URL columns, cut the rows into labeled subsets by path and
//! referrer patterns, extract category/keyword query parameters, aggregate
//! metrics per key pair, apply display formatting, and hand the finished
//! tables over keyed by sheet name.

pub mod error;
pub mod process;
pub mod rules;
pub mod sheets;
pub mod table;

pub use error::{ReportError, Result, Warning};
pub use process::{process_batch, process_report, BatchOutcome, ReportOutput};
pub use rules::ReportKind;
pub use table::{Cell, Table};
