use thiserror::Error;

/// Fatal per-file errors. One file failing never aborts the batch.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The upload has too few lines, or neither load strategy could parse it.
    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    /// A column the current processing mode needs is not in the header.
    #[error("Required column missing: {column}")]
    SchemaMismatch { column: String },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Workbook write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// Non-fatal conditions reported alongside output instead of failing the run.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A classification rule matched zero rows; the subset is omitted.
    EmptySubset { subset: String },
    /// Filename prefix matched no known report kind; the file is skipped.
    UnknownReportKind { file: String },
    /// A file in a batch failed fatally and was skipped.
    FileFailed { file: String, error: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::EmptySubset { subset } => {
                write!(f, "subset '{}' matched no rows, omitted", subset)
            }
            Warning::UnknownReportKind { file } => {
                write!(f, "'{}' matches no known report kind, skipped", file)
            }
            Warning::FileFailed { file, error } => {
                write!(f, "'{}' failed: {}", file, error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_input_display() {
        let err = ReportError::MalformedInput {
            reason: "only 3 lines".into(),
        };
        assert_eq!(err.to_string(), "Malformed input: only 3 lines");
    }

    #[test]
    fn schema_mismatch_display() {
        let err = ReportError::SchemaMismatch {
            column: "sessions".into(),
        };
        assert_eq!(err.to_string(), "Required column missing: sessions");
    }

    #[test]
    fn warning_display_names_the_subset() {
        let w = Warning::EmptySubset {
            subset: "detail".into(),
        };
        assert!(w.to_string().contains("detail"));
    }
}
