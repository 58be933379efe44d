use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while folding run files into a dataset.
///
/// Everything tied to a single file aborts the experiment that file belongs
/// to; [`crate::pipeline::Pipeline`] keeps the other experiments going.
#[derive(Debug, Error)]
pub enum FoldError {
    /// The header never declared a list of variable names.
    #[error("{}: no variable names found before the data section", .path.display())]
    HeaderParse { path: PathBuf },

    #[error("{}:{line}: expected {expected} columns, found {found}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{}:{line}: '{token}' is not a number", .path.display())]
    InvalidNumber {
        path: PathBuf,
        line: usize,
        token: String,
    },

    /// A file addresses a coordinate value that is not in the merged domain.
    #[error(
        "{}: coordinate {coordinate} = {value} is not part of the merged domain",
        .path.display()
    )]
    DomainMismatch {
        path: PathBuf,
        coordinate: String,
        value: String,
    },

    #[error("{}: time column '{column}' not among the declared variables", .path.display())]
    MissingTimeColumn { path: PathBuf, column: String },

    /// The time grid bounds would not give a strictly increasing axis.
    #[error("time grid from {min} to {max} is not increasing")]
    InvalidTimeGrid { min: f64, max: f64 },

    #[error("time column decreases (or is NaN) at row {row}")]
    UnsortedTime { row: usize },

    /// Resampling one run failed; `source` says why.
    #[error("{}: {source}", .path.display())]
    Resample {
        path: PathBuf,
        #[source]
        source: Box<FoldError>,
    },

    /// A selection named an axis or value the dataset does not have.
    #[error("no coordinate {axis} = {value} in dataset")]
    UnknownCoordinate { axis: String, value: String },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid file pattern: {0}")]
    InvalidPattern(#[from] globset::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

impl FoldError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FoldError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FoldError>;
