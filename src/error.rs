use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the benchmark harness, the result store and the aggregator.
#[derive(Debug, Error)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Points in a dataset have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// A required input or output path does not exist.
    #[error("{} does not exist", .0.display())]
    MissingPath(PathBuf),

    /// A result directory handed to the aggregator does not exist or is not a directory.
    #[error("result directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    /// No `*_timings.txt` file was found in any of the searched directories.
    #[error("no result files found in {searched} director(ies)")]
    EmptyResultSet {
        /// Number of directories that were searched.
        searched: usize,
    },

    /// Result files were found, but none of them holds a data row.
    #[error("{files} result file(s) found, but none contains a data row")]
    NoResultRows {
        /// Number of result files that were read.
        files: usize,
    },

    /// A result file does not carry the expected column layout.
    #[error("schema mismatch in {}: expected columns {expected:?}, found {found:?}", .path.display())]
    SchemaMismatch {
        /// Offending file.
        path: PathBuf,
        /// Expected header columns.
        expected: Vec<String>,
        /// Header columns actually present.
        found: Vec<String>,
    },

    /// The algorithm under test failed during a timed trial.
    #[error("trial {trial} failed: {source}")]
    Trial {
        /// Zero-based trial index (warm-up trials included).
        trial: usize,
        /// Error reported by the fittable.
        #[source]
        source: Box<Error>,
    },

    /// The algorithm under test reported zero iterations.
    #[error("trial {trial} reported {iterations} iterations, expected at least 1")]
    InvalidIterationCount {
        /// Zero-based trial index.
        trial: usize,
        /// Reported iteration count.
        iterations: usize,
    },

    /// A field could not be parsed.
    #[error("parse error in {}: {message}", .path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Human-readable explanation.
        message: String,
    },

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Underlying delimited-file reader/writer failure.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
