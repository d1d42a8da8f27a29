//! Benchmark input data.
//!
//! The dataset is built or loaded once per process, before any trial starts, and then
//! shared read-only by every trial.

use std::path::{Path, PathBuf};

use rand::prelude::*;
use rand_distr::Normal;
use tracing::info;

use crate::error::{Error, Result};

/// Parameters of the synthetic Gaussian blob generator.
#[derive(Debug, Clone)]
pub struct BlobParams {
    /// Points drawn per cluster.
    pub n_per_cluster: usize,
    /// Dimensionality of every point.
    pub dims: usize,
    /// Number of blobs.
    pub n_clusters: usize,
    /// Centre of the first blob on every axis; blob `c` sits at `mean + 4c`.
    pub mean: f64,
    /// Standard deviation of every blob.
    pub std_dev: f64,
    /// RNG seed.
    pub seed: u64,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            n_per_cluster: 2000,
            dims: 50,
            n_clusters: 10,
            mean: 1.0,
            std_dev: 8.0,
            seed: 42,
        }
    }
}

/// Generate `n_clusters * n_per_cluster` points grouped in Gaussian blobs.
///
/// Points are ordered blob by blob.
pub fn blobs(params: &BlobParams) -> Result<Vec<Vec<f32>>> {
    if params.n_per_cluster == 0 || params.n_clusters == 0 || params.dims == 0 {
        return Err(Error::InvalidParameter {
            name: "blobs",
            message: "point count, cluster count and dimensionality must be positive",
        });
    }
    if !(params.std_dev.is_finite() && params.std_dev >= 0.0) {
        return Err(Error::InvalidParameter {
            name: "std_dev",
            message: "must be finite and non-negative",
        });
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut data = Vec::with_capacity(params.n_per_cluster * params.n_clusters);
    for cluster in 0..params.n_clusters {
        let centre = params.mean + 4.0 * cluster as f64;
        let dist = Normal::new(centre, params.std_dev).map_err(|_| Error::InvalidParameter {
            name: "std_dev",
            message: "must be finite and non-negative",
        })?;
        for _ in 0..params.n_per_cluster {
            data.push((0..params.dims).map(|_| dist.sample(&mut rng) as f32).collect());
        }
    }
    Ok(data)
}

/// How to read a delimited numeric file.
#[derive(Debug, Clone)]
pub struct DelimitedSource {
    pub path: PathBuf,
    pub delimiter: u8,
    /// Skip the first line.
    pub has_headers: bool,
    /// Ignore the last column (e.g. a class label stored after the features).
    pub drop_last_column: bool,
}

impl DelimitedSource {
    /// Comma-separated, no header, every column used.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
            has_headers: false,
            drop_last_column: false,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn with_drop_last_column(mut self, drop: bool) -> Self {
        self.drop_last_column = drop;
        self
    }
}

/// Read every row of a delimited numeric file as one point.
pub fn load_delimited(source: &DelimitedSource) -> Result<Vec<Vec<f32>>> {
    let path = source.path.as_path();
    if !path.is_file() {
        return Err(Error::MissingPath(path.to_path_buf()));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(source.delimiter)
        .has_headers(source.has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut data: Vec<Vec<f32>> = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let keep = if source.drop_last_column {
            record.len().saturating_sub(1)
        } else {
            record.len()
        };
        let point = record
            .iter()
            .take(keep)
            .map(|field| parse_field(field, path, line))
            .collect::<Result<Vec<f32>>>()?;

        if let Some(first) = data.first() {
            if first.len() != point.len() {
                return Err(Error::DimensionMismatch {
                    expected: first.len(),
                    found: point.len(),
                });
            }
        }
        data.push(point);
    }

    if data.is_empty() {
        return Err(Error::EmptyInput);
    }
    info!(path = %path.display(), points = data.len(), dims = data[0].len(), "loaded dataset");
    Ok(data)
}

fn parse_field(field: &str, path: &Path, line: usize) -> Result<f32> {
    field.parse::<f32>().map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        message: format!("record {}: {field:?}: {e}", line + 1),
    })
}
