use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::pivot::{self, AggregatedTable, Observation};
use crate::error::{Error, Result};
use crate::store::{self, ResultRow, FILE_SUFFIX};

/// A result row together with the configuration tag of the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRow {
    pub tag: String,
    pub row: ResultRow,
}

/// All rows loaded from a set of result directories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<TaggedRow>,
}

impl ResultTable {
    pub fn rows(&self) -> &[TaggedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Mean fit time (ms) per label and tag.
    pub fn fit_time(&self) -> AggregatedTable {
        pivot::pivot_mean(self.rows.iter().map(|r| Observation {
            label: r.row.label.clone(),
            tag: r.tag.clone(),
            value: pivot::Cell::from_f64(r.row.elapsed_time_ms),
        }))
    }

    /// Mean throughput (iterations per second) per label and tag.
    pub fn throughput(&self) -> AggregatedTable {
        pivot::pivot_mean(self.rows.iter().map(|r| Observation {
            label: r.row.label.clone(),
            tag: r.tag.clone(),
            value: pivot::iterations_per_second(r.row.iterations, r.row.elapsed_time_ms),
        }))
    }
}

/// Configuration tag of a result file: its name without the `_timings.txt` suffix.
pub fn tag_for(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    name.strip_suffix(FILE_SUFFIX)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
}

/// Load every result file in `dirs` into one tagged table.
///
/// All directories are checked before any file is read. Files are read in name order
/// within each directory, and directories in the order given. Finding result files
/// that hold nothing but a header is an error ([`Error::NoResultRows`]).
pub fn combine<P: AsRef<Path>>(dirs: &[P]) -> Result<ResultTable> {
    for dir in dirs {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::MissingDirectory(dir.to_path_buf()));
        }
    }

    let mut rows = Vec::new();
    let mut files = 0usize;
    for dir in dirs {
        for (path, tag) in result_files(dir.as_ref())? {
            let loaded = store::read_rows(&path)?;
            debug!(path = %path.display(), %tag, rows = loaded.len(), "loaded result file");
            files += 1;
            rows.extend(loaded.into_iter().map(|row| TaggedRow {
                tag: tag.clone(),
                row,
            }));
        }
    }

    if files == 0 {
        return Err(Error::EmptyResultSet {
            searched: dirs.len(),
        });
    }
    if rows.is_empty() {
        return Err(Error::NoResultRows { files });
    }

    info!(files, rows = rows.len(), "combined result files");
    Ok(ResultTable { rows })
}

/// Result files of `dir` with their tags, in file name order.
fn result_files(dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(tag) = tag_for(&path) {
            files.push((path, tag));
        }
    }
    files.sort();
    Ok(files)
}
