//! Tab-separated rendering of aggregated tables.
//!
//! Plotting is left to external tools; this module writes the two derived tables in
//! the same tab-separated layout as the result files, so they load directly into a
//! spreadsheet or a plotting script.
//!
//! Values are written in shortest round-trip form. A missing cell is an empty field
//! and an unbounded cell is the word `unbounded`, which numeric readers reject
//! instead of turning it into an infinity.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::aggregate::{normalize_speedup, AggregatedTable, Cell, ResultTable};
use crate::error::Result;
use crate::store::{tsv_writer, HEADER};

/// Text of an unbounded cell.
pub const UNBOUNDED: &str = "unbounded";

/// File name of the speed-up table.
pub const SPEEDUP_FILE: &str = "speedup.tsv";
/// File name of the throughput table.
pub const THROUGHPUT_FILE: &str = "throughput.tsv";

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Value(v) => write!(f, "{v}"),
            Cell::Missing => Ok(()),
            Cell::Unbounded => f.write_str(UNBOUNDED),
        }
    }
}

impl fmt::Display for AggregatedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = tsv_writer();
        let header = std::iter::once(HEADER[0].to_string()).chain(self.tags().iter().cloned());
        out.write_record(header).map_err(|_| fmt::Error)?;

        for (i, label) in self.labels().iter().enumerate() {
            let row = std::iter::once(label.to_string())
                .chain(self.row(i).iter().map(Cell::to_string));
            out.write_record(row).map_err(|_| fmt::Error)?;
        }

        let bytes = out.into_inner().map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&bytes))
    }
}

/// The two tables produced by an aggregation run.
#[derive(Debug, Clone)]
pub struct Report {
    pub speedup: AggregatedTable,
    pub throughput: AggregatedTable,
}

impl Report {
    pub fn from_table(table: &ResultTable) -> Self {
        Self {
            speedup: normalize_speedup(&table.fit_time()),
            throughput: table.throughput(),
        }
    }

    /// Write both tables into `dir`, creating it (and its parents) if needed.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if dir.is_dir() {
            info!(dir = %dir.display(), "output directory already exists");
        } else {
            fs::create_dir_all(dir)?;
            info!(dir = %dir.display(), "created output directory");
        }

        let mut written = Vec::with_capacity(2);
        for (name, table) in [
            (SPEEDUP_FILE, &self.speedup),
            (THROUGHPUT_FILE, &self.throughput),
        ] {
            let path = dir.join(name);
            fs::write(&path, table.to_string())?;
            written.push(path);
        }
        Ok(written)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# speed-up over the smallest label")?;
        write!(f, "{}", self.speedup)?;
        writeln!(f)?;
        writeln!(f, "# throughput (iterations/second)")?;
        write!(f, "{}", self.throughput)
    }
}
