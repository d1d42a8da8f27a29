use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const HEADER_LINE: &str = "OMP_NUM_THREADS\tFIT_TIME\tNUM_ITERATIONS\n";

/// A scratch result directory that lives as long as the value.
pub struct ResultDir {
    dir: TempDir,
}

#[allow(dead_code)]
impl ResultDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp result dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `<tag>_timings.txt` with the standard header and the given `(label, ms, iters)` rows.
    pub fn write_results(&self, tag: &str, rows: &[(&str, f64, u64)]) -> PathBuf {
        let mut text = String::from(HEADER_LINE);
        for (label, ms, iters) in rows {
            text.push_str(&format!("{label}\t{ms}\t{iters}\n"));
        }
        self.write_raw(&format!("{tag}_timings.txt"), &text)
    }

    pub fn write_raw(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("write result file");
        path
    }
}
