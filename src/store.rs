//! Append-only result store.
//!
//! A result file is UTF-8, tab-separated, with one header line followed by one line
//! per trial:
//!
//! ```text
//! OMP_NUM_THREADS	FIT_TIME	NUM_ITERATIONS
//! 4	812.25	37
//! ```
//!
//! Every benchmark process (one per parallelism setting) appends its trials to the same
//! file. Rows are never rewritten or removed. There is no locking: callers must make
//! sure at most one process writes a given file at a time.
//!
//! The store writes through a [`Sink`], so the create-or-append decision can be
//! exercised against an in-memory buffer as well as a file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::harness::TimingRecord;
use crate::label::ExperimentLabel;

/// Header columns of a result file, in order.
pub const HEADER: [&str; 3] = ["OMP_NUM_THREADS", "FIT_TIME", "NUM_ITERATIONS"];

/// Suffix that marks a result file; the rest of the file name is the configuration tag.
pub const FILE_SUFFIX: &str = "_timings.txt";

/// Result file name for a configuration tag.
pub fn file_name_for(tag: &str) -> String {
    format!("{tag}{FILE_SUFFIX}")
}

/// Whether a sink already holds content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// Nothing written yet (a missing file counts as empty).
    Empty,
    /// At least one byte is present.
    Populated,
}

/// A sequential, append-only byte destination.
pub trait Sink {
    /// Current state of the destination.
    fn state(&self) -> Result<SinkState>;

    /// Append `bytes` at the end, creating the destination if needed.
    fn append(&mut self, bytes: &[u8]) -> Result<()>;
}

/// A sink backed by a file on disk.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Sink for FileSink {
    fn state(&self) -> Result<SinkState> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() > 0 => Ok(SinkState::Populated),
            Ok(_) => Ok(SinkState::Empty),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(SinkState::Empty),
            Err(e) => Err(e.into()),
        }
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(())
    }
}

/// A sink backed by an in-memory buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Vec<u8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything appended so far.
    pub fn contents(&self) -> &[u8] {
        &self.buf
    }
}

impl Sink for MemorySink {
    fn state(&self) -> Result<SinkState> {
        Ok(if self.buf.is_empty() {
            SinkState::Empty
        } else {
            SinkState::Populated
        })
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}

/// What to do when the sink is still empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderPolicy {
    /// Write the header, then this run's records.
    #[default]
    HeaderThenData,
    /// Write only the header and drop this run's records; later runs append normally.
    ///
    /// Matches files produced by the older benchmark scripts, where the first run
    /// against a fresh file only initialised it.
    HeaderOnlyOnEmpty,
}

/// Summary of one [`ResultStore::ensure_and_append`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Whether the header line was written by this call.
    pub header_written: bool,
    /// Number of data lines written by this call.
    pub rows_written: usize,
}

/// Append-only store of timing rows for one parallelism label.
#[derive(Debug)]
pub struct ResultStore<S> {
    sink: S,
    label: ExperimentLabel,
    policy: HeaderPolicy,
}

impl ResultStore<FileSink> {
    /// A store writing to the file at `path`.
    pub fn open(path: impl Into<PathBuf>, label: ExperimentLabel) -> Self {
        Self::new(FileSink::new(path), label)
    }
}

impl<S: Sink> ResultStore<S> {
    pub fn new(sink: S, label: ExperimentLabel) -> Self {
        Self {
            sink,
            label,
            policy: HeaderPolicy::default(),
        }
    }

    pub fn with_header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn label(&self) -> &ExperimentLabel {
        &self.label
    }

    /// Write the header if the sink is empty, then append one line per record.
    ///
    /// Under [`HeaderPolicy::HeaderOnlyOnEmpty`] an empty sink only receives the header.
    pub fn ensure_and_append(&mut self, records: &[TimingRecord]) -> Result<AppendOutcome> {
        let mut out = tsv_writer();
        let header_written = match self.sink.state()? {
            SinkState::Empty => {
                out.write_record(HEADER)?;
                true
            }
            SinkState::Populated => false,
        };

        let write_rows = !(header_written && self.policy == HeaderPolicy::HeaderOnlyOnEmpty);
        if write_rows {
            let label = self.label.to_string();
            for r in records {
                out.write_record([
                    label.clone(),
                    r.elapsed_time_ms.to_string(),
                    r.iterations.to_string(),
                ])?;
            }
        } else if !records.is_empty() {
            warn!(
                dropped = records.len(),
                "result sink was empty: wrote header only, records of this run are not stored"
            );
        }

        let out = out.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        if !out.is_empty() {
            self.sink.append(&out)?;
        }

        let rows_written = if write_rows { records.len() } else { 0 };
        debug!(label = %self.label, header_written, rows_written, "appended timing rows");
        Ok(AppendOutcome {
            header_written,
            rows_written,
        })
    }
}

/// A tab-separated writer into memory. Fields holding a tab, a quote or a line break
/// are quoted, so [`parse_rows`] reads them back unchanged.
pub(crate) fn tsv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(Vec::new())
}

/// One persisted trial.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub label: ExperimentLabel,
    pub elapsed_time_ms: f64,
    pub iterations: u64,
}

#[derive(Deserialize)]
struct RawRow {
    #[serde(rename = "OMP_NUM_THREADS")]
    label: String,
    #[serde(rename = "FIT_TIME")]
    fit_time: f64,
    #[serde(rename = "NUM_ITERATIONS")]
    iterations: u64,
}

/// Read every row of the result file at `path`.
///
/// A zero-byte file holds no rows. Any other file must start with exactly
/// [`HEADER`], otherwise [`Error::SchemaMismatch`] is returned.
pub fn read_rows(path: &Path) -> Result<Vec<ResultRow>> {
    parse_rows(File::open(path)?, path)
}

/// Parse result rows from any reader; `origin` is only used in error messages.
pub fn parse_rows<R: Read>(mut reader: R, origin: &Path) -> Result<Vec<ResultRow>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(text.as_bytes());

    let found: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if found != HEADER {
        return Err(Error::SchemaMismatch {
            path: origin.to_path_buf(),
            expected: HEADER.iter().map(|s| s.to_string()).collect(),
            found,
        });
    }

    rdr.deserialize::<RawRow>()
        .map(|raw| {
            let raw = raw.map_err(|e| Error::Parse {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;
            Ok(ResultRow {
                label: ExperimentLabel::new(raw.label),
                elapsed_time_ms: raw.fit_time,
                iterations: raw.iterations,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<TimingRecord> {
        vec![
            TimingRecord {
                elapsed_time_ms: 12.5,
                iterations: 4,
            },
            TimingRecord {
                elapsed_time_ms: 0.1,
                iterations: 9,
            },
        ]
    }

    fn text(store: &ResultStore<MemorySink>) -> String {
        String::from_utf8(store.sink().contents().to_vec()).unwrap()
    }

    #[test]
    fn empty_sink_gets_header_then_data() {
        let mut store = ResultStore::new(MemorySink::new(), ExperimentLabel::from("2"));
        let outcome = store.ensure_and_append(&records()).unwrap();
        assert_eq!(
            outcome,
            AppendOutcome {
                header_written: true,
                rows_written: 2
            }
        );
        assert_eq!(
            text(&store),
            "OMP_NUM_THREADS\tFIT_TIME\tNUM_ITERATIONS\n2\t12.5\t4\n2\t0.1\t9\n"
        );
    }

    #[test]
    fn header_only_policy_drops_first_run() {
        let mut store = ResultStore::new(MemorySink::new(), ExperimentLabel::from("1"))
            .with_header_policy(HeaderPolicy::HeaderOnlyOnEmpty);

        let first = store.ensure_and_append(&records()).unwrap();
        assert!(first.header_written);
        assert_eq!(first.rows_written, 0);
        assert_eq!(text(&store), "OMP_NUM_THREADS\tFIT_TIME\tNUM_ITERATIONS\n");

        let second = store.ensure_and_append(&records()).unwrap();
        assert!(!second.header_written);
        assert_eq!(second.rows_written, 2);
        assert_eq!(text(&store).lines().count(), 3);
    }

    #[test]
    fn absent_label_is_written_as_text() {
        let mut store = ResultStore::new(MemorySink::new(), ExperimentLabel::absent());
        store.ensure_and_append(&records()[..1]).unwrap();
        assert!(text(&store).ends_with("None\t12.5\t4\n"));
    }

    #[test]
    fn parse_reads_back_written_rows() {
        let mut store = ResultStore::new(MemorySink::new(), ExperimentLabel::from("8"));
        store.ensure_and_append(&records()).unwrap();
        let rows = parse_rows(store.sink().contents(), Path::new("mem")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].label, ExperimentLabel::from("8"));
        assert_eq!(rows[1].elapsed_time_ms, 0.1);
        assert_eq!(rows[1].iterations, 9);
    }

    #[test]
    fn parse_rejects_foreign_header() {
        let data = "threads\tFIT_TIME\tNUM_ITERATIONS\n1\t2.0\t3\n";
        let err = parse_rows(data.as_bytes(), Path::new("x_timings.txt")).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn parse_rejects_bad_iteration_field() {
        let data = "OMP_NUM_THREADS\tFIT_TIME\tNUM_ITERATIONS\n1\t2.0\tmany\n";
        let err = parse_rows(data.as_bytes(), Path::new("x_timings.txt")).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn labels_with_separators_round_trip() {
        for text in ["\"8\"", "4\t1", "a\nb", "x y"] {
            let label = ExperimentLabel::new(text);
            let mut store = ResultStore::new(MemorySink::new(), label.clone());
            store.ensure_and_append(&records()).unwrap();
            store.ensure_and_append(&records()).unwrap();

            let rows = parse_rows(store.sink().contents(), Path::new("mem")).unwrap();
            assert_eq!(rows.len(), 4, "label {text:?}");
            assert!(rows.iter().all(|r| r.label == label), "label {text:?}");
        }
    }

    #[test]
    fn empty_input_has_no_rows() {
        assert!(parse_rows(&b""[..], Path::new("e")).unwrap().is_empty());
    }

    #[test]
    fn file_name_carries_suffix() {
        assert_eq!(file_name_for("sklearn"), "sklearn_timings.txt");
    }
}
