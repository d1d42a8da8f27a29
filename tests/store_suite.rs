use std::fs;

#[path = "common.rs"]
mod common;

use common::{ResultDir, HEADER_LINE};
use kscale::store::{read_rows, HeaderPolicy, ResultStore};
use kscale::{ExperimentLabel, TimingRecord};

fn records(n: usize) -> Vec<TimingRecord> {
    (0..n)
        .map(|i| TimingRecord {
            elapsed_time_ms: 100.0 + i as f64 * 0.25,
            iterations: 10 + i as u64,
        })
        .collect()
}

fn line_count(path: &std::path::Path) -> usize {
    fs::read_to_string(path).unwrap().lines().count()
}

#[test]
fn header_written_once_across_invocations() {
    let dir = ResultDir::new();
    let path = dir.path().join("parallel_timings.txt");

    for threads in [1usize, 2, 4] {
        let mut store = ResultStore::open(&path, ExperimentLabel::from(threads));
        store.ensure_and_append(&records(3)).unwrap();
    }

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("OMP_NUM_THREADS").count(), 1);
    assert!(text.starts_with(HEADER_LINE));
    assert_eq!(text.lines().count(), 1 + 9);

    let rows = read_rows(&path).unwrap();
    let labels: Vec<String> = rows.iter().map(|r| r.label.to_string()).collect();
    assert_eq!(labels, ["1", "1", "1", "2", "2", "2", "4", "4", "4"]);
}

#[test]
fn same_label_twice_grows_monotonically() {
    let dir = ResultDir::new();
    let path = dir.path().join("reference_timings.txt");
    let label = ExperimentLabel::from(2usize);

    let first = ResultStore::open(&path, label.clone())
        .ensure_and_append(&records(4))
        .unwrap();
    assert!(first.header_written);
    let after_first = line_count(&path);

    let second = ResultStore::open(&path, label)
        .ensure_and_append(&records(4))
        .unwrap();
    assert!(!second.header_written);
    assert_eq!(second.rows_written, 4);
    assert_eq!(line_count(&path), after_first + 4);
}

#[test]
fn legacy_policy_loses_first_run_on_fresh_file() {
    let dir = ResultDir::new();
    let path = dir.path().join("legacy_timings.txt");

    let first = ResultStore::open(&path, ExperimentLabel::from(1usize))
        .with_header_policy(HeaderPolicy::HeaderOnlyOnEmpty)
        .ensure_and_append(&records(5))
        .unwrap();
    assert!(first.header_written);
    assert_eq!(first.rows_written, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), HEADER_LINE);

    ResultStore::open(&path, ExperimentLabel::from(2usize))
        .with_header_policy(HeaderPolicy::HeaderOnlyOnEmpty)
        .ensure_and_append(&records(5))
        .unwrap();
    let rows = read_rows(&path).unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|r| r.label == ExperimentLabel::from(2usize)));
}

#[test]
fn existing_empty_file_is_treated_as_absent() {
    let dir = ResultDir::new();
    let path = dir.write_raw("touched_timings.txt", "");

    let outcome = ResultStore::open(&path, ExperimentLabel::from(8usize))
        .ensure_and_append(&records(2))
        .unwrap();
    assert!(outcome.header_written);
    assert_eq!(outcome.rows_written, 2);
    assert_eq!(read_rows(&path).unwrap().len(), 2);
}

#[test]
fn unlabelled_run_writes_none() {
    let dir = ResultDir::new();
    let path = dir.path().join("nolabel_timings.txt");
    ResultStore::open(&path, ExperimentLabel::absent())
        .ensure_and_append(&records(1))
        .unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().nth(1), Some("None\t100\t10"));
    assert_eq!(read_rows(&path).unwrap()[0].label, ExperimentLabel::absent());
}
