//! Aggregation of result files into speed-up and throughput tables.
//!
//! ## Pipeline
//!
//! 1. [`combine`] loads every `<tag>_timings.txt` file from one or more directories and
//!    tags each row with the file's configuration tag.
//! 2. [`pivot_mean`] lays observations out as a label × tag matrix of means.
//! 3. [`normalize_speedup`] turns mean fit times into speed-ups over the first
//!    (smallest) label, and [`ResultTable::throughput`] gives iterations per second.
//!
//! ## Undefined cells
//!
//! A (label, tag) pair that was never measured is [`Cell::Missing`], not zero. A
//! throughput over a zero-length fit is [`Cell::Unbounded`]. Neither ever leaks into a
//! table as a NaN or an infinity.
//!
//! ```rust
//! use kscale::aggregate::{normalize_speedup, pivot_mean, Cell, Observation};
//! use kscale::ExperimentLabel;
//!
//! let fit_time = pivot_mean(vec![
//!     Observation::new(ExperimentLabel::from(1usize), "x", 100.0),
//!     Observation::new(ExperimentLabel::from(2usize), "x", 50.0),
//! ]);
//! let speedup = normalize_speedup(&fit_time);
//! assert_eq!(speedup.get(&ExperimentLabel::from(2usize), "x"), Cell::Value(2.0));
//! ```

mod combine;
mod pivot;

pub use combine::{combine, tag_for, ResultTable, TaggedRow};
pub use pivot::{
    iterations_per_second, normalize_speedup, pivot_mean, AggregatedTable, Cell, Observation,
};
