//! Thread-scaling benchmarks for k-means.
//!
//! `kscale` measures how long a clustering fit takes, and how many iterations it
//! needs, under different degrees of thread-level parallelism. Each benchmark process
//! runs under one parallelism setting and appends its trials to a shared result
//! file; a later aggregation step turns all result files into speed-up and
//! throughput tables.
//!
//! - [`cluster`]: the [`Fittable`] capability and the k-means implementations under test
//! - [`harness`]: sequential timed trials
//! - [`store`]: the append-only, tab-separated result files
//! - [`aggregate`]: combining result files, pivoting, speed-up normalization
//! - [`report`]: tab-separated output of the aggregated tables
//! - [`dataset`]: synthetic blobs and delimited-file loading

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod cluster;
pub mod dataset;
pub mod error;
pub mod harness;
pub mod label;
pub mod report;
pub mod store;

pub use cluster::{Clustering, Fittable, Init, Kmeans, KmeansFit, ParallelKmeans};
pub use error::{Error, Result};
pub use harness::{RunSummary, TimingHarness, TimingRecord};
pub use label::ExperimentLabel;
pub use store::{HeaderPolicy, ResultStore};
