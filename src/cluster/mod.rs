//! Clustering algorithms the benchmark harness can time.
//!
//! Everything here plugs into the harness through one capability, [`Fittable`]:
//! fit a dataset, report the number of iterations until convergence. The harness
//! never looks further than that, so any algorithm implementing the trait can be
//! benchmarked.
//!
//! ## Algorithms (implemented)
//!
//! ### K-means ([`Kmeans`])
//!
//! The reference implementation: assign each point to the nearest centroid, then
//! update centroids to the mean of their points. Repeat.
//!
//! **Objective**: Minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! Supports random or k-means++ seeding and several restarts.
//!
//! ### Parallel k-means ([`ParallelKmeans`])
//!
//! The accelerated variant. Identical iterations, but the assignment and
//! accumulation steps run on the rayon pool, so its fit time depends on how many
//! worker threads the process was given. Only cluster count, iteration cap,
//! tolerance and seed are configurable.
//!
//! ## Usage
//!
//! ```rust
//! use kscale::cluster::{Clustering, Fittable, Kmeans, ParallelKmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels.len(), data.len());
//!
//! let mut model = ParallelKmeans::new(2, 100, 1e-6, Some(42));
//! let n_iter = model.fit(&data).unwrap();
//! assert!(n_iter >= 1);
//! ```

mod kmeans;
mod parallel;
mod traits;
mod util;

pub use kmeans::{Init, Kmeans, KmeansFit, KmeansParams};
pub use parallel::{ParallelKmeans, ParallelKmeansParams};
pub use traits::{Clustering, Fittable};
