//! Data-parallel k-means.
//!
//! Same Lloyd iterations as [`super::Kmeans`], but the assignment step and the
//! per-cluster accumulation run on the current rayon thread pool. Each worker folds
//! its share of points into private sums and counts, which are then reduced pairwise,
//! so no locking happens inside an iteration.
//!
//! The pool size is not chosen here. Callers configure it out-of-band (the `kscale`
//! binary builds the global pool from the parallelism label), which is exactly the
//! knob the thread-scaling benchmark turns.
//!
//! Configuration is narrower than the reference variant: initialization is always
//! uniform random and there is a single run.

use rand::prelude::*;
use rayon::prelude::*;

use super::kmeans::KmeansFit;
use super::traits::{Clustering, Fittable};
use super::util;
use crate::error::Result;

/// Configuration of the parallel k-means.
#[derive(Debug, Clone)]
pub struct ParallelKmeansParams {
    /// Number of clusters.
    pub n_clusters: usize,
    /// Maximum number of Lloyd iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the per-centroid shift.
    pub tol: f64,
    /// Optional RNG seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for ParallelKmeansParams {
    fn default() -> Self {
        Self {
            n_clusters: 8,
            max_iter: 300,
            tol: 1e-4,
            seed: None,
        }
    }
}

/// K-means with rayon-parallel Lloyd iterations.
#[derive(Debug, Clone)]
pub struct ParallelKmeans {
    params: ParallelKmeansParams,
}

type Partial = (Vec<Vec<f64>>, Vec<usize>);

impl ParallelKmeans {
    /// Create a clusterer from the four supported parameters.
    pub fn new(n_clusters: usize, max_iter: usize, tol: f64, seed: Option<u64>) -> Self {
        Self {
            params: ParallelKmeansParams {
                n_clusters,
                max_iter,
                tol,
                seed,
            },
        }
    }

    /// Create a clusterer from a parameter record.
    pub fn from_params(params: ParallelKmeansParams) -> Self {
        Self { params }
    }

    /// Fit the model and return centroids, labels, inertia and iteration count.
    pub fn fit_full(&self, data: &[Vec<f32>]) -> Result<KmeansFit> {
        let p = &self.params;
        let dim = util::validate_lloyd(data, p.n_clusters, p.max_iter, p.tol)?;
        let k = p.n_clusters;

        let mut rng = match p.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut centroids = util::random_centroids(data, k, &mut rng);
        let mut n_iter = p.max_iter;

        for iter in 1..=p.max_iter {
            let zero = || -> Partial { (vec![vec![0.0f64; dim]; k], vec![0usize; k]) };
            let (sums, counts) = data
                .par_iter()
                .fold(zero, |(mut sums, mut counts), point| {
                    let (c, _) = util::nearest_centroid(point, &centroids);
                    counts[c] += 1;
                    for (s, &x) in sums[c].iter_mut().zip(point) {
                        *s += f64::from(x);
                    }
                    (sums, counts)
                })
                .reduce(zero, merge);

            let updated = util::means_from_sums(sums, &counts, data, &mut rng);
            let done = util::converged(&centroids, &updated, p.tol);
            centroids = updated;
            if done {
                n_iter = iter;
                break;
            }
        }

        let assigned: Vec<(usize, f32)> = data
            .par_iter()
            .map(|point| util::nearest_centroid(point, &centroids))
            .collect();
        let inertia = assigned.iter().map(|&(_, d)| f64::from(d)).sum();
        let labels = assigned.into_iter().map(|(c, _)| c).collect();

        Ok(KmeansFit {
            centroids,
            labels,
            inertia,
            n_iter,
        })
    }
}

fn merge(mut a: Partial, b: Partial) -> Partial {
    for (sa, sb) in a.0.iter_mut().zip(b.0) {
        for (x, y) in sa.iter_mut().zip(sb) {
            *x += y;
        }
    }
    for (ca, cb) in a.1.iter_mut().zip(b.1) {
        *ca += cb;
    }
    a
}

impl Fittable for ParallelKmeans {
    fn fit(&mut self, data: &[Vec<f32>]) -> Result<usize> {
        Ok(self.fit_full(data)?.n_iter)
    }
}

impl Clustering for ParallelKmeans {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit_full(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.params.n_clusters
    }
}
