//! K-means with Lloyd iterations (reference implementation).
//!
//! # The Algorithm
//!
//! 1. Pick `k` initial centroids (uniformly random data points, or k-means++).
//! 2. Assign every point to its nearest centroid (squared Euclidean distance).
//! 3. Move every centroid to the mean of its points. A centroid that lost all of
//!    its points is reseeded from a random data point.
//! 4. Stop once every centroid moved by less than `tol`, or after `max_iter`
//!    iterations.
//!
//! Iterations are counted from 1. A run that converges reports the iteration in
//! which it converged; a run that never converges reports `max_iter`.
//!
//! With `n_init > 1` the whole procedure is restarted and the run with the lowest
//! inertia wins; its iteration count is the one reported to the harness.
//!
//! The accelerated counterpart lives in [`super::ParallelKmeans`].

use rand::prelude::*;
use tracing::debug;

use super::traits::{Clustering, Fittable};
use super::util;
use crate::error::{Error, Result};

/// Centroid initialization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Init {
    /// `k` data points drawn uniformly at random.
    #[default]
    Random,
    /// D² seeding (Arthur & Vassilvitskii, 2007).
    KmeansPlusPlus,
}

/// Configuration of the reference k-means.
#[derive(Debug, Clone)]
pub struct KmeansParams {
    /// Number of clusters.
    pub n_clusters: usize,
    /// Initialization strategy.
    pub init: Init,
    /// Number of restarts; the lowest-inertia run wins.
    pub n_init: usize,
    /// Convergence tolerance on the per-centroid shift.
    pub tol: f64,
    /// Maximum number of Lloyd iterations per restart.
    pub max_iter: usize,
    /// Optional RNG seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for KmeansParams {
    fn default() -> Self {
        Self {
            n_clusters: 8,
            init: Init::Random,
            n_init: 1,
            tol: 1e-4,
            max_iter: 300,
            seed: None,
        }
    }
}

/// Result of a k-means fit.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// Final centroids, one per cluster.
    pub centroids: Vec<Vec<f32>>,
    /// Cluster label per input point.
    pub labels: Vec<usize>,
    /// Sum of squared distances of points to their centroid.
    pub inertia: f64,
    /// Lloyd iterations performed.
    pub n_iter: usize,
}

/// K-means clustering (serial Lloyd iterations).
#[derive(Debug, Clone)]
pub struct Kmeans {
    params: KmeansParams,
}

impl Kmeans {
    /// Create a k-means clusterer for `n_clusters` clusters with default parameters.
    pub fn new(n_clusters: usize) -> Self {
        Self::from_params(KmeansParams {
            n_clusters,
            ..Default::default()
        })
    }

    /// Create a k-means clusterer from a full parameter record.
    pub fn from_params(params: KmeansParams) -> Self {
        Self { params }
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.params.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.params.tol = tol;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params.seed = Some(seed);
        self
    }

    /// Set the initialization strategy.
    pub fn with_init(mut self, init: Init) -> Self {
        self.params.init = init;
        self
    }

    /// Set the number of restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.params.n_init = n_init;
        self
    }

    /// Fit the model and return centroids, labels, inertia and iteration count.
    pub fn fit_full(&self, data: &[Vec<f32>]) -> Result<KmeansFit> {
        let p = &self.params;
        let dim = util::validate_lloyd(data, p.n_clusters, p.max_iter, p.tol)?;
        if p.n_init == 0 {
            return Err(Error::InvalidParameter {
                name: "n_init",
                message: "must be at least 1",
            });
        }

        let mut rng = match p.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut best: Option<KmeansFit> = None;
        for restart in 0..p.n_init {
            let fit = self.lloyd(data, dim, &mut rng);
            debug!(restart, n_iter = fit.n_iter, inertia = fit.inertia, "k-means run finished");
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }
        best.ok_or_else(|| Error::Other("k-means produced no run".into()))
    }

    fn initial_centroids(&self, data: &[Vec<f32>], rng: &mut StdRng) -> Vec<Vec<f32>> {
        match self.params.init {
            Init::Random => util::random_centroids(data, self.params.n_clusters, rng),
            Init::KmeansPlusPlus => plus_plus(data, self.params.n_clusters, rng),
        }
    }

    fn lloyd(&self, data: &[Vec<f32>], dim: usize, rng: &mut StdRng) -> KmeansFit {
        let k = self.params.n_clusters;
        let mut centroids = self.initial_centroids(data, rng);
        let mut n_iter = self.params.max_iter;

        for iter in 1..=self.params.max_iter {
            let mut sums = vec![vec![0.0f64; dim]; k];
            let mut counts = vec![0usize; k];
            for point in data {
                let (c, _) = util::nearest_centroid(point, &centroids);
                counts[c] += 1;
                for (s, &x) in sums[c].iter_mut().zip(point) {
                    *s += f64::from(x);
                }
            }

            let updated = util::means_from_sums(sums, &counts, data, rng);
            let done = util::converged(&centroids, &updated, self.params.tol);
            centroids = updated;
            if done {
                n_iter = iter;
                break;
            }
        }

        let mut inertia = 0.0f64;
        let labels = data
            .iter()
            .map(|point| {
                let (c, d) = util::nearest_centroid(point, &centroids);
                inertia += f64::from(d);
                c
            })
            .collect();

        KmeansFit {
            centroids,
            labels,
            inertia,
            n_iter,
        }
    }
}

/// k-means++ seeding: each new centroid is drawn with probability proportional to its
/// squared distance from the closest centroid chosen so far.
fn plus_plus(data: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.random_range(0..data.len())].clone());

    let mut dist: Vec<f64> = data
        .iter()
        .map(|p| f64::from(util::squared_euclidean(p, &centroids[0])))
        .collect();

    while centroids.len() < k {
        let total: f64 = dist.iter().sum();
        let idx = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = data.len() - 1;
            for (i, &d) in dist.iter().enumerate() {
                if target < d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        } else {
            // All remaining points coincide with a centroid.
            rng.random_range(0..data.len())
        };

        let next = data[idx].clone();
        for (d, p) in dist.iter_mut().zip(data) {
            *d = d.min(f64::from(util::squared_euclidean(p, &next)));
        }
        centroids.push(next);
    }
    centroids
}

impl Default for Kmeans {
    fn default() -> Self {
        Self::from_params(KmeansParams::default())
    }
}

impl Fittable for Kmeans {
    fn fit(&mut self, data: &[Vec<f32>]) -> Result<usize> {
        Ok(self.fit_full(data)?.n_iter)
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit_full(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.params.n_clusters
    }
}
