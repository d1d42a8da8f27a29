use rand::prelude::*;

use crate::error::{Error, Result};

#[inline]
pub(crate) fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Check the shared Lloyd preconditions and return the dataset dimensionality.
pub(crate) fn validate_lloyd(
    data: &[Vec<f32>],
    n_clusters: usize,
    max_iter: usize,
    tol: f64,
) -> Result<usize> {
    if data.is_empty() {
        return Err(Error::EmptyInput);
    }
    if n_clusters == 0 || n_clusters > data.len() {
        return Err(Error::InvalidClusterCount {
            requested: n_clusters,
            n_items: data.len(),
        });
    }
    if max_iter == 0 {
        return Err(Error::InvalidParameter {
            name: "max_iter",
            message: "must be at least 1",
        });
    }
    if tol.is_nan() || tol < 0.0 {
        return Err(Error::InvalidParameter {
            name: "tol",
            message: "must be non-negative",
        });
    }

    let dim = data[0].len();
    if dim == 0 {
        return Err(Error::InvalidParameter {
            name: "data",
            message: "points must have at least one dimension",
        });
    }
    if let Some(bad) = data.iter().find(|p| p.len() != dim) {
        return Err(Error::DimensionMismatch {
            expected: dim,
            found: bad.len(),
        });
    }
    Ok(dim)
}

/// Index of the closest centroid and the squared distance to it.
#[inline]
pub(crate) fn nearest_centroid(point: &[f32], centroids: &[Vec<f32>]) -> (usize, f32) {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (idx, c) in centroids.iter().enumerate() {
        let d = squared_euclidean(point, c);
        if d < best_dist {
            best_dist = d;
            best = idx;
        }
    }
    (best, best_dist)
}

/// Pick `k` data points uniformly at random (with replacement) as initial centroids.
pub(crate) fn random_centroids(data: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    (0..k)
        .map(|_| data[rng.random_range(0..data.len())].clone())
        .collect()
}

/// Turn accumulated per-cluster sums into means.
///
/// A cluster that lost all its points is reseeded from a random data point.
pub(crate) fn means_from_sums(
    sums: Vec<Vec<f64>>,
    counts: &[usize],
    data: &[Vec<f32>],
    rng: &mut StdRng,
) -> Vec<Vec<f32>> {
    sums.into_iter()
        .zip(counts)
        .map(|(sum, &count)| {
            if count == 0 {
                data[rng.random_range(0..data.len())].clone()
            } else {
                sum.iter().map(|s| (s / count as f64) as f32).collect()
            }
        })
        .collect()
}

/// True when every centroid moved by a Euclidean distance strictly below `tol`.
pub(crate) fn converged(old: &[Vec<f32>], new: &[Vec<f32>], tol: f64) -> bool {
    old.iter()
        .zip(new)
        .all(|(a, b)| f64::from(squared_euclidean(a, b)).sqrt() < tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_centroid_picks_closest() {
        let centroids = vec![vec![0.0, 0.0], vec![10.0, 10.0]];
        let (idx, dist) = nearest_centroid(&[9.0, 9.0], &centroids);
        assert_eq!(idx, 1);
        assert!((dist - 2.0).abs() < 1e-6);
    }

    #[test]
    fn empty_cluster_is_reseeded_from_data() {
        let data = vec![vec![1.0, 1.0], vec![3.0, 3.0]];
        let mut rng = StdRng::seed_from_u64(7);
        let sums = vec![vec![4.0, 4.0], vec![0.0, 0.0]];
        let means = means_from_sums(sums, &[2, 0], &data, &mut rng);
        assert_eq!(means[0], vec![2.0, 2.0]);
        assert!(data.contains(&means[1]));
    }

    #[test]
    fn convergence_uses_strict_tolerance() {
        let old = vec![vec![0.0, 0.0]];
        let new = vec![vec![3.0, 4.0]];
        assert!(!converged(&old, &new, 5.0));
        assert!(converged(&old, &new, 5.0 + 1e-6));
        assert!(converged(&old, &old, 1e-9));
        assert!(!converged(&old, &old, 0.0));
    }

    #[test]
    fn validation_rejects_ragged_rows() {
        let data = vec![vec![0.0, 0.0], vec![1.0]];
        assert!(matches!(
            validate_lloyd(&data, 1, 10, 1e-4),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }
}
