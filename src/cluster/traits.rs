use crate::error::Result;

/// A clustering algorithm the timing harness can fit.
///
/// This is the only capability the harness relies on: fit the dataset and report how
/// many iterations it took to converge. Implementations are constructed fresh for every
/// trial, so `fit` is free to keep state on `self`.
pub trait Fittable {
    /// Fit the model on `data` and return the number of iterations performed (at least 1).
    fn fit(&mut self, data: &[Vec<f32>]) -> Result<usize>;
}

/// Common interface for hard clustering algorithms (one label per point).
pub trait Clustering {
    /// Fit the model (if needed) and return one cluster label per input point.
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;

    /// The configured number of clusters.
    fn n_clusters(&self) -> usize;
}
