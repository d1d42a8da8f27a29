use std::collections::{BTreeMap, BTreeSet};

use crate::label::ExperimentLabel;

/// One cell of an aggregated table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    /// A finite value.
    Value(f64),
    /// No observation for this (label, tag) pair, or an undefined ratio.
    Missing,
    /// The value is infinite (e.g. throughput of a zero-length fit).
    Unbounded,
}

impl Cell {
    /// The finite value, if any.
    pub fn value(self) -> Option<f64> {
        match self {
            Cell::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Wrap a raw number: non-finite values become [`Cell::Unbounded`] or [`Cell::Missing`].
    pub fn from_f64(v: f64) -> Self {
        if v.is_finite() {
            Cell::Value(v)
        } else if v.is_nan() {
            Cell::Missing
        } else {
            Cell::Unbounded
        }
    }
}

/// One measured value before pivoting.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub label: ExperimentLabel,
    pub tag: String,
    pub value: Cell,
}

impl Observation {
    pub fn new(label: impl Into<ExperimentLabel>, tag: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            tag: tag.into(),
            value: Cell::from_f64(value),
        }
    }
}

/// A label × tag matrix.
///
/// Rows are the distinct labels in ascending order, columns the distinct tags in
/// ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedTable {
    labels: Vec<ExperimentLabel>,
    tags: Vec<String>,
    cells: Vec<Vec<Cell>>,
}

impl AggregatedTable {
    pub fn labels(&self) -> &[ExperimentLabel] {
        &self.labels
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Cells of row `i`, one per tag.
    pub fn row(&self, i: usize) -> &[Cell] {
        &self.cells[i]
    }

    /// The cell at (`label`, `tag`); [`Cell::Missing`] when either is unknown.
    pub fn get(&self, label: &ExperimentLabel, tag: &str) -> Cell {
        let Some(r) = self.labels.iter().position(|l| l == label) else {
            return Cell::Missing;
        };
        let Some(c) = self.tags.iter().position(|t| t == tag) else {
            return Cell::Missing;
        };
        self.cells[r][c]
    }
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
    unbounded: bool,
}

/// Group observations by (label, tag) and average each group.
///
/// A group containing an unbounded value is unbounded. Missing observations are
/// ignored by the mean, but still register their label and tag, so the row and
/// column exist. Pairs that were never observed stay [`Cell::Missing`], never zero.
pub fn pivot_mean<I>(observations: I) -> AggregatedTable
where
    I: IntoIterator<Item = Observation>,
{
    let mut labels = BTreeSet::new();
    let mut tags = BTreeSet::new();
    let mut groups: BTreeMap<(ExperimentLabel, String), Mean> = BTreeMap::new();

    for obs in observations {
        labels.insert(obs.label.clone());
        tags.insert(obs.tag.clone());
        let group = groups.entry((obs.label, obs.tag)).or_default();
        match obs.value {
            Cell::Value(v) => {
                group.sum += v;
                group.count += 1;
            }
            Cell::Unbounded => group.unbounded = true,
            Cell::Missing => {}
        }
    }

    let labels: Vec<ExperimentLabel> = labels.into_iter().collect();
    let tags: Vec<String> = tags.into_iter().collect();
    let cells = labels
        .iter()
        .map(|label| {
            tags.iter()
                .map(|tag| match groups.get(&(label.clone(), tag.clone())) {
                    Some(g) if g.unbounded => Cell::Unbounded,
                    Some(g) if g.count > 0 => Cell::Value(g.sum / g.count as f64),
                    _ => Cell::Missing,
                })
                .collect()
        })
        .collect();

    AggregatedTable {
        labels,
        tags,
        cells,
    }
}

/// Turn a fit-time table into speed-ups relative to its first row.
///
/// `speedup[label, tag] = time[first, tag] / time[label, tag]`, so the first row is
/// 1.0 in every column that has a baseline. A column whose baseline is not a
/// positive finite time is entirely [`Cell::Missing`].
pub fn normalize_speedup(fit_time: &AggregatedTable) -> AggregatedTable {
    let baselines: Vec<Option<f64>> = match fit_time.cells.first() {
        Some(first) => first
            .iter()
            .map(|c| c.value().filter(|&b| b > 0.0))
            .collect(),
        None => Vec::new(),
    };

    let cells = fit_time
        .cells
        .iter()
        .map(|row| {
            row.iter()
                .zip(&baselines)
                .map(|(cell, baseline)| match (baseline, cell) {
                    (None, _) => Cell::Missing,
                    (Some(_), Cell::Value(t)) if *t == 0.0 => Cell::Unbounded,
                    (Some(b), Cell::Value(t)) => Cell::from_f64(b / t),
                    (Some(_), Cell::Unbounded) => Cell::Value(0.0),
                    (Some(_), Cell::Missing) => Cell::Missing,
                })
                .collect()
        })
        .collect();

    AggregatedTable {
        labels: fit_time.labels.clone(),
        tags: fit_time.tags.clone(),
        cells,
    }
}

/// Iterations per second for one trial; a zero (or negative) duration is unbounded.
pub fn iterations_per_second(iterations: u64, elapsed_time_ms: f64) -> Cell {
    if elapsed_time_ms > 0.0 {
        Cell::from_f64(iterations as f64 / (elapsed_time_ms / 1000.0))
    } else {
        Cell::Unbounded
    }
}
