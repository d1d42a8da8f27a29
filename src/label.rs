//! Parallelism labels.
//!
//! A label names the parallelism setting a harness run was measured under, usually a
//! thread count taken from `OMP_NUM_THREADS`. It is read once per process and passed
//! explicitly to everything that needs it.

use std::cmp::Ordering;
use std::fmt;

/// Environment variable the benchmark binary reads the label from by default.
pub const DEFAULT_LABEL_ENV: &str = "OMP_NUM_THREADS";

/// Text written for a run without a label.
const ABSENT: &str = "None";

/// The parallelism setting of a harness run.
///
/// Labels are compared numerically when both sides parse as numbers. Numeric labels
/// sort before free-form text, and an absent label sorts last.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ExperimentLabel(Option<String>);

impl ExperimentLabel {
    /// A label with the given text. Empty text or `None` means absent.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ABSENT {
            Self(None)
        } else {
            Self(Some(trimmed.to_string()))
        }
    }

    /// A run without a label.
    pub fn absent() -> Self {
        Self(None)
    }

    /// Read the label from an environment variable. A missing variable gives an absent label.
    pub fn from_env(var: &str) -> Self {
        std::env::var(var).map(Self::new).unwrap_or_default()
    }

    /// Raw label text, if any.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// The label interpreted as a number.
    pub fn as_number(&self) -> Option<f64> {
        self.0
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    /// The label interpreted as a positive thread count.
    pub fn thread_count(&self) -> Option<usize> {
        self.0
            .as_deref()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
    }
}

impl From<&str> for ExperimentLabel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<usize> for ExperimentLabel {
    fn from(value: usize) -> Self {
        Self(Some(value.to_string()))
    }
}

impl fmt::Display for ExperimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or(ABSENT))
    }
}

impl Ord for ExperimentLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => match (self.as_number(), other.as_number()) {
                (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => a.cmp(b),
            },
        }
    }
}

impl PartialOrd for ExperimentLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
