//! Timing harness.
//!
//! Runs a fixed number of timed trials of a [`Fittable`] over one dataset. Every trial
//! builds a fresh instance through the caller's factory, so no state leaks between
//! trials, and only the `fit` call is inside the timed region.
//!
//! Trials run strictly one after another on the calling thread. Any parallelism belongs
//! to the algorithm under test, never to the harness.
//!
//! A failing trial aborts the whole run. A partially completed timing run has no valid
//! interpretation, so nothing is caught or retried.

use std::time::Instant;

use tracing::{debug, info};

use crate::cluster::Fittable;
use crate::error::{Error, Result};

/// Outcome of one timed trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingRecord {
    /// Wall-clock duration of the `fit` call in milliseconds.
    pub elapsed_time_ms: f64,
    /// Iterations the algorithm reported (at least 1).
    pub iterations: u64,
}

/// Mean, fastest and slowest fit time of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl RunSummary {
    /// Summarize `records`; `None` when there are none.
    pub fn from_records(records: &[TimingRecord]) -> Option<Self> {
        let first = records.first()?.elapsed_time_ms;
        let (sum, min_ms, max_ms) = records.iter().map(|r| r.elapsed_time_ms).fold(
            (0.0, first, first),
            |(sum, lo, hi), t| (sum + t, lo.min(t), hi.max(t)),
        );
        Some(Self {
            mean_ms: sum / records.len() as f64,
            min_ms,
            max_ms,
        })
    }
}

/// Sequential trial runner.
#[derive(Debug, Clone)]
pub struct TimingHarness {
    trials: usize,
    warmup: usize,
}

impl TimingHarness {
    /// A harness producing `trials` records per run, without warm-up.
    pub fn new(trials: usize) -> Self {
        Self { trials, warmup: 0 }
    }

    /// Run `warmup` extra trials before the measured ones and discard their timings.
    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    /// Number of measured trials.
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Number of discarded warm-up trials.
    pub fn warmup(&self) -> usize {
        self.warmup
    }

    /// Time `trials` fits of freshly constructed algorithms over `data`.
    ///
    /// Returns exactly `trials` records in trial order.
    pub fn run<F, M>(&self, mut factory: F, data: &[Vec<f32>]) -> Result<Vec<TimingRecord>>
    where
        F: FnMut() -> M,
        M: Fittable,
    {
        if self.trials == 0 {
            return Err(Error::InvalidParameter {
                name: "trials",
                message: "must be at least 1",
            });
        }

        info!(
            trials = self.trials,
            warmup = self.warmup,
            points = data.len(),
            "starting timing run"
        );

        let mut records = Vec::with_capacity(self.trials);
        for trial in 0..self.warmup + self.trials {
            let mut model = factory();

            let start = Instant::now();
            let iterations = model.fit(data).map_err(|source| Error::Trial {
                trial,
                source: Box::new(source),
            })?;
            let elapsed_time_ms = start.elapsed().as_secs_f64() * 1000.0;

            if iterations == 0 {
                return Err(Error::InvalidIterationCount { trial, iterations });
            }

            if trial < self.warmup {
                debug!(trial, elapsed_time_ms, iterations, "warm-up trial discarded");
                continue;
            }
            debug!(trial, elapsed_time_ms, iterations, "trial finished");
            records.push(TimingRecord {
                elapsed_time_ms,
                iterations: iterations as u64,
            });
        }

        if let Some(s) = RunSummary::from_records(&records) {
            info!(
                trials = records.len(),
                mean_ms = s.mean_ms,
                min_ms = s.min_ms,
                max_ms = s.max_ms,
                "timing run finished"
            );
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Fixed(usize);

    impl Fittable for Fixed {
        fn fit(&mut self, _data: &[Vec<f32>]) -> Result<usize> {
            Ok(self.0)
        }
    }

    struct FailOn {
        call: usize,
        calls: Rc<Cell<usize>>,
    }

    impl Fittable for FailOn {
        fn fit(&mut self, _data: &[Vec<f32>]) -> Result<usize> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if n == self.call {
                Err(Error::Other("diverged".into()))
            } else {
                Ok(3)
            }
        }
    }

    #[test]
    fn produces_one_record_per_trial() {
        let data = vec![vec![0.0]];
        let records = TimingHarness::new(5).run(|| Fixed(7), &data).unwrap();
        assert_eq!(records.len(), 5);
        for r in &records {
            assert_eq!(r.iterations, 7);
            assert!(r.elapsed_time_ms >= 0.0);
        }
    }

    #[test]
    fn warmup_trials_are_run_but_discarded() {
        let data = vec![vec![0.0]];
        let built = Rc::new(Cell::new(0));
        let counter = Rc::clone(&built);
        let records = TimingHarness::new(3)
            .with_warmup(2)
            .run(
                move || {
                    counter.set(counter.get() + 1);
                    Fixed(1)
                },
                &data,
            )
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(built.get(), 5);
    }

    #[test]
    fn failing_trial_aborts_without_retry() {
        let data = vec![vec![0.0]];
        let calls = Rc::new(Cell::new(0));
        let shared = Rc::clone(&calls);
        let err = TimingHarness::new(10)
            .run(
                move || FailOn {
                    call: 2,
                    calls: Rc::clone(&shared),
                },
                &data,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Trial { trial: 2, .. }));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let data = vec![vec![0.0]];
        let err = TimingHarness::new(2).run(|| Fixed(0), &data).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidIterationCount {
                trial: 0,
                iterations: 0
            }
        ));
    }

    #[test]
    fn summary_reports_mean_min_and_max() {
        let records: Vec<TimingRecord> = [4.0, 1.0, 7.0]
            .into_iter()
            .map(|elapsed_time_ms| TimingRecord {
                elapsed_time_ms,
                iterations: 1,
            })
            .collect();
        let s = RunSummary::from_records(&records).unwrap();
        assert_eq!(s.mean_ms, 4.0);
        assert_eq!(s.min_ms, 1.0);
        assert_eq!(s.max_ms, 7.0);
        assert_eq!(RunSummary::from_records(&[]), None);
    }

    #[test]
    fn zero_trials_is_a_parameter_error() {
        let data = vec![vec![0.0]];
        assert!(TimingHarness::new(0).run(|| Fixed(1), &data).is_err());
    }
}
