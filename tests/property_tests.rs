use std::path::Path;

use kscale::aggregate::{normalize_speedup, pivot_mean, Cell, Observation};
use kscale::cluster::{Clustering, Fittable, Kmeans};
use kscale::store::{parse_rows, MemorySink};
use kscale::{ExperimentLabel, ResultStore, TimingHarness, TimingRecord};
use proptest::prelude::*;

struct Constant(usize);

impl Fittable for Constant {
    fn fit(&mut self, _data: &[Vec<f32>]) -> kscale::Result<usize> {
        Ok(self.0)
    }
}

proptest! {
    #[test]
    fn prop_kmeans_all_assigned(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 2), 1..20),
        k in 1usize..5
    ) {
        // Skip if k > n
        if k <= data.len() {
            let model = Kmeans::new(k).with_seed(42);
            let labels = model.fit_predict(&data).unwrap();

            prop_assert_eq!(labels.len(), data.len());
            for &l in &labels {
                prop_assert!(l < k);
            }
        }
    }

    #[test]
    fn prop_harness_yields_exactly_t_records(trials in 1usize..30, iters in 1usize..1000) {
        let data = vec![vec![0.0f32, 1.0]];
        let records = TimingHarness::new(trials).run(|| Constant(iters), &data).unwrap();
        prop_assert_eq!(records.len(), trials);
        for r in records {
            prop_assert!(r.elapsed_time_ms >= 0.0);
            prop_assert_eq!(r.iterations, iters as u64);
        }
    }

    #[test]
    fn prop_written_rows_read_back_unchanged(
        rows in prop::collection::vec((0.0f64..1e7, 1u64..100_000), 0..40),
        threads in 1usize..128
    ) {
        let records: Vec<TimingRecord> = rows
            .iter()
            .map(|&(elapsed_time_ms, iterations)| TimingRecord { elapsed_time_ms, iterations })
            .collect();
        let label = ExperimentLabel::from(threads);
        let mut store = ResultStore::new(MemorySink::new(), label.clone());
        store.ensure_and_append(&records).unwrap();

        let parsed = parse_rows(store.sink().contents(), Path::new("memory")).unwrap();
        prop_assert_eq!(parsed.len(), records.len());
        for (row, rec) in parsed.iter().zip(&records) {
            prop_assert_eq!(&row.label, &label);
            prop_assert_eq!(row.elapsed_time_ms, rec.elapsed_time_ms);
            prop_assert_eq!(row.iterations, rec.iterations);
        }
    }

    #[test]
    fn prop_speedup_baseline_is_one(
        times in prop::collection::vec(1e-3f64..1e6, 1..8),
        tags in prop::collection::vec("[a-z]{1,6}", 1..4)
    ) {
        let observations = tags.iter().flat_map(|tag| {
            times.iter().enumerate().map(move |(i, &t)| {
                Observation::new(ExperimentLabel::from(i + 1), tag.as_str(), t)
            })
        });
        let speedup = normalize_speedup(&pivot_mean(observations));
        let baseline = ExperimentLabel::from(1usize);
        for tag in speedup.tags() {
            match speedup.get(&baseline, tag) {
                Cell::Value(v) => prop_assert!((v - 1.0).abs() < 1e-9),
                other => prop_assert!(false, "baseline cell was {:?}", other),
            }
        }
    }
}
