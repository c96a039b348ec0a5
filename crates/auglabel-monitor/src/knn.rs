//! k-nearest-neighbor monitor.
//!
//! Embeds a labeled memory set, then classifies every query sample by a
//! majority vote over its `k` nearest memory rows in Euclidean distance.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use auglabel_core::prelude::*;
use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bank::{extract_batch, FeatureBank};
use crate::distance::{first_non_finite_row, squared_distances};

/// Indices of the `k` smallest values, nearest first.
///
/// Exact ties go to the lower index and NaN sorts last. `k` larger than the
/// column keeps every index.
pub fn top_k_smallest(column: ArrayView1<'_, f32>, k: usize) -> Vec<usize> {
    let cmp = |a: &usize, b: &usize| {
        let (x, y) = (column[*a], column[*b]);
        x.is_nan()
            .cmp(&y.is_nan())
            .then(x.total_cmp(&y))
            .then(a.cmp(b))
    };

    let mut idx: Vec<usize> = (0..column.len()).collect();
    if k == 0 {
        return Vec::new();
    }
    if k < idx.len() {
        idx.select_nth_unstable_by(k - 1, cmp);
        idx.truncate(k);
    }
    idx.sort_unstable_by(cmp);
    idx
}

/// Most frequent label; ties go to the smallest label.
pub fn majority_vote(labels: impl IntoIterator<Item = usize>) -> Option<usize> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut best: Option<(usize, usize)> = None;
    for (&label, &count) in &counts {
        match best {
            Some((_, top)) if top >= count => {}
            _ => best = Some((label, count)),
        }
    }
    best.map(|(label, _)| label)
}

/// Predict a label for every query row against `bank`.
pub fn knn_predict(
    bank: &FeatureBank,
    queries: ArrayView2<'_, f32>,
    k: usize,
) -> Result<Vec<usize>> {
    if k == 0 || k > bank.len() {
        return Err(k_out_of_range(k, bank.len()));
    }
    if let Some(row) = first_non_finite_row(queries) {
        return Err(AugError::non_finite_feature("query", row));
    }
    let distances = squared_distances(bank.features(), queries)?;
    let labels = bank.labels();

    let mut predictions = Vec::with_capacity(queries.nrows());
    for column in distances.axis_iter(Axis(1)) {
        let nearest = top_k_smallest(column, k);
        let vote = majority_vote(nearest.iter().map(|&i| labels[i]))
            .ok_or_else(|| AugError::empty_loader("memory"))?;
        predictions.push(vote);
    }
    Ok(predictions)
}

fn k_out_of_range(k: usize, population: usize) -> AugError {
    ConfigError::OutOfRange {
        field: "k".to_string(),
        min: 1.0,
        max: population as f64,
        value: k as f64,
    }
    .into()
}

/// Outcome of one monitoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnReport {
    pub correct: usize,
    pub total: usize,
    pub k: usize,
    /// Memory rows in the feature bank.
    pub memory: usize,
    pub elapsed: Duration,
}

impl KnnReport {
    /// Top-1 accuracy in `[0, 1]`.
    pub fn top1(&self) -> f64 {
        self.correct as f64 / self.total as f64
    }

    /// Top-1 accuracy in `[0, 100]`.
    pub fn percent(&self) -> f64 {
        self.top1() * 100.0
    }
}

/// kNN accuracy monitor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KnnMonitor {
    k: usize,
    /// Carried for configuration compatibility; plain voting ignores it.
    temperature: f32,
}

impl KnnMonitor {
    pub const DEFAULT_K: usize = 200;
    pub const DEFAULT_TEMPERATURE: f32 = 0.1;

    pub fn new(k: usize, temperature: f32) -> Result<Self> {
        if k == 0 {
            return Err(AugError::invalid_config("k", "0", "must be at least 1"));
        }
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(AugError::invalid_config(
                "temperature",
                temperature.to_string(),
                "must be finite and positive",
            ));
        }
        Ok(Self { k, temperature })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Embed `memory`, then classify every sample of `query`.
    ///
    /// `k` is checked against the memory set's declared length before any
    /// batch is read. Both loaders must be non-empty and produce exactly
    /// their declared number of rows.
    pub fn run<E, M, Q>(&self, extractor: &E, memory: &M, query: &Q) -> Result<KnnReport>
    where
        E: FeatureExtractor + ?Sized,
        M: BatchLoader + ?Sized,
        Q: BatchLoader + ?Sized,
    {
        let population = memory.dataset_len();
        if population == 0 {
            return Err(AugError::empty_loader("memory"));
        }
        if self.k > population {
            return Err(k_out_of_range(self.k, population));
        }
        if query.dataset_len() == 0 {
            return Err(AugError::empty_loader("query"));
        }

        let start = Instant::now();
        let bank = FeatureBank::build(extractor, memory)?;

        let mut correct = 0usize;
        let mut total = 0usize;
        for batch in query.batches() {
            let batch = batch?;
            let features = extract_batch(extractor, &batch)?;
            let predictions = knn_predict(&bank, features.view(), self.k)?;
            correct += predictions
                .iter()
                .zip(&batch.true_labels)
                .filter(|(p, t)| p == t)
                .count();
            total += batch.len();
            debug!(batch = batch.len(), correct, total, "scored query batch");
        }

        if total == 0 {
            return Err(AugError::empty_loader("query"));
        }
        if total != query.dataset_len() {
            return Err(AugError::row_count_mismatch(query.dataset_len(), total));
        }

        let report = KnnReport {
            correct,
            total,
            k: self.k,
            memory: bank.len(),
            elapsed: start.elapsed(),
        };
        info!(
            accuracy = report.top1(),
            k = self.k,
            memory = report.memory,
            queries = total,
            elapsed_secs = report.elapsed.as_secs_f64(),
            "kNN monitor finished"
        );
        Ok(report)
    }
}

impl Default for KnnMonitor {
    fn default() -> Self {
        Self {
            k: Self::DEFAULT_K,
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }
}

/// One-shot monitor returning top-1 accuracy as a percentage.
pub fn knn_monitor<E, M, Q>(
    extractor: &E,
    memory: &M,
    query: &Q,
    k: usize,
    temperature: f32,
) -> Result<f64>
where
    E: FeatureExtractor + ?Sized,
    M: BatchLoader + ?Sized,
    Q: BatchLoader + ?Sized,
{
    KnnMonitor::new(k, temperature)?
        .run(extractor, memory, query)
        .map(|r| r.percent())
}
