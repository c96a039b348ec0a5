//! Evaluation of a two-headed classifier on an augmented loader.

use std::time::{Duration, Instant};

use auglabel_core::prelude::*;
use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Metrics for one evaluation pass. Fractions are in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    /// Synthetic-head predictions equal to the drawn class.
    pub accuracy: f64,
    /// Mean over classes that were drawn at least once.
    pub mean_per_class_accuracy: f64,
    /// `None` for classes never drawn.
    pub per_class_accuracy: Vec<Option<f64>>,
    /// Online-head predictions equal to the true label.
    pub online_accuracy: f64,
    /// Mean cross-entropy of the synthetic head.
    pub loss: f64,
    /// Mean cross-entropy of the online head.
    pub online_loss: f64,
    pub samples: usize,
    pub elapsed: Duration,
}

/// Index of the largest value; the first one on ties.
pub fn argmax(row: ArrayView1<'_, f32>) -> usize {
    let mut best = 0;
    for (i, v) in row.iter().enumerate() {
        if *v > row[best] {
            best = i;
        }
    }
    best
}

/// `-log softmax(row)[target]`, computed with the max shift.
pub fn cross_entropy(row: ArrayView1<'_, f32>, target: usize) -> f64 {
    let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max) as f64;
    let sum: f64 = row.iter().map(|&v| (v as f64 - max).exp()).sum();
    max + sum.ln() - row[target] as f64
}

fn check_logits(logits: &ArrayView2<'_, f32>, rows: usize, classes: usize) -> Result<()> {
    if logits.nrows() != rows || logits.ncols() != classes {
        return Err(ConsistencyError::ShapeMismatch {
            expected: vec![rows, classes],
            actual: logits.shape().to_vec(),
        }
        .into());
    }
    Ok(())
}

/// Run `classifier` over every batch of `loader` and score both heads.
///
/// `num_classes` is the catalog size; the online head's width comes from the
/// first batch. Every sample must carry a synthetic label and the sample
/// total must match the loader's declared length.
pub fn evaluate_classifier<C, L>(
    classifier: &C,
    loader: &L,
    num_classes: usize,
) -> Result<EvalReport>
where
    C: Classifier + ?Sized,
    L: BatchLoader + ?Sized,
{
    if num_classes == 0 {
        return Err(AugError::invalid_config(
            "num_classes",
            "0",
            "catalog must have at least one class",
        ));
    }

    let start = Instant::now();
    let mut correct = 0usize;
    let mut correct_online = 0usize;
    let mut loss = 0f64;
    let mut loss_online = 0f64;
    let mut correct_per_class = vec![0usize; num_classes];
    let mut total_per_class = vec![0usize; num_classes];
    let mut online_classes: Option<usize> = None;
    let mut samples = 0usize;

    for batch in loader.batches() {
        let batch = batch?;
        let output = classifier.forward(batch.images.view())?;
        let synthetic = output.synthetic_logits.view();
        let online = output.online_logits.view();

        check_logits(&synthetic, batch.len(), num_classes)?;
        let width = *online_classes.get_or_insert(online.ncols());
        check_logits(&online, batch.len(), width)?;

        for (row, (logits, online_logits)) in synthetic
            .axis_iter(Axis(0))
            .zip(online.axis_iter(Axis(0)))
            .enumerate()
        {
            let target = batch.synthetic_labels[row].ok_or(
                ConsistencyError::MissingSyntheticLabel {
                    position: samples + row,
                },
            )?;
            if target >= num_classes {
                return Err(AugError::index_out_of_range(target, num_classes));
            }
            let truth = batch.true_labels[row];
            if truth >= width {
                return Err(AugError::index_out_of_range(truth, width));
            }

            let hit = argmax(logits) == target;
            correct += hit as usize;
            correct_per_class[target] += hit as usize;
            total_per_class[target] += 1;
            loss += cross_entropy(logits, target);

            correct_online += (argmax(online_logits) == truth) as usize;
            loss_online += cross_entropy(online_logits, truth);
        }

        samples += batch.len();
        debug!(batch = batch.len(), samples, "evaluated batch");
    }

    if samples == 0 {
        return Err(AugError::empty_loader("evaluation"));
    }
    let declared = loader.dataset_len();
    if samples != declared || total_per_class.iter().sum::<usize>() != declared {
        return Err(AugError::row_count_mismatch(declared, samples));
    }

    let per_class_accuracy: Vec<Option<f64>> = correct_per_class
        .iter()
        .zip(&total_per_class)
        .map(|(&c, &t)| (t > 0).then(|| c as f64 / t as f64))
        .collect();
    let drawn: Vec<f64> = per_class_accuracy.iter().flatten().copied().collect();
    let mean_per_class_accuracy = drawn.iter().sum::<f64>() / drawn.len() as f64;

    let n = samples as f64;
    let report = EvalReport {
        accuracy: correct as f64 / n,
        mean_per_class_accuracy,
        per_class_accuracy,
        online_accuracy: correct_online as f64 / n,
        loss: loss / n,
        online_loss: loss_online / n,
        samples,
        elapsed: start.elapsed(),
    };
    info!(
        accuracy = report.accuracy,
        mean_per_class = report.mean_per_class_accuracy,
        online_accuracy = report.online_accuracy,
        loss = report.loss,
        online_loss = report.online_loss,
        elapsed_secs = report.elapsed.as_secs_f64(),
        "evaluated classifier"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_argmax_first_on_ties() {
        assert_eq!(argmax(array![0.1f32, 0.9, 0.9].view()), 1);
        assert_eq!(argmax(array![-1.0f32].view()), 0);
    }

    #[test]
    fn test_cross_entropy_uniform() {
        let ce = cross_entropy(array![0.0f32, 0.0, 0.0, 0.0].view(), 2);
        assert!((ce - 4f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_cross_entropy_is_shift_invariant() {
        let a = cross_entropy(array![1.0f32, 2.0, 3.0].view(), 0);
        let b = cross_entropy(array![1001.0f32, 1002.0, 1003.0].view(), 0);
        assert!((a - b).abs() < 1e-4);
    }
}
