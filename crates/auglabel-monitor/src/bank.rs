//! Feature bank built from a memory loader.

use auglabel_core::prelude::*;
use ndarray::{s, Array2, ArrayView2};
use tracing::debug;

use crate::distance::first_non_finite_row;

/// Embeddings (N × D) paired row-for-row with their true labels.
///
/// Rebuilt from scratch on every monitoring call.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBank {
    features: Array2<f32>,
    labels: Vec<usize>,
}

impl FeatureBank {
    pub fn new(features: Array2<f32>, labels: Vec<usize>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(AugError::row_count_mismatch(labels.len(), features.nrows()));
        }
        if let Some(row) = first_non_finite_row(features.view()) {
            return Err(AugError::non_finite_feature("memory", row));
        }
        Ok(Self { features, labels })
    }

    /// Run `extractor` over every batch of `loader`, in loader order.
    ///
    /// The number of rows must equal the loader's declared dataset length.
    pub fn build<E, L>(extractor: &E, loader: &L) -> Result<Self>
    where
        E: FeatureExtractor + ?Sized,
        L: BatchLoader + ?Sized,
    {
        let declared = loader.dataset_len();
        let mut chunks: Vec<Array2<f32>> = Vec::new();
        let mut labels = Vec::with_capacity(declared);

        for batch in loader.batches() {
            let batch = batch?;
            let features = extract_batch(extractor, &batch)?;
            if let Some(first) = chunks.first() {
                if first.ncols() != features.ncols() {
                    return Err(ConsistencyError::ShapeMismatch {
                        expected: vec![batch.len(), first.ncols()],
                        actual: features.shape().to_vec(),
                    }
                    .into());
                }
            }
            chunks.push(features);
            labels.extend_from_slice(&batch.true_labels);
        }

        if labels.is_empty() {
            return Err(AugError::empty_loader("memory"));
        }
        if labels.len() != declared {
            return Err(AugError::row_count_mismatch(declared, labels.len()));
        }

        let dim = chunks.first().map_or(0, |c| c.ncols());
        let mut features = Array2::<f32>::zeros((labels.len(), dim));
        let mut offset = 0;
        for chunk in &chunks {
            let rows = chunk.nrows();
            features.slice_mut(s![offset..offset + rows, ..]).assign(chunk);
            offset += rows;
        }

        debug!(rows = features.nrows(), dim = features.ncols(), "built feature bank");
        Self::new(features, labels)
    }

    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Embedding dimension.
    pub fn dim(&self) -> usize {
        self.features.ncols()
    }
}

/// Extract one batch and check one embedding row per image.
pub(crate) fn extract_batch<E>(extractor: &E, batch: &Batch) -> Result<Array2<f32>>
where
    E: FeatureExtractor + ?Sized,
{
    let features = extractor.extract(batch.images.view())?;
    if features.nrows() != batch.len() {
        return Err(AugError::row_count_mismatch(batch.len(), features.nrows()));
    }
    Ok(features)
}
