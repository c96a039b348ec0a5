//! Data collaborator traits.

use std::sync::Arc;

use crate::error::Result;
use crate::types::{Batch, Image};

/// Random-access container of `(image, true_label)` pairs.
///
/// Implementations must be `Send + Sync` so loaders can read from several
/// worker threads at disjoint indices.
pub trait BaseDataset: Send + Sync {
    /// Number of samples. Valid indices are `0..len()`.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch the raw image and its semantic label.
    fn get(&self, index: usize) -> Result<(Image, usize)>;

    /// Number of semantic classes, when known.
    fn num_classes(&self) -> Option<usize> {
        None
    }

    /// Human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}

impl<T: BaseDataset + ?Sized> BaseDataset for Arc<T> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Result<(Image, usize)> {
        (**self).get(index)
    }

    fn num_classes(&self) -> Option<usize> {
        (**self).num_classes()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: BaseDataset + ?Sized> BaseDataset for Box<T> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Result<(Image, usize)> {
        (**self).get(index)
    }

    fn num_classes(&self) -> Option<usize> {
        (**self).num_classes()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A source of batches over a dataset of declared length.
///
/// Batches must come out in a caller-controlled order and every pass must
/// cover each sample exactly once; consumers rely on image order matching
/// label order.
pub trait BatchLoader {
    /// Declared length of the underlying dataset.
    fn dataset_len(&self) -> usize;

    /// One full pass over the dataset.
    fn batches(&self) -> Box<dyn Iterator<Item = Result<Batch>> + '_>;
}
