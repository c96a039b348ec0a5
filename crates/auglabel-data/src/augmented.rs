//! Dataset wrapper that relabels every sample by its transform combination.

use std::sync::Arc;

use auglabel_core::prelude::*;
use auglabel_transforms::ClassCatalog;
use rand::Rng;

/// Wraps a [`BaseDataset`] and a shared [`ClassCatalog`].
///
/// Nothing is cached: every [`get`](Self::get) draws a fresh synthetic label
/// and fresh transform randomness from the RNG it is handed, so the same index
/// yields different samples unless the caller reseeds.
#[derive(Debug, Clone)]
pub struct AugmentedDataset<D> {
    base: D,
    catalog: Arc<ClassCatalog>,
}

impl<D: BaseDataset> AugmentedDataset<D> {
    pub fn new(base: D, catalog: Arc<ClassCatalog>) -> Self {
        Self { base, catalog }
    }

    /// Identity-plus-normalization only: every sample gets synthetic label 0
    /// and its pixels are untouched apart from normalization.
    pub fn plain(base: D, normalization: Normalization) -> Self {
        Self::new(base, Arc::new(ClassCatalog::plain(normalization)))
    }

    /// Same count as the wrapped dataset, whatever the catalog size.
    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn base(&self) -> &D {
        &self.base
    }

    pub fn catalog(&self) -> &Arc<ClassCatalog> {
        &self.catalog
    }

    /// Fetch sample `index`, draw a class, and apply its combination.
    ///
    /// With an empty catalog the raw image comes back as an unnormalized
    /// `[0, 1]` tensor with no synthetic label. Transform failures are
    /// returned unchanged.
    pub fn get<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Result<AugmentedSample> {
        let len = self.base.len();
        if index >= len {
            return Err(AugError::index_out_of_range(index, len));
        }
        let (raw, true_label) = self.base.get(index)?;

        let Some(label) = self.catalog.sample_label(rng) else {
            return Ok(AugmentedSample {
                image: ImageTensor::from_image(&raw),
                true_label,
                synthetic_label: None,
            });
        };

        let combination = self
            .catalog
            .get(label)
            .ok_or_else(|| AugError::index_out_of_range(label, self.catalog.len()))?;
        let image = combination.apply(&raw, rng)?;

        Ok(AugmentedSample {
            image,
            true_label,
            synthetic_label: Some(label),
        })
    }
}
