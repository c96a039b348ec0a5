//! Opaque model collaborators.
//!
//! No network topology lives in this workspace; anything that maps an image
//! batch to logits or embeddings can be plugged in through these traits.

use ndarray::{Array2, ArrayView4};

use crate::error::Result;

/// Model in feature-extraction mode: (B × C × H × W) → (B × D).
pub trait FeatureExtractor {
    fn extract(&self, images: ArrayView4<'_, f32>) -> Result<Array2<f32>>;
}

/// Outputs of the two classifier heads for one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierOutput {
    /// (B × number of catalog entries).
    pub synthetic_logits: Array2<f32>,
    /// (B × number of semantic classes).
    pub online_logits: Array2<f32>,
}

/// Model in classification mode.
pub trait Classifier {
    fn forward(&self, images: ArrayView4<'_, f32>) -> Result<ClassifierOutput>;
}

impl<F> FeatureExtractor for F
where
    F: Fn(ArrayView4<'_, f32>) -> Result<Array2<f32>>,
{
    fn extract(&self, images: ArrayView4<'_, f32>) -> Result<Array2<f32>> {
        self(images)
    }
}
