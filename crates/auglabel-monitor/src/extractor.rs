//! Built-in feature extractors.

use auglabel_core::prelude::*;
use ndarray::{Array2, ArrayView4};

/// Flattens each (C × H × W) image into a raw pixel vector.
///
/// Lets the kNN monitor run in pixel space without a trained model.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenExtractor;

impl FeatureExtractor for FlattenExtractor {
    fn extract(&self, images: ArrayView4<'_, f32>) -> Result<Array2<f32>> {
        let (b, c, h, w) = images.dim();
        let mut out = Array2::<f32>::zeros((b, c * h * w));
        for (mut row, image) in out.outer_iter_mut().zip(images.outer_iter()) {
            for (dst, src) in row.iter_mut().zip(image.iter()) {
                *dst = *src;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_flatten_row_major() {
        let images = Array4::from_shape_fn((2, 3, 2, 2), |(b, c, y, x)| {
            (b * 100 + c * 10 + y * 2 + x) as f32
        });
        let features = FlattenExtractor.extract(images.view()).unwrap();
        assert_eq!(features.shape(), &[2, 12]);
        assert_eq!(features[[0, 0]], 0.0);
        assert_eq!(features[[0, 5]], 11.0);
        assert_eq!(features[[1, 11]], 123.0);
    }
}
