//! A composed pipeline: an ordered list of units plus the fixed finalize step.

use std::fmt;

use auglabel_core::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::unit::TransformUnit;

/// One synthetic class: zero or more distinct units, always followed by
/// tensor conversion and normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    units: Vec<TransformUnit>,
    normalization: Normalization,
}

impl Combination {
    pub fn new(units: Vec<TransformUnit>, normalization: Normalization) -> Self {
        Self {
            units,
            normalization,
        }
    }

    /// The empty combination: normalization only.
    pub fn identity(normalization: Normalization) -> Self {
        Self::new(Vec::new(), normalization)
    }

    pub fn units(&self) -> &[TransformUnit] {
        &self.units
    }

    pub fn normalization(&self) -> &Normalization {
        &self.normalization
    }

    /// Number of flexible units (the finalize step is not counted).
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_identity(&self) -> bool {
        self.units.is_empty()
    }

    /// Run every unit in order, then finalize.
    ///
    /// A failing unit aborts the pipeline and its error is returned as is.
    pub fn apply<R: Rng + ?Sized>(&self, image: &Image, rng: &mut R) -> Result<ImageTensor> {
        let mut current: Option<Image> = None;
        for unit in &self.units {
            let next = unit.apply(current.as_ref().unwrap_or(image), rng)?;
            current = Some(next);
        }
        Ok(self.normalization.apply(current.as_ref().unwrap_or(image)))
    }

    /// `identity` or unit names joined by `+`, e.g. `hflip+grayscale`.
    pub fn describe(&self) -> String {
        if self.units.is_empty() {
            return "identity".to_string();
        }
        self.units
            .iter()
            .map(|u| u.name())
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_identity_only_normalizes() {
        let img = Image::filled(2, 2, [255, 0, 0]);
        let combo = Combination::identity(Normalization::identity());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let t = combo.apply(&img, &mut rng).unwrap();
        assert_eq!(t, ImageTensor::from_image(&img));
        assert_eq!(combo.describe(), "identity");
    }

    #[test]
    fn test_units_run_in_order() {
        let img = Image::filled(1, 1, [100, 100, 100]);
        let solarize = TransformUnit::Solarize {
            p: 1.0,
            threshold: 128,
        };
        let a = Combination::new(
            vec![TransformUnit::Invert, solarize],
            Normalization::identity(),
        );
        let b = Combination::new(
            vec![solarize, TransformUnit::Invert],
            Normalization::identity(),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // 100 -> 155 -> 100
        let ta = a.apply(&img, &mut rng).unwrap();
        // 100 -> 100 -> 155
        let tb = b.apply(&img, &mut rng).unwrap();
        assert!((ta.view()[[0, 0, 0]] - 100.0 / 255.0).abs() < 1e-6);
        assert!((tb.view()[[0, 0, 0]] - 155.0 / 255.0).abs() < 1e-6);
        assert_eq!(a.describe(), "invert+solarize");
    }

    #[test]
    fn test_unit_error_propagates() {
        let img = Image::new(0, 0, vec![]).unwrap();
        let combo = Combination::new(
            vec![TransformUnit::HorizontalFlip, TransformUnit::Crop { padding: 4 }],
            Normalization::cifar100(),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = combo.apply(&img, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            AugError::Transform(TransformError::EmptyImage(_))
        ));
    }
}
