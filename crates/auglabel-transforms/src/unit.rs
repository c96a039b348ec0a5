//! Transform units: tagged descriptors with their parameters.

use std::fmt;

use auglabel_core::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ops;
use crate::registry::TransformKind;

/// One configurable augmentation step.
///
/// Units are immutable values. Inclusion in a combination means the unit is
/// always run; any randomness (crop offset, rotation angle, blur sigma,
/// jitter factors, solarize probability) is drawn inside [`apply`](Self::apply)
/// from the RNG the caller passes in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformUnit {
    /// Zero-pad, then crop back to the original size at a random offset.
    Crop { padding: usize },
    HorizontalFlip,
    VerticalFlip,
    /// Rotate by an angle drawn from `[-degrees, degrees]`.
    Rotate { degrees: f32 },
    Invert,
    /// Gaussian blur with sigma drawn from `[sigma_min, sigma_max]`.
    Blur { sigma_min: f32, sigma_max: f32 },
    /// With probability `p`, invert values at or above `threshold`.
    Solarize { p: f64, threshold: u8 },
    Grayscale,
    ColorJitter {
        brightness: f32,
        contrast: f32,
        saturation: f32,
        hue: f32,
    },
}

impl TransformUnit {
    /// Which vocabulary entry this unit implements.
    pub fn kind(&self) -> TransformKind {
        match self {
            TransformUnit::Crop { .. } => TransformKind::Crop,
            TransformUnit::HorizontalFlip => TransformKind::HorizontalFlip,
            TransformUnit::VerticalFlip => TransformKind::VerticalFlip,
            TransformUnit::Rotate { .. } => TransformKind::Rotate,
            TransformUnit::Invert => TransformKind::Invert,
            TransformUnit::Blur { .. } => TransformKind::Blur,
            TransformUnit::Solarize { .. } => TransformKind::Solarize,
            TransformUnit::Grayscale => TransformKind::Grayscale,
            TransformUnit::ColorJitter { .. } => TransformKind::ColorJitter,
        }
    }

    /// Short name, as accepted in configuration.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Run the unit on `image`.
    pub fn apply<R: Rng + ?Sized>(&self, image: &Image, rng: &mut R) -> Result<Image> {
        match *self {
            TransformUnit::Crop { padding } => ops::random_crop(image, padding, rng),
            TransformUnit::HorizontalFlip => Ok(ops::horizontal_flip(image)),
            TransformUnit::VerticalFlip => Ok(ops::vertical_flip(image)),
            TransformUnit::Rotate { degrees } => ops::random_rotate(image, degrees, rng),
            TransformUnit::Invert => Ok(ops::invert(image)),
            TransformUnit::Blur { sigma_min, sigma_max } => {
                if !(sigma_min > 0.0 && sigma_min <= sigma_max) {
                    return Err(AugError::invalid_parameter(
                        "blur",
                        format!("sigma range [{}, {}] is empty", sigma_min, sigma_max),
                    ));
                }
                let sigma = rng.gen_range(sigma_min..=sigma_max);
                ops::gaussian_blur(image, sigma)
            }
            TransformUnit::Solarize { p, threshold } => {
                if rng.gen::<f64>() < p {
                    Ok(ops::solarize(image, threshold))
                } else {
                    Ok(image.clone())
                }
            }
            TransformUnit::Grayscale => Ok(ops::grayscale(image)),
            TransformUnit::ColorJitter {
                brightness,
                contrast,
                saturation,
                hue,
            } => ops::color_jitter(image, brightness, contrast, saturation, hue, rng),
        }
    }
}

impl fmt::Display for TransformUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
