//! Core data types shared across auglabel crates.

use image::{Rgb, RgbImage};
use ndarray::{Array3, Array4, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{AugError, ConfigError, ConsistencyError, Result, TransformError};

/// Number of color channels in every image.
pub const CHANNELS: usize = 3;

/// Per-channel mean of the CIFAR-100 training split, in [0, 1] scale.
pub const CIFAR100_TRAIN_MEAN: [f32; CHANNELS] = [0.507_075_16, 0.486_548_87, 0.440_917_84];
/// Per-channel std of the CIFAR-100 training split, in [0, 1] scale.
pub const CIFAR100_TRAIN_STD: [f32; CHANNELS] = [0.267_334_29, 0.256_438_46, 0.276_150_47];
/// Per-channel mean of the CIFAR-10 training split, in [0, 1] scale.
pub const CIFAR10_TRAIN_MEAN: [f32; CHANNELS] = [0.491_4, 0.482_2, 0.446_5];
/// Per-channel std of the CIFAR-10 training split, in [0, 1] scale.
pub const CIFAR10_TRAIN_STD: [f32; CHANNELS] = [0.247_0, 0.243_5, 0.261_6];

// ============================================================================
// Image
// ============================================================================

/// An 8-bit RGB raster backed by [`image::RgbImage`].
///
/// This is the form a base dataset hands out and the form every transform
/// unit consumes and produces. Coordinates are `usize` on this API and
/// converted at the `image` boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    buffer: RgbImage,
}

impl Image {
    /// Create an image from an interleaved RGB buffer.
    ///
    /// The buffer length must be `width * height * 3`.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        let expected = width * height * CHANNELS;
        let actual = pixels.len();
        let (w, h) = dims(width, height)?;
        match RgbImage::from_raw(w, h, pixels) {
            Some(buffer) if actual == expected => Ok(Self { buffer }),
            _ => Err(TransformError::MalformedImage { expected, actual }.into()),
        }
    }

    /// Create an image with every pixel set to `rgb`.
    pub fn filled(width: usize, height: usize, rgb: [u8; CHANNELS]) -> Self {
        Self::from_fn(width, height, |_, _| rgb)
    }

    /// Create an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> [u8; CHANNELS],
    ) -> Self {
        let buffer = RgbImage::from_fn(width as u32, height as u32, |x, y| {
            Rgb(f(x as usize, y as usize))
        });
        Self { buffer }
    }

    /// Create an image from planar (channel-first) bytes, as stored by CIFAR.
    pub fn from_planar(width: usize, height: usize, planes: &[u8]) -> Result<Self> {
        let plane = width * height;
        let expected = plane * CHANNELS;
        if planes.len() != expected {
            return Err(TransformError::MalformedImage {
                expected,
                actual: planes.len(),
            }
            .into());
        }
        let mut pixels = Vec::with_capacity(expected);
        for i in 0..plane {
            for c in 0..CHANNELS {
                pixels.push(planes[c * plane + i]);
            }
        }
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> usize {
        self.buffer.width() as usize
    }

    pub fn height(&self) -> usize {
        self.buffer.height() as usize
    }

    /// True when the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.buffer.width() == 0 || self.buffer.height() == 0
    }

    /// Interleaved RGB bytes.
    pub fn pixels(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.buffer.into_raw()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.buffer
    }

    pub fn as_rgb_mut(&mut self) -> &mut RgbImage {
        &mut self.buffer
    }

    pub fn into_rgb(self) -> RgbImage {
        self.buffer
    }

    /// RGB value at column `x`, row `y`.
    ///
    /// Panics if the coordinates are outside the image.
    pub fn get(&self, x: usize, y: usize) -> [u8; CHANNELS] {
        self.buffer.get_pixel(x as u32, y as u32).0
    }

    /// Set the RGB value at column `x`, row `y`.
    pub fn set(&mut self, x: usize, y: usize, rgb: [u8; CHANNELS]) {
        self.buffer.put_pixel(x as u32, y as u32, Rgb(rgb));
    }
}

impl From<RgbImage> for Image {
    fn from(buffer: RgbImage) -> Self {
        Self { buffer }
    }
}

fn dims(width: usize, height: usize) -> Result<(u32, u32)> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(AugError::invalid_parameter(
            "image",
            format!("{}x{} exceeds the u32 raster limit", width, height),
        )),
    }
}

// ============================================================================
// Tensors
// ============================================================================

/// A channel-first `f32` image tensor (C × H × W).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Array3<f32>,
}

impl ImageTensor {
    /// Convert bytes to `f32` in [0, 1], channel-first, without normalization.
    pub fn from_image(image: &Image) -> Self {
        let (w, h) = (image.width(), image.height());
        let pixels = image.pixels();
        let data = Array3::from_shape_fn((CHANNELS, h, w), |(c, y, x)| {
            pixels[(y * w + x) * CHANNELS + c] as f32 / 255.0
        });
        Self { data }
    }

    pub fn from_array(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// `[channels, height, width]`.
    pub fn shape(&self) -> [usize; 3] {
        let s = self.data.shape();
        [s[0], s[1], s[2]]
    }

    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    pub fn into_array(self) -> Array3<f32> {
        self.data
    }
}

/// Per-channel normalization applied as the fixed final step of every
/// transform combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    mean: [f32; CHANNELS],
    std: [f32; CHANNELS],
}

impl Normalization {
    /// Create a normalization step. Every std must be finite and positive.
    pub fn new(mean: [f32; CHANNELS], std: [f32; CHANNELS]) -> Result<Self> {
        for (c, m) in mean.iter().enumerate() {
            if !m.is_finite() {
                return Err(AugError::invalid_config(
                    format!("mean[{}]", c),
                    m.to_string(),
                    "must be finite",
                ));
            }
        }
        for (c, s) in std.iter().enumerate() {
            if !s.is_finite() || *s <= 0.0 {
                return Err(AugError::Config(ConfigError::InvalidValue {
                    field: format!("std[{}]", c),
                    value: s.to_string(),
                    reason: "must be finite and positive".to_string(),
                }));
            }
        }
        Ok(Self { mean, std })
    }

    /// CIFAR-100 training statistics.
    pub fn cifar100() -> Self {
        Self {
            mean: CIFAR100_TRAIN_MEAN,
            std: CIFAR100_TRAIN_STD,
        }
    }

    /// CIFAR-10 training statistics.
    pub fn cifar10() -> Self {
        Self {
            mean: CIFAR10_TRAIN_MEAN,
            std: CIFAR10_TRAIN_STD,
        }
    }

    /// Zero mean, unit std: leaves the [0, 1] tensor unchanged.
    pub fn identity() -> Self {
        Self {
            mean: [0.0; CHANNELS],
            std: [1.0; CHANNELS],
        }
    }

    pub fn mean(&self) -> [f32; CHANNELS] {
        self.mean
    }

    pub fn std(&self) -> [f32; CHANNELS] {
        self.std
    }

    /// Tensor conversion followed by `(x - mean[c]) / std[c]`.
    pub fn apply(&self, image: &Image) -> ImageTensor {
        let mut tensor = ImageTensor::from_image(image);
        for (c, mut plane) in tensor.data.axis_iter_mut(Axis(0)).enumerate() {
            let (m, s) = (self.mean[c], self.std[c]);
            plane.mapv_inplace(|v| (v - m) / s);
        }
        tensor
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self::cifar100()
    }
}

// ============================================================================
// Samples and batches
// ============================================================================

/// One access of an augmented dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedSample {
    /// Transformed and normalized image.
    pub image: ImageTensor,
    /// Semantic label from the base dataset.
    pub true_label: usize,
    /// Index of the combination that produced `image`, if a catalog was set.
    pub synthetic_label: Option<usize>,
}

/// Stacked samples: images as (B × C × H × W) with labels in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub images: Array4<f32>,
    pub true_labels: Vec<usize>,
    pub synthetic_labels: Vec<Option<usize>>,
}

impl Batch {
    /// Stack samples in order. All images must share one shape.
    pub fn stack(samples: Vec<AugmentedSample>) -> Result<Self> {
        let first = match samples.first() {
            Some(s) => s.image.shape(),
            None => return Err(AugError::empty_loader("batch")),
        };

        let mut images = Array4::<f32>::zeros((samples.len(), first[0], first[1], first[2]));
        let mut true_labels = Vec::with_capacity(samples.len());
        let mut synthetic_labels = Vec::with_capacity(samples.len());

        for (i, sample) in samples.into_iter().enumerate() {
            let shape = sample.image.shape();
            if shape != first {
                return Err(ConsistencyError::ShapeMismatch {
                    expected: first.to_vec(),
                    actual: shape.to_vec(),
                }
                .into());
            }
            images.index_axis_mut(Axis(0), i).assign(&sample.image.view());
            true_labels.push(sample.true_label);
            synthetic_labels.push(sample.synthetic_label);
        }

        Ok(Self {
            images,
            true_labels,
            synthetic_labels,
        })
    }

    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.true_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.true_labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_rejects_bad_buffer() {
        let result = Image::new(2, 2, vec![0; 11]);
        assert!(matches!(
            result,
            Err(AugError::Transform(TransformError::MalformedImage {
                expected: 12,
                actual: 11
            }))
        ));
    }

    #[test]
    fn test_image_wraps_rgb_buffer() {
        let raw = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, 9]));
        let mut img = Image::from(raw.clone());
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.get(2, 1), [2, 1, 9]);
        assert_eq!(img.pixels(), raw.as_raw().as_slice());

        img.set(0, 0, [7, 7, 7]);
        assert_eq!(img.as_rgb().get_pixel(0, 0), &Rgb([7, 7, 7]));
        assert_eq!(img.into_rgb().dimensions(), (3, 2));
    }

    #[test]
    fn test_from_planar_interleaves() {
        // 2x1 image: R plane [1, 2], G plane [3, 4], B plane [5, 6]
        let img = Image::from_planar(2, 1, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(img.get(0, 0), [1, 3, 5]);
        assert_eq!(img.get(1, 0), [2, 4, 6]);
    }

    #[test]
    fn test_normalization_applies_per_channel() {
        let img = Image::filled(1, 1, [255, 0, 51]);
        let norm = Normalization::new([0.5, 0.5, 0.0], [0.5, 0.25, 0.2]).unwrap();
        let t = norm.apply(&img);
        let v = t.view();
        assert!((v[[0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((v[[1, 0, 0]] + 2.0).abs() < 1e-6);
        assert!((v[[2, 0, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalization_rejects_zero_std() {
        let err = Normalization::new([0.0; 3], [1.0, 0.0, 1.0]).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_batch_stack_keeps_order() {
        let samples: Vec<_> = (0..3)
            .map(|i| AugmentedSample {
                image: ImageTensor::from_image(&Image::filled(2, 2, [i as u8; 3])),
                true_label: i,
                synthetic_label: Some(2 - i),
            })
            .collect();
        let batch = Batch::stack(samples).unwrap();
        assert_eq!(batch.images.shape(), &[3, 3, 2, 2]);
        assert_eq!(batch.true_labels, vec![0, 1, 2]);
        assert_eq!(batch.synthetic_labels, vec![Some(2), Some(1), Some(0)]);
        assert!((batch.images[[2, 0, 1, 1]] - 2.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_batch_stack_rejects_mixed_shapes() {
        let a = AugmentedSample {
            image: ImageTensor::from_image(&Image::filled(2, 2, [0; 3])),
            true_label: 0,
            synthetic_label: None,
        };
        let b = AugmentedSample {
            image: ImageTensor::from_image(&Image::filled(3, 2, [0; 3])),
            true_label: 0,
            synthetic_label: None,
        };
        let err = Batch::stack(vec![a, b]).unwrap_err();
        assert!(err.is_consistency());
    }
}
