//! # auglabel core
//!
//! Shared types and collaborator traits for training image classifiers whose
//! labels come from *which augmentation was applied* rather than from image
//! content.
//!
//! - [`Image`](types::Image): an 8-bit RGB raster as produced by a base dataset
//! - [`ImageTensor`](types::ImageTensor): a normalized channel-first `f32` tensor fed to models
//! - [`Batch`](types::Batch): stacked tensors with true and synthetic labels
//! - [`BaseDataset`](dataset::BaseDataset), [`BatchLoader`](dataset::BatchLoader): data collaborators
//! - [`FeatureExtractor`](model::FeatureExtractor), [`Classifier`](model::Classifier): opaque model collaborators
//!
//! ## Quick Start
//!
//! ```rust
//! use auglabel_core::prelude::*;
//!
//! let image = Image::filled(2, 2, [255, 0, 0]);
//! let tensor = Normalization::cifar100().apply(&image);
//! assert_eq!(tensor.shape(), [3, 2, 2]);
//! ```

pub mod dataset;
pub mod error;
pub mod model;
pub mod prelude;
pub mod types;
