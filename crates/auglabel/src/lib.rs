//! # auglabel
//!
//! Self-supervised labels from augmentations: every sample is assigned the
//! index of the transform combination applied to it, and a classifier learns
//! to recognize which combination that was.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use auglabel::prelude::*;
//!
//! // Every subset of {hflip, grayscale}: 4 synthetic classes
//! let units = TransformRegistry::new().select(["hflip", "grayscale"]).unwrap();
//! let catalog = ClassCatalog::enumerate_signed(&units, -1, Normalization::cifar100()).unwrap();
//! assert_eq!(catalog.len(), 4);
//!
//! // Wrap a base dataset; each access draws a class and applies it
//! let base: InMemoryDataset = (0..8u8)
//!     .map(|i| (Image::filled(4, 4, [i * 30, 0, 255 - i * 30]), usize::from(i % 2)))
//!     .collect();
//! let train = DataLoader::new(
//!     AugmentedDataset::new(base, Arc::new(catalog)),
//!     LoaderConfig::default().with_batch_size(4).with_shuffle(true).with_seed(1),
//! )
//! .unwrap();
//!
//! for batch in train.iter() {
//!     let batch = batch.unwrap();
//!     assert_eq!(batch.images.shape(), &[4, 3, 4, 4]);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`auglabel_core`]: images, tensors, batches, collaborator traits, errors
//! - [`auglabel_transforms`]: transform registry, units, class catalog
//! - [`auglabel_data`]: augmented dataset, loader, CIFAR reader
//! - `auglabel_monitor`: kNN monitor and evaluation (feature `monitor`)
//!
//! ## Class Catalog Order
//!
//! | Label | Combination |
//! |-------|-------------|
//! | 0 | identity |
//! | 1 | hflip |
//! | 2 | grayscale |
//! | 3 | hflip+grayscale |
//!
//! Sizes ascend; within a size, subsets follow the vocabulary order
//! (crop, hflip, vflip, rotate, invert, blur, solarize, grayscale,
//! colorjitter).

// Re-export all subcrates
pub use auglabel_core as core;
pub use auglabel_data as data;
pub use auglabel_transforms as transforms;

#[cfg(feature = "monitor")]
pub use auglabel_monitor as monitor;

/// Prelude module for convenient imports.
///
/// ```rust
/// use auglabel::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use auglabel_core::prelude::*;

    // Transforms
    pub use auglabel_transforms::{
        ClassCatalog, ComboLimit, Combination, TransformKind, TransformRegistry, TransformUnit,
    };

    // Data
    pub use auglabel_data::{
        compute_mean_std, AugmentedDataset, ChannelStats, CifarDataset, CifarVariant, DataError,
        DataLoader, DataResult, InMemoryDataset, LoaderConfig, Split, Subset,
    };

    // Monitor (requires "monitor" feature)
    #[cfg(feature = "monitor")]
    pub use auglabel_monitor::{
        evaluate_classifier, knn_monitor, EvalReport, FeatureBank, FlattenExtractor, KnnMonitor,
        KnnReport, MonitorSchedule,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
