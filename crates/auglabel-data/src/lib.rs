//! # auglabel data
//!
//! Datasets whose samples are relabeled on every access by the transform
//! combination applied to them, plus the loaders and readers around them.
//!
//! - [`AugmentedDataset`]: base dataset + class catalog
//! - [`DataLoader`]: seeded, shuffled, multi-threaded batching
//! - [`CifarDataset`]: CIFAR-10 / CIFAR-100 binary reader
//! - [`compute_mean_std`]: per-channel normalization statistics
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use auglabel_core::prelude::*;
//! use auglabel_data::{AugmentedDataset, DataLoader, InMemoryDataset, LoaderConfig};
//! use auglabel_transforms::{ClassCatalog, ComboLimit, TransformRegistry};
//!
//! let base: InMemoryDataset = (0..6)
//!     .map(|i| (Image::filled(8, 8, [i * 40, 0, 0]), i as usize % 2))
//!     .collect();
//! let units = TransformRegistry::new().select(["hflip", "invert"]).unwrap();
//! let catalog = ClassCatalog::enumerate(&units, ComboLimit::All, Normalization::cifar100());
//!
//! let dataset = AugmentedDataset::new(base, Arc::new(catalog));
//! let loader = DataLoader::new(dataset, LoaderConfig::default().with_batch_size(4)).unwrap();
//!
//! let batch = loader.iter().next().unwrap().unwrap();
//! assert_eq!(batch.images.shape(), &[4, 3, 8, 8]);
//! assert!(batch.synthetic_labels.iter().all(|l| l.unwrap() < 4));
//! ```

mod augmented;
pub mod cifar;
pub mod error;
mod loader;
mod memory;
mod stats;

pub use augmented::AugmentedDataset;
pub use cifar::{CifarDataset, CifarVariant, Split};
pub use error::{DataError, DataResult};
pub use loader::{keyed_rng, DataLoader, LoaderConfig, Pass};
pub use memory::{InMemoryDataset, Subset};
pub use stats::{compute_mean_std, ChannelStats};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{AugmentedDataset, CifarDataset, CifarVariant, DataLoader, LoaderConfig, Split};
    pub use crate::{compute_mean_std, ChannelStats, InMemoryDataset, Subset};
    pub use crate::{DataError, DataResult};
}
