//! auglabel core prelude: common imports in one `use`.
//!
//! ```rust
//! use auglabel_core::prelude::*;
//! ```

pub use crate::types::{
    AugmentedSample, Batch, Image, ImageTensor, Normalization, CHANNELS,
    CIFAR100_TRAIN_MEAN, CIFAR100_TRAIN_STD, CIFAR10_TRAIN_MEAN, CIFAR10_TRAIN_STD,
};

pub use crate::dataset::{BaseDataset, BatchLoader};

pub use crate::model::{Classifier, ClassifierOutput, FeatureExtractor};

pub use crate::error::{AugError, ConfigError, ConsistencyError, Result, TransformError};
