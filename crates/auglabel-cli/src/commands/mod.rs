//! CLI command implementations.

pub mod catalog;
pub mod init;
pub mod knn;
pub mod sample;
pub mod stats;

use anyhow::{Context, Result};
use auglabel::prelude::*;

use crate::config::Config;

/// Load one split of the configured CIFAR release.
pub(crate) fn load_split(config: &Config, split: Split) -> Result<CifarDataset> {
    CifarDataset::load(&config.data.dir, config.data.dataset, split).with_context(|| {
        format!(
            "Failed to load {} {} split from {}",
            config.data.dataset,
            split,
            config.data.dir.display()
        )
    })
}
