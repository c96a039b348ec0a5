//! Per-channel dataset statistics.

use auglabel_core::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mean and population standard deviation per channel, in `[0, 1]` scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub mean: [f32; CHANNELS],
    pub std: [f32; CHANNELS],
    /// Images visited.
    pub samples: usize,
}

impl ChannelStats {
    /// Normalization using these statistics.
    pub fn normalization(&self) -> Result<Normalization> {
        Normalization::new(self.mean, self.std)
    }
}

/// Compute per-channel mean and std over every pixel of every image.
pub fn compute_mean_std<D: BaseDataset + ?Sized>(dataset: &D) -> Result<ChannelStats> {
    if dataset.is_empty() {
        return Err(AugError::empty_loader(dataset.name()));
    }

    let mut sum = [0f64; CHANNELS];
    let mut sum_sq = [0f64; CHANNELS];
    let mut count = 0u64;

    for index in 0..dataset.len() {
        let (image, _) = dataset.get(index)?;
        for px in image.pixels().chunks_exact(CHANNELS) {
            for c in 0..CHANNELS {
                let v = px[c] as f64 / 255.0;
                sum[c] += v;
                sum_sq[c] += v * v;
            }
        }
        count += (image.width() * image.height()) as u64;
    }

    if count == 0 {
        return Err(AugError::empty_loader(format!("{} (zero-sized images)", dataset.name())));
    }

    let n = count as f64;
    let mut mean = [0f32; CHANNELS];
    let mut std = [0f32; CHANNELS];
    for c in 0..CHANNELS {
        let m = sum[c] / n;
        let var = (sum_sq[c] / n - m * m).max(0.0);
        mean[c] = m as f32;
        std[c] = var.sqrt() as f32;
    }

    debug!(dataset = dataset.name(), pixels = count, ?mean, ?std, "computed channel statistics");
    Ok(ChannelStats {
        mean,
        std,
        samples: dataset.len(),
    })
}
