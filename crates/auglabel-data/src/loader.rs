//! Batching loader with seeded per-sample randomness and worker threads.
//!
//! Every sample is drawn with its own ChaCha generator keyed by the base seed,
//! the pass number and the dataset index. Workers therefore share no RNG, and
//! a pass produces identical batches for any worker count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use auglabel_core::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::augmented::AugmentedDataset;

const SAMPLE_STREAM: u64 = 0;
const SHUFFLE_STREAM: u64 = 1;

/// Loader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub batch_size: usize,
    pub shuffle: bool,
    /// Threads used to build a batch; 0 or 1 builds on the calling thread.
    pub num_workers: usize,
    pub seed: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 128,
            shuffle: false,
            num_workers: 0,
            seed: 0,
        }
    }
}

impl LoaderConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(AugError::invalid_config(
                "batch_size",
                "0",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Generator for one stream of one pass, fully determined by its key.
pub fn keyed_rng(seed: u64, pass: u64, stream: u64, index: u64) -> ChaCha8Rng {
    let mut key = [0u8; 32];
    key[..8].copy_from_slice(&seed.to_le_bytes());
    key[8..16].copy_from_slice(&pass.to_le_bytes());
    key[16..24].copy_from_slice(&stream.to_le_bytes());
    key[24..].copy_from_slice(&index.to_le_bytes());
    ChaCha8Rng::from_seed(key)
}

/// Iterates an [`AugmentedDataset`] in batches.
///
/// Each call to [`iter`](Self::iter) starts a new pass: the order is
/// reshuffled (when enabled) and every sample redraws its class.
#[derive(Debug)]
pub struct DataLoader<D> {
    dataset: AugmentedDataset<D>,
    config: LoaderConfig,
    passes: AtomicU64,
}

impl<D: BaseDataset> DataLoader<D> {
    pub fn new(dataset: AugmentedDataset<D>, config: LoaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dataset,
            config,
            passes: AtomicU64::new(0),
        })
    }

    pub fn dataset(&self) -> &AugmentedDataset<D> {
        &self.dataset
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Number of batches in one pass.
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.config.batch_size)
    }

    /// Start the next pass.
    pub fn iter(&self) -> Pass<'_, D> {
        let pass = self.passes.fetch_add(1, Ordering::Relaxed);
        self.pass(pass)
    }

    /// Replay pass number `pass` without advancing the counter.
    pub fn pass(&self, pass: u64) -> Pass<'_, D> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.config.shuffle {
            let mut rng = keyed_rng(self.config.seed, pass, SHUFFLE_STREAM, 0);
            order.shuffle(&mut rng);
        }
        debug!(
            pass,
            samples = order.len(),
            batches = self.num_batches(),
            "starting loader pass"
        );
        Pass {
            loader: self,
            order,
            cursor: 0,
            pass,
        }
    }

    fn sample(&self, pass: u64, index: usize) -> Result<AugmentedSample> {
        let mut rng = keyed_rng(self.config.seed, pass, SAMPLE_STREAM, index as u64);
        self.dataset.get(index, &mut rng)
    }

    fn load_batch(&self, pass: u64, indices: &[usize]) -> Result<Batch> {
        let workers = self.config.num_workers.min(indices.len());
        let samples = if workers <= 1 {
            indices
                .iter()
                .map(|&i| self.sample(pass, i))
                .collect::<Result<Vec<_>>>()?
        } else {
            let chunk = indices.len().div_ceil(workers);
            let parts: Vec<Result<Vec<AugmentedSample>>> = thread::scope(|scope| {
                let handles: Vec<_> = indices
                    .chunks(chunk)
                    .map(|part| {
                        scope.spawn(move || {
                            part.iter()
                                .map(|&i| self.sample(pass, i))
                                .collect::<Result<Vec<_>>>()
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|h| match h.join() {
                        Ok(part) => part,
                        Err(panic) => std::panic::resume_unwind(panic),
                    })
                    .collect()
            });
            let mut samples = Vec::with_capacity(indices.len());
            for part in parts {
                samples.extend(part?);
            }
            samples
        };
        Batch::stack(samples)
    }
}

impl<D: BaseDataset> BatchLoader for DataLoader<D> {
    fn dataset_len(&self) -> usize {
        self.dataset.len()
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Result<Batch>> + '_> {
        Box::new(self.iter())
    }
}

/// One pass over a [`DataLoader`].
pub struct Pass<'a, D> {
    loader: &'a DataLoader<D>,
    order: Vec<usize>,
    cursor: usize,
    pass: u64,
}

impl<D> Pass<'_, D> {
    /// Pass number, starting at 0.
    pub fn number(&self) -> u64 {
        self.pass
    }
}

impl<D: BaseDataset> Iterator for Pass<'_, D> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.loader.config.batch_size).min(self.order.len());
        let indices = &self.order[self.cursor..end];
        self.cursor = end;

        let batch = self.loader.load_batch(self.pass, indices);
        if let Ok(b) = &batch {
            debug!(pass = self.pass, size = b.len(), "loaded batch");
        }
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.order.len() - self.cursor).div_ceil(self.loader.config.batch_size);
        (left, Some(left))
    }
}
