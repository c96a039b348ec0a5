//! CIFAR-10 / CIFAR-100 binary format reader.
//!
//! Each record is one or two label bytes followed by 3072 pixel bytes: the
//! red plane, then green, then blue, each 32×32 in row-major order.
//! CIFAR-100 records carry a coarse and a fine label; the fine label is used.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use auglabel_core::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DataError, DataResult};

/// Side length of a CIFAR image.
pub const CIFAR_SIDE: usize = 32;

/// Pixel bytes per record.
pub const CIFAR_PIXELS: usize = CIFAR_SIDE * CIFAR_SIDE * CHANNELS;

/// Which CIFAR release a directory holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CifarVariant {
    Cifar10,
    Cifar100,
}

impl CifarVariant {
    /// Label bytes at the start of every record.
    pub fn label_bytes(&self) -> usize {
        match self {
            CifarVariant::Cifar10 => 1,
            CifarVariant::Cifar100 => 2,
        }
    }

    pub fn record_len(&self) -> usize {
        self.label_bytes() + CIFAR_PIXELS
    }

    pub fn num_classes(&self) -> usize {
        match self {
            CifarVariant::Cifar10 => 10,
            CifarVariant::Cifar100 => 100,
        }
    }

    /// Binary files making up `split`, in reading order.
    pub fn files(&self, split: Split) -> Vec<&'static str> {
        match (self, split) {
            (CifarVariant::Cifar10, Split::Train) => vec![
                "data_batch_1.bin",
                "data_batch_2.bin",
                "data_batch_3.bin",
                "data_batch_4.bin",
                "data_batch_5.bin",
            ],
            (CifarVariant::Cifar10, Split::Test) => vec!["test_batch.bin"],
            (CifarVariant::Cifar100, Split::Train) => vec!["train.bin"],
            (CifarVariant::Cifar100, Split::Test) => vec!["test.bin"],
        }
    }

    /// Training-set statistics matching this release.
    pub fn normalization(&self) -> Normalization {
        match self {
            CifarVariant::Cifar10 => Normalization::cifar10(),
            CifarVariant::Cifar100 => Normalization::cifar100(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CifarVariant::Cifar10 => "cifar10",
            CifarVariant::Cifar100 => "cifar100",
        }
    }
}

impl fmt::Display for CifarVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CifarVariant {
    type Err = DataError;

    fn from_str(s: &str) -> DataResult<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "cifar10" => Ok(CifarVariant::Cifar10),
            "cifar100" => Ok(CifarVariant::Cifar100),
            other => Err(DataError::Format(format!("unknown dataset: {}", other))),
        }
    }
}

/// Train or test half of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => f.write_str("train"),
            Split::Test => f.write_str("test"),
        }
    }
}

impl FromStr for Split {
    type Err = DataError;

    fn from_str(s: &str) -> DataResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "train" => Ok(Split::Train),
            "test" => Ok(Split::Test),
            other => Err(DataError::Format(format!("unknown split: {}", other))),
        }
    }
}

/// A CIFAR split held in memory as raw planar records.
#[derive(Debug, Clone)]
pub struct CifarDataset {
    variant: CifarVariant,
    name: String,
    labels: Vec<usize>,
    pixels: Vec<u8>,
}

impl CifarDataset {
    /// Read every file of `split` from `dir`.
    pub fn load(dir: impl AsRef<Path>, variant: CifarVariant, split: Split) -> DataResult<Self> {
        let dir = dir.as_ref();
        let mut dataset = Self {
            variant,
            name: format!("{}-{}", variant, split),
            labels: Vec::new(),
            pixels: Vec::new(),
        };

        for file in variant.files(split) {
            let path = dir.join(file);
            if !path.is_file() {
                return Err(DataError::MissingFile(path));
            }
            let bytes = fs::read(&path)?;
            dataset.append_records(&bytes, &path)?;
            debug!(file = %path.display(), total = dataset.labels.len(), "read CIFAR batch file");
        }

        info!(
            dataset = %dataset.name,
            samples = dataset.labels.len(),
            "loaded CIFAR split"
        );
        Ok(dataset)
    }

    /// Parse records from an in-memory buffer.
    pub fn from_bytes(variant: CifarVariant, bytes: &[u8]) -> DataResult<Self> {
        let mut dataset = Self {
            variant,
            name: variant.name().to_string(),
            labels: Vec::new(),
            pixels: Vec::new(),
        };
        dataset.append_records(bytes, &PathBuf::from("<memory>"))?;
        Ok(dataset)
    }

    fn append_records(&mut self, bytes: &[u8], path: &Path) -> DataResult<()> {
        let record = self.variant.record_len();
        if bytes.len() % record != 0 {
            return Err(DataError::Truncated {
                path: path.to_path_buf(),
                len: bytes.len(),
                record,
            });
        }

        let skip = self.variant.label_bytes();
        let classes = self.variant.num_classes();
        self.labels.reserve(bytes.len() / record);
        self.pixels.reserve(bytes.len() / record * CIFAR_PIXELS);

        for chunk in bytes.chunks_exact(record) {
            // Fine label is the last label byte
            let label = chunk[skip - 1] as usize;
            if label >= classes {
                return Err(DataError::Format(format!(
                    "label {} out of range for {} in {}",
                    label,
                    self.variant,
                    path.display()
                )));
            }
            self.labels.push(label);
            self.pixels.extend_from_slice(&chunk[skip..]);
        }
        Ok(())
    }

    pub fn variant(&self) -> CifarVariant {
        self.variant
    }

    /// Labels of every record, in file order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }
}

impl BaseDataset for CifarDataset {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn get(&self, index: usize) -> Result<(Image, usize)> {
        let label = *self
            .labels
            .get(index)
            .ok_or_else(|| AugError::index_out_of_range(index, self.labels.len()))?;
        let start = index * CIFAR_PIXELS;
        let image = Image::from_planar(
            CIFAR_SIDE,
            CIFAR_SIDE,
            &self.pixels[start..start + CIFAR_PIXELS],
        )?;
        Ok((image, label))
    }

    fn num_classes(&self) -> Option<usize> {
        Some(self.variant.num_classes())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
