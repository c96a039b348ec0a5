//! Configuration management for the auglabel CLI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use auglabel::monitor::{KnnMonitor, MonitorSchedule};
use auglabel::prelude::*;
use serde::{Deserialize, Serialize};

/// File name searched for in the current and parent directories.
pub const CONFIG_FILE: &str = "auglabel.toml";

/// auglabel project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub augment: AugmentConfig,
    #[serde(default)]
    pub normalization: NormalizationConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentConfig {
    #[serde(default = "default_transforms")]
    pub transforms: Vec<String>,
    #[serde(default)]
    pub max_combo_size: ComboLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationConfig {
    #[serde(default = "default_mean")]
    pub mean: [f32; 3],
    #[serde(default = "default_std")]
    pub std: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_dataset")]
    pub dataset: CifarVariant,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_interval")]
    pub interval: usize,
}

// Default value functions
fn default_transforms() -> Vec<String> {
    vec!["hflip".to_string(), "grayscale".to_string()]
}
fn default_mean() -> [f32; 3] { CIFAR100_TRAIN_MEAN }
fn default_std() -> [f32; 3] { CIFAR100_TRAIN_STD }
fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_dataset() -> CifarVariant { CifarVariant::Cifar100 }
fn default_batch_size() -> usize { 128 }
fn default_num_workers() -> usize { 4 }
fn default_k() -> usize { KnnMonitor::DEFAULT_K }
fn default_temperature() -> f32 { KnnMonitor::DEFAULT_TEMPERATURE }
fn default_interval() -> usize { 1 }

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            transforms: default_transforms(),
            max_combo_size: ComboLimit::All,
        }
    }
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            mean: default_mean(),
            std: default_std(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            dataset: default_dataset(),
            batch_size: default_batch_size(),
            num_workers: default_num_workers(),
            seed: 0,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            temperature: default_temperature(),
            interval: default_interval(),
        }
    }
}

impl Config {
    /// Load from `explicit`, else auglabel.toml in the current or parent
    /// directories, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit.map(Path::to_path_buf).or_else(find_config_file) {
            Some(path) => Self::from_file(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Generate default config as TOML string.
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Config::default()).context("Failed to serialize config")
    }

    pub fn normalization(&self) -> Result<Normalization> {
        Normalization::new(self.normalization.mean, self.normalization.std)
            .context("Invalid [normalization] section")
    }

    /// Resolve transform names and enumerate the class catalog.
    pub fn catalog(&self) -> Result<ClassCatalog> {
        let units = TransformRegistry::new()
            .select(&self.augment.transforms)
            .context("Invalid [augment] transforms")?;
        Ok(ClassCatalog::enumerate(
            &units,
            self.augment.max_combo_size,
            self.normalization()?,
        ))
    }

    pub fn loader_config(&self, shuffle: bool) -> LoaderConfig {
        LoaderConfig::default()
            .with_batch_size(self.data.batch_size)
            .with_shuffle(shuffle)
            .with_workers(self.data.num_workers)
            .with_seed(self.data.seed)
    }

    pub fn knn_monitor(&self, k: Option<usize>) -> Result<KnnMonitor> {
        KnnMonitor::new(k.unwrap_or(self.monitor.k), self.monitor.temperature)
            .context("Invalid [monitor] settings")
    }

    pub fn schedule(&self) -> Result<MonitorSchedule> {
        MonitorSchedule::new(self.monitor.interval).context("Invalid [monitor] interval")
    }
}

/// Find auglabel.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_round_trip() {
        let text = Config::default_toml().unwrap();
        let config: Config = toml::from_str(&text).unwrap();
        assert_eq!(config.augment.transforms, vec!["hflip", "grayscale"]);
        assert_eq!(config.augment.max_combo_size, ComboLimit::All);
        assert_eq!(config.data.batch_size, 128);
        assert_eq!(config.monitor.k, 200);
        assert_eq!(config.catalog().unwrap().len(), 4);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [augment]
            transforms = ["crop", "horizontal-flip", "color-jitter"]
            max_combo_size = -1

            [data]
            dataset = "cifar10"
            "#,
        )
        .unwrap();
        assert_eq!(config.augment.max_combo_size, ComboLimit::All);
        assert_eq!(config.data.dataset, CifarVariant::Cifar10);
        assert_eq!(config.data.num_workers, 4);
        assert_eq!(config.monitor.interval, 1);
        assert_eq!(
            config.catalog().unwrap().descriptions().last().unwrap(),
            "crop+hflip+colorjitter"
        );
    }

    #[test]
    fn test_integer_combo_size() {
        let config: Config = toml::from_str("[augment]\nmax_combo_size = 1\n").unwrap();
        assert_eq!(config.augment.max_combo_size, ComboLimit::AtMost(1));
        assert_eq!(config.catalog().unwrap().len(), 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(toml::from_str::<Config>("[augment]\nmax_combo_size = -4\n").is_err());

        let config: Config = toml::from_str("[augment]\ntransforms = [\"halfswap\"]\n").unwrap();
        assert!(config.catalog().is_err());

        let config: Config = toml::from_str("[normalization]\nstd = [0.0, 1.0, 1.0]\n").unwrap();
        assert!(config.normalization().is_err());

        let config: Config = toml::from_str("[monitor]\ninterval = 0\n").unwrap();
        assert!(config.schedule().is_err());
    }

    #[test]
    fn test_save_and_load_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        let mut config = Config::default();
        config.data.seed = 77;
        config.augment.max_combo_size = ComboLimit::AtMost(2);
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.data.seed, 77);
        assert_eq!(loaded.augment.max_combo_size, ComboLimit::AtMost(2));
    }
}
