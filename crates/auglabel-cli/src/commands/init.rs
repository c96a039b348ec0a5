//! Initialize a new auglabel project.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing auglabel project...", "→".blue());

    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    let config = Config::default();
    let config_path = base_path.join(CONFIG_FILE);
    if !config_path.exists() {
        config.save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    let data_dir = base_path.join(&config.data.dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    println!("  {} Created {}", "✓".green(), data_dir.display());

    println!();
    println!("{} auglabel project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  {} copy the CIFAR binary files into {}",
        "1.".blue(),
        data_dir.display()
    );
    println!("  {} auglabel catalog", "2.".blue());
    println!("  {} auglabel knn --memory-limit 5000", "3.".blue());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("project");
        run(Some(root.to_string_lossy().into_owned())).unwrap();

        let path = root.join(CONFIG_FILE);
        assert!(path.is_file());
        assert!(root.join("data").is_dir());
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.augment.transforms, vec!["hflip", "grayscale"]);

        // Second run keeps the existing file
        std::fs::write(&path, "[data]\nseed = 5\n").unwrap();
        run(Some(root.to_string_lossy().into_owned())).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap().data.seed, 5);
    }
}
