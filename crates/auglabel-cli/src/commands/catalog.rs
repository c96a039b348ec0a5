//! Print the class catalog.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::config::Config;

#[derive(Serialize)]
struct Entry {
    label: usize,
    size: usize,
    description: String,
}

pub fn run(config: &Config, json: bool) -> Result<()> {
    let catalog = config.catalog()?;
    let entries: Vec<Entry> = catalog
        .iter()
        .enumerate()
        .map(|(label, combo)| Entry {
            label,
            size: combo.len(),
            description: combo.describe(),
        })
        .collect();

    if json {
        let text = serde_json::to_string_pretty(&entries).context("Failed to serialize catalog")?;
        println!("{}", text);
        return Ok(());
    }

    let schedule = config.schedule()?;
    let monitor = config.knn_monitor(None)?;

    println!("{}", "Class Catalog".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!(
        "  Transforms:        {}",
        config.augment.transforms.join(", ").cyan()
    );
    println!(
        "  Max combo size:    {}",
        config.augment.max_combo_size.to_string().cyan()
    );
    println!("  Classes:           {}", catalog.len().to_string().cyan());
    println!(
        "  kNN monitor:       k={} every {} epoch(s)",
        monitor.k(),
        schedule.interval()
    );
    println!();

    let mut current_size = usize::MAX;
    for entry in &entries {
        if entry.size != current_size {
            current_size = entry.size;
            println!("{}", format!("Size {}", current_size).blue().bold());
        }
        println!("  {:>4}  {}", entry.label.to_string().cyan(), entry.description);
    }

    println!();
    println!("{}", "═".repeat(40).dimmed());
    Ok(())
}
